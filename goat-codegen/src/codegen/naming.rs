//! Naming utilities for code generation

/// Extension of every generated source file
pub const SOURCE_EXTENSION: &str = "go";

/// Alias used when a type name yields no usable initials
const FALLBACK_ABBREVIATION: &str = "e";

/// Upper-case the first character of a segment
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a snake_case identifier to PascalCase
/// e.g., "user_name" -> "UserName", "USER_PROJECT" -> "UserProject"
///
/// Only `_` separates segments; any other character is kept as is.
pub fn to_pascal_case(snake: &str) -> String {
    snake.to_lowercase().split('_').map(capitalize).collect()
}

/// Convert a snake_case identifier to lowerCamelCase
/// e.g., "user_name" -> "userName"
pub fn to_lower_camel_case(snake: &str) -> String {
    let lower = snake.to_lowercase();
    let mut segments = lower.split('_');
    let head = segments.next().unwrap_or_default().to_string();
    head + &segments.map(capitalize).collect::<String>()
}

/// Convert a table name to a source file name
/// e.g., "user_name" -> "user-name.go"
pub fn to_file_slug(snake: &str) -> String {
    format!("{}.{}", snake.to_lowercase().replace('_', "-"), SOURCE_EXTENSION)
}

/// Local variable name bound to a column inside its table's data-access unit
///
/// The literal `<table>_` prefix is dropped so that `user_id` on table `user`
/// binds to `id`. Only the whole token is matched: `username` on `user` stays
/// `username`.
pub fn column_variable_name(table_name: &str, column_name: &str) -> String {
    let prefix = format!("{}_", table_name.to_lowercase());
    let column = column_name.to_lowercase();
    match column.strip_prefix(&prefix) {
        Some(rest) if !rest.is_empty() => to_lower_camel_case(rest),
        _ => to_lower_camel_case(&column),
    }
}

/// Short receiver/alias name built from the upper-case letters of a type name
/// e.g., "UserProject" -> "up"
pub fn type_abbreviation(pascal_name: &str) -> String {
    let initials: String = pascal_name
        .chars()
        .filter(|c| c.is_uppercase())
        .collect::<String>()
        .to_lowercase();

    if !initials.is_empty() {
        return initials;
    }
    match pascal_name.chars().next() {
        Some(first) if first.is_alphabetic() => first.to_lowercase().to_string(),
        _ => FALLBACK_ABBREVIATION.to_string(),
    }
}

/// Check if a name is a Go reserved keyword
pub fn is_go_keyword(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

/// Escape a generated identifier if it's a Go keyword
pub fn escape_identifier(name: &str) -> String {
    if is_go_keyword(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}
