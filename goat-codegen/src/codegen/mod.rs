//! Code generation module

mod code_generator;
mod ddl_generator;
mod dialect;
mod entity_generator;
mod naming;
mod repository_generator;
mod type_resolver;

pub use code_generator::*;
pub use ddl_generator::{generate_create_table, generate_schema_script};
pub use dialect::*;
pub use entity_generator::{entity_file_path, generate_entity, ENTITY_ROOT};
pub use naming::*;
pub use repository_generator::{
    generate_repository, repository_file_path, RepositoryOptions, REPOSITORY_ROOT,
};
pub use type_resolver::*;
