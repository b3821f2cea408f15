pub mod loader;
pub mod schema;

pub use loader::{
    discover, discover_path, load_from_path, load_from_str, named_query, ConfigError,
    CONFIG_ENV, CONFIG_FILE_NAME,
};
pub use schema::{Metadata, QueryConfig, SectionDefinition, ValidationError, ValidationIssue};
