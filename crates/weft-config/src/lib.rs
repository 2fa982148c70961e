pub mod build;
pub mod config;
pub mod dev;
pub mod discovery;
pub mod error;
pub mod pattern;
pub mod presets;
pub mod registry;
pub mod validation;

// Re-export main types
pub use build::*;
pub use config::*;
pub use dev::*;
pub use error::*;
pub use pattern::Pattern;
pub use registry::{PluginKind, PluginRegistry, ProcessorKind, ProcessorRegistry, plugins, processors};

// Re-export discovery and validation
pub use discovery::{
    CONFIG_ENV, ConfigDiscovery, ENV_PREFIX, PROFILE_ENV, discover, discover_with_profile, load_file,
};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
