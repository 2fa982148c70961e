//! Configuration lookup shared by the commands.

use std::path::{Path, PathBuf};

use weft_config::{CONFIG_ENV, ConfigDiscovery, PROFILE_ENV, WeftConfig, load_file};

use crate::cli::SourceArgs;
use crate::error::{CliError, Result};

/// A configuration ready for validation or planning.
#[derive(Debug)]
pub(crate) struct LoadedConfig {
    pub config: WeftConfig,
    /// File the configuration was read from
    pub path: PathBuf,
    /// Project root entries are resolved against
    pub root: PathBuf,
}

/// Load the configuration named by `args`, or discover it below the root.
///
/// `WEFT_CONFIG` and `WEFT_PROFILE` stand in for `--config` and `--profile`
/// when those are not given.
pub(crate) fn load(args: &SourceArgs) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir()?;
    let root_arg = args.root.as_deref().map(|root| resolve_path(root, &cwd));
    let config_arg = args.config.clone().or_else(|| env_value(CONFIG_ENV).map(PathBuf::from));
    let profile = args.profile.clone().or_else(|| env_value(PROFILE_ENV));

    let (path, root) = match &config_arg {
        Some(config) => {
            let path = resolve_path(config, &cwd);
            if !path.is_file() {
                return Err(CliError::FileNotFound(path));
            }
            let root = root_arg.unwrap_or_else(|| {
                path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone())
            });
            (path, root)
        }
        None => {
            let root = root_arg.unwrap_or(cwd);
            let path = ConfigDiscovery::new(&root)
                .find()
                .ok_or_else(|| CliError::ConfigNotFound(root.clone()))?;
            (path, root)
        }
    };

    tracing::debug!(config = %path.display(), root = %root.display(), "loading configuration");
    let config = load_file(&path)?.materialize_profile(profile.as_deref())?;
    Ok(LoadedConfig { config, path, root })
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Resolve a path relative to the current working directory.
pub(crate) fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
