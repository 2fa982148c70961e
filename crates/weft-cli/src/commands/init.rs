//! Init command implementation.
//!
//! Writes the classic preset (Babel scripts, extracted Sass, file assets,
//! proxying dev server) as `weft.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use weft_config::presets;

use crate::cli::InitArgs;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

pub const CONFIG_FILE: &str = "weft.toml";

/// Execute the init command.
pub fn execute(args: InitArgs) -> Result<()> {
    let path = write_preset(&args.dir, args.force)?;
    ui::success(&format!("Created {}", path.display()));
    ui::info("Run 'weft check' once src/js/index.js exists");
    Ok(())
}

fn write_preset(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path));
    }

    fs::create_dir_all(dir).with_path(dir)?;
    let content = presets::classic()?.to_toml_string()?;
    fs::write(&path, content).with_path(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_config::WeftConfig;

    #[test]
    fn writes_loadable_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_preset(dir.path(), false).unwrap();

        let written = WeftConfig::from_toml_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, presets::classic().unwrap());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "# mine\n").unwrap();

        let err = write_preset(dir.path(), false).unwrap_err();
        assert!(matches!(err, CliError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(), "# mine\n");

        write_preset(dir.path(), true).unwrap();
        assert!(fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap().contains("[entry]"));
    }
}
