use std::path::PathBuf;

use tcgen_core::Config;

use crate::{cmd::GlobalArgs, util};

pub const APP_NAME: &str = "tcgen";

/// `~/.config/tcgen/tcgen.toml` (or the platform equivalent).
pub fn user_config_filepath() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(Config::FILENAME))
}

/// Resolves the config in this order: `--config`, `tcgen.toml` in the current
/// dir or its ancestors, the user config file, built-in defaults.
pub fn load(args: &GlobalArgs) -> anyhow::Result<Config> {
    if let Some(path) = &args.config {
        return Config::from_toml_file(path.clone());
    }
    if let Ok(path) = Config::find_file_in_ancestors(util::current_dir()) {
        log::info!("Using config {:?}", util::replace_homedir_to_tilde(&path));
        return Config::from_toml_file(path);
    }
    match self::user_config_filepath() {
        Some(path) if path.is_file() => {
            log::info!("Using config {:?}", util::replace_homedir_to_tilde(&path));
            Config::from_toml_file(path)
        }
        _ => {
            log::info!("No {} found; using defaults", Config::FILENAME);
            Ok(Config::default())
        }
    }
}
