use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::evaluator::EvaluatorConfig;
use crate::execution::ShellExecutor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    #[serde(default)]
    pub evaluator: EvalConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvalConfig {
    #[serde(default = "EvalConfig::default_shell")]
    pub shell: PathBuf,
    #[serde(default = "EvalConfig::default_solution_command")]
    pub solution_command: String,
    #[serde(default)]
    pub time_limit: Option<u64>,
    #[serde(default)]
    pub memory_limit: Option<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            shell: Self::default_shell(),
            solution_command: Self::default_solution_command(),
            time_limit: None,
            memory_limit: None,
        }
    }
}

impl EvalConfig {
    fn default_shell() -> PathBuf {
        ShellExecutor::DEFAULT_SHELL.into()
    }

    fn default_solution_command() -> String {
        "./solution".to_owned()
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            solution_command: self.solution_command.clone(),
            time_limit: self.time_limit,
            memory_limit: self.memory_limit,
        }
    }

    pub fn executor(&self) -> ShellExecutor {
        ShellExecutor::new().shell(&self.shell)
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "tcgen.toml";

    pub fn example_toml() -> String {
        let file = Asset::get(Self::FILENAME).unwrap();
        std::str::from_utf8(file.data.as_ref()).unwrap().to_owned()
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = std::fs::read_to_string(&filepath)
            .with_context(|| format!("Cannot read config file {:?}", filepath))?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let cur_dir = cur_dir.as_ref();
        cur_dir
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
            .with_context(|| format!("Cannot find '{}'", Self::FILENAME))
    }

    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_filepath = Config::find_file_in_ancestors(cur_dir)?;
        Self::from_toml_file(config_filepath)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml();
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();

        let Config {
            source_config_file,
            evaluator,
        } = cfg;

        assert_eq!(source_config_file, None);
        assert_eq!(evaluator.shell, Path::new("/bin/sh"));
        assert_eq!(evaluator.solution_command, "./solution");
        assert_eq!(evaluator.time_limit, Some(2));
        assert_eq!(evaluator.memory_limit, Some(256));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_toml("[evaluator]\nsolution_command = \"python3 sol.py\"\n").unwrap();
        assert_eq!(cfg.evaluator.shell, Path::new("/bin/sh"));
        assert_eq!(
            cfg.evaluator.evaluator_config(),
            EvaluatorConfig::new("python3 sol.py")
        );

        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        assert!(Config::from_toml("[evaluator]\ntime_limit = \"two\"\n").is_err());
    }
}
