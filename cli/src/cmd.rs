pub mod eval;
pub mod eval_all;
pub mod init;

use std::path::PathBuf;

use tcgen_core::{config::EvalConfig, EvaluatorConfig, ShellExecutor};

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of searching for tcgen.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("e"))]
    Eval(eval::Args),

    #[command(alias("ea"))]
    EvalAll(eval_all::Args),

    Init(init::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Eval(args) => eval::exec(args, self),
            EvalAll(args) => eval_all::exec(args, self),
            Init(args) => init::exec(args, self),
        }
    }
}

/// Evaluator settings given on the command line. Each one overrides the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EvalOverrides {
    /// Command that runs the solution
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Time limit in seconds
    #[arg(short = 't', long)]
    pub time_limit: Option<u64>,

    /// Memory limit in megabytes
    #[arg(short = 'm', long)]
    pub memory_limit: Option<u64>,

    #[arg(long)]
    pub shell: Option<PathBuf>,
}

impl EvalOverrides {
    pub fn apply(&self, mut cfg: EvalConfig) -> EvalConfig {
        let EvalOverrides {
            command,
            time_limit,
            memory_limit,
            shell,
        } = self;

        if let Some(c) = command {
            cfg.solution_command = c.clone();
        }
        if time_limit.is_some() {
            cfg.time_limit = *time_limit;
        }
        if memory_limit.is_some() {
            cfg.memory_limit = *memory_limit;
        }
        if let Some(s) = shell {
            cfg.shell = s.clone();
        }
        cfg
    }

    pub fn resolve(&self, global_args: &GlobalArgs) -> anyhow::Result<(EvaluatorConfig, ShellExecutor)> {
        let cfg = crate::config::load(global_args)?;
        let eval_cfg = self.apply(cfg.evaluator);
        log::debug!("Evaluator config: {:?}", eval_cfg);
        Ok((eval_cfg.evaluator_config(), eval_cfg.executor()))
    }
}
