use std::path::PathBuf;

use tcgen_core::{style, BatchEvaluator, Evaluator};

use crate::util;

use super::{EvalOverrides, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Input file fed to the solution via stdin
    pub input: PathBuf,

    /// File the solution's stdout is written to (created or overwritten)
    pub output: PathBuf,

    #[command(flatten)]
    pub overrides: EvalOverrides,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let (cfg, executor) = args.overrides.resolve(global_args)?;
    let evaluator = BatchEvaluator::new(executor);

    log::info!("Running: {}", cfg.solution_command);
    let res = evaluator.evaluate(&args.input, &args.output, &cfg)?;

    let name = util::file_stem_lossy(&args.input);
    style::print_evaluation_line(&name, &res);
    if !style::is_passing(res.verdict) {
        style::print_evaluation_detail(&name, &res);
    }
    Ok(())
}
