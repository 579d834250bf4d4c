use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context as _};
use indicatif::{ProgressBar, ProgressStyle};
use tcgen_core::{style, BatchEvaluator, Evaluator, Verdict};

use crate::util;

use super::{EvalOverrides, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Directory containing `*.in` files
    pub dir: PathBuf,

    /// Directory `<name>.out` files are written to [default: DIR]
    #[arg(short = 'o', long)]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: EvalOverrides,
}

/// Returns `*.in` files directly under `dir`, sorted by path.
pub fn find_input_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .with_context(|| format!("Non UTF-8 path: {:?}", dir))?;
    let pattern = format!("{}/*.in", glob::Pattern::escape(dir_str));
    let mut files = glob::glob(&pattern)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Cannot read dir {}", dir.to_string_lossy()))?;
    files.retain(|path| path.is_file());
    files.sort();
    Ok(files)
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let inputs = self::find_input_files(&args.dir)?;
    ensure!(
        !inputs.is_empty(),
        "No *.in file found in {}",
        args.dir.to_string_lossy()
    );

    let out_dir = args.out_dir.as_deref().unwrap_or(&args.dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Cannot create dir {}", out_dir.to_string_lossy()))?;

    let (cfg, executor) = args.overrides.resolve(global_args)?;
    let evaluator = BatchEvaluator::new(executor);
    log::info!("Running: {}", cfg.solution_command);

    let bar = ProgressBar::new(inputs.len() as u64)
        .with_style(ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut results = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let name = util::file_stem_lossy(input);
        bar.set_message(format!("{} ...", name));
        let output = out_dir.join(format!("{}.out", name));
        let res = evaluator.evaluate(input, &output, &cfg)?;
        bar.inc(1);
        results.push((name, res));
    }
    bar.finish_and_clear();

    for (name, res) in &results {
        style::print_evaluation_line(name, res);
    }
    results
        .iter()
        .filter(|(_, res)| !style::is_passing(res.verdict))
        .for_each(|(name, res)| style::print_evaluation_detail(name, res));

    let verdicts: Vec<Verdict> = results.iter().map(|(_, res)| res.verdict).collect();
    style::print_evaluation_summary(&verdicts);
    Ok(())
}
