use std::path::PathBuf;

use anyhow::{ensure, Context as _};
use tcgen_core::{print_success, Config};

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(default_value = "./")]
    dir: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let path = args.dir.join(Config::FILENAME);
    ensure!(!path.exists(), "Already exists: {}", path.to_string_lossy());

    std::fs::create_dir_all(&args.dir)
        .with_context(|| format!("Cannot create dir {}", args.dir.to_string_lossy()))?;
    std::fs::write(&path, Config::example_toml())
        .with_context(|| format!("Cannot write {}", path.to_string_lossy()))?;

    print_success!("Created {}", path.to_string_lossy());
    Ok(())
}
