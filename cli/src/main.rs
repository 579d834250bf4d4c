use clap::Parser;
use tcgen_cli::cmd::GlobalArgs;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = GlobalArgs::parse();
    app.exec_subcmd().unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
}
