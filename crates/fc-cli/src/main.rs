//! fc - command-line companion to the Flow Canvas editor.

mod cli;

use clap::Parser;

fn main() {
    let args = cli::Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .format_timestamp(None)
        .init();

    if let Err(e) = args.run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
