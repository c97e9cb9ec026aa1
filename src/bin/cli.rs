// src/bin/cli.rs
use clap::Parser;
use sei_capture::{cli, config::AppOptions, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = cli::Cli::parse();
    let mut opts = AppOptions::from_env();
    args.apply(&mut opts);

    // Dropping the guard flushes the log file.
    let _guard = log::init(&opts.log)?;
    cli::run(&args, &opts)
}
