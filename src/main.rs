// src/main.rs
use anyhow::Result;
use clap::Parser;

use eqmatch::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    cli::run(&args)
}
