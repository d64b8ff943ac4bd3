mod config;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize as _;
use log::info;
use thiserror::Error;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "csrgen",
    version,
    about = "Pack register fields into an AHB3-Lite register map and emit its Verilog wrapper"
)]
struct Args {
    /// FuseSoC generator configuration (YAML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Directory the generated files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Do not print the register layout
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Model(#[from] model::error::Error),
    #[error(transparent)]
    Build(#[from] build::Error),
    #[error("refusing to generate from an invalid register map")]
    Invalid,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let mut model = Config::load(&args.config)?.into_model();

    model.pack()?;

    if !args.quiet {
        print!("{}", model.report());
        println!("{}", "=".repeat(80));
    }

    if !model::validate(&model) {
        return Err(Error::Invalid);
    }

    let written = build::generate(&model, &args.out_dir)?;

    info!("generated {} files into {}", written.len(), args.out_dir.display());

    let files = written
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "{} {} registers ({} fields, {} replicas): {files}",
        "Finished".green().bold(),
        model.register_count(),
        model.field_count(),
        model.replica_count(),
    );

    Ok(())
}
