mod capture;
mod core;
mod error;
mod shared;
mod sync;
mod ui;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive recording session
    Record {
        /// Directory for exported frames and the manifest
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Print the attached displays as JSON
    Detect,
}

fn main() -> Result<()> {
    utils::logger::init();

    // Reset terminal state in case a previous crash left raw mode on.
    let _ = crossterm::terminal::disable_raw_mode();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record { output_dir } => {
            std::fs::create_dir_all(&output_dir)?;
            ui::Session::open(output_dir)?.run()?;
        }
        Commands::Detect => {
            let displays = capture::source::detect_displays()?;
            println!("{}", serde_json::to_string_pretty(&displays)?);
        }
    }

    Ok(())
}
