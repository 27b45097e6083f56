//! CLI argument parsing for stepstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Segment, chunk and resolve step-structured instructions", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split an instruction file into preamble and step sections
    Segment {
        /// File containing generated instructions
        #[arg(required = true)]
        file: PathBuf,

        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pack a file into transport-sized fragments
    Chunk {
        /// File to chunk
        #[arg(required = true)]
        file: PathBuf,

        /// Maximum characters per fragment (default: 1995)
        #[arg(short, long)]
        max_size: Option<usize>,
    },

    /// Resolve an elaboration request against a sequence of builds
    Resolve {
        /// Request text, e.g. "explain step 2 of the previous build"
        #[arg(required = true)]
        request: String,

        /// Instruction files pushed into history, oldest first
        #[arg(short, long = "build")]
        builds: Vec<PathBuf>,
    },
}
