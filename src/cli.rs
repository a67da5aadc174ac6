use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "labspec", about = "Testbed resource specification generator")]
pub struct Cli {
    /// Path to a profile description file (defaults to the built-in profile)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the request and emit the specification document
    Generate {
        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "xml")]
        format: OutputFormat,
    },

    /// Check a profile description without emitting anything
    Validate,

    /// Write a starter profile description
    Init {
        /// Skip prompts and write defaults
        #[arg(long)]
        defaults: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Xml,
    Json,
}
