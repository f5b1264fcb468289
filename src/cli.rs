use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plcer", version, after_long_help = "Runs programs written in the PLC teaching language.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a program; the exit status is the value returned by `main`
	Run { path: PathBuf },
	/// Lex, parse and analyze a program without running it
	Check { path: PathBuf },
	/// Print a program in canonical form
	Format { path: PathBuf },
}
