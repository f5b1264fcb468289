use std::process::exit;

use clap::Parser;
use num_traits::ToPrimitive;
use plcer::{Value, cli::*};
use tracing_subscriber::EnvFilter;

fn install_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() {
	install_tracing();
	let plcer = plcer::Plcer;

	match Cli::parse().mode {
		Mode::Run { path } => match plcer.run_file(&path) {
			Ok(Value::Integer(code)) => exit(code.to_i32().unwrap_or(0)),
			Ok(_) => {}
			Err(e) => {
				eprintln!("Failed run file: {e}");
				exit(1);
			}
		},
		Mode::Check { path } => {
			if let Err(e) = plcer.check_file(&path) {
				eprintln!("Failed check file: {e}");
				exit(1);
			}
		}
		Mode::Format { path } => match plcer.format_file(&path) {
			Ok(formatted) => print!("{formatted}"),
			Err(e) => {
				eprintln!("Failed format file: {e}");
				exit(1);
			}
		},
	}
}
