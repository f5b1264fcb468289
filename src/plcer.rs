use std::{fs::read_to_string, io::Write, path::Path};

use anyhow::Context;

use crate::{
	PlcError,
	analyzer::Analyzer,
	interpreter::{Interpreter, value::Value},
	lexer::lex,
	parser::parse,
	statement::Source,
};

/// Plcer runs source text through the lexer, parser, analyzer and interpreter.
pub struct Plcer;

impl Plcer {
	/// Run a program file, printing to stdout.
	pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<Value, PlcError> {
		let source = Self::read(path.as_ref())?;
		self.run(&source)
	}

	/// Analyze a program file without running it.
	pub fn check_file<P: AsRef<Path>>(&self, path: P) -> Result<Source, PlcError> {
		let source = Self::read(path.as_ref())?;
		self.check(&source)
	}

	/// Parse a program file and print it back in canonical form.
	pub fn format_file<P: AsRef<Path>>(&self, path: P) -> Result<String, PlcError> {
		let source = Self::read(path.as_ref())?;
		self.format(&source)
	}

	/// Run a program, printing to stdout. Returns the value of `main()`.
	pub fn run(&self, source: &str) -> Result<Value, PlcError> {
		self.run_with(source, &mut Analyzer::new(), &mut Interpreter::new())
	}

	/// Run a program against a prepared analyzer and interpreter, so the host
	/// can register types, variables and functions or capture the output.
	pub fn run_with<W: Write>(
		&self,
		source: &str,
		analyzer: &mut Analyzer,
		interpreter: &mut Interpreter<W>,
	) -> Result<Value, PlcError> {
		let mut ast = parse(lex(source)?)?;
		analyzer.analyze(&mut ast)?;
		Ok(interpreter.interpret(&ast)?)
	}

	/// Lex, parse and analyze, returning the annotated tree.
	pub fn check(&self, source: &str) -> Result<Source, PlcError> {
		let mut ast = parse(lex(source)?)?;
		Analyzer::new().analyze(&mut ast)?;
		Ok(ast)
	}

	pub fn format(&self, source: &str) -> Result<String, PlcError> { Ok(parse(lex(source)?)?.to_string()) }

	fn read(path: &Path) -> Result<String, PlcError> {
		tracing::debug!(path = %path.display(), "read source");
		Ok(read_to_string(path).with_context(|| format!("Failed open source file {}", path.display()))?)
	}
}
