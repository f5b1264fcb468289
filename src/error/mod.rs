pub mod analyzer;
pub mod interpreter;
pub mod lexer;
pub mod parser;

/// PlcError is the top-level error type for the whole pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PlcError {
	/// Host failure outside the language pipeline, e.g. reading a file
	#[error("InternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	#[error("Lex error at {0}")]
	LexError(#[from] lexer::LexError),
	#[error("Parse error at {0}")]
	ParseError(#[from] parser::ParseError),
	#[error("Analysis error: {0}")]
	AnalysisError(#[from] analyzer::AnalysisError),
	#[error("Runtime error: {0}")]
	RuntimeFault(#[from] interpreter::RuntimeFault),
}
