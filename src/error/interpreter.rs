/// Errors that can occur during interpretation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeFault {
	/// An operand or condition of the wrong runtime kind
	#[error("Type mismatch in {operation}: expected {expected}, found {found}")]
	TypeMismatch { operation: &'static str, expected: &'static str, found: String },
	#[error("Undefined variable '{0}'")]
	UndefinedVariable(String),
	#[error("Undefined function '{name}/{arity}'")]
	UndefinedFunction { name: String, arity: usize },
	#[error("Undefined field '{0}'")]
	UndefinedField(String),
	#[error("Undefined method '{name}/{arity}'")]
	UndefinedMethod { name: String, arity: usize },
	#[error("Division by zero")]
	DivisionByZero,
	/// Assignment to something other than a variable or field
	#[error("Invalid assignment target")]
	InvalidAssignmentTarget,
	#[error("Function 'main/0' not found")]
	MissingMain,
	/// Writing to the output stream failed
	#[error("Output error: {0}")]
	Output(String),
}

impl From<std::io::Error> for RuntimeFault {
	fn from(error: std::io::Error) -> Self { Self::Output(error.to_string()) }
}
