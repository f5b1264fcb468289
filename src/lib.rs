//! # From source text to a running program
//!
//! User's source code: `LET average = (min + max) / 2;`

//! ## Lexing
//!
//! The [`lexer`] takes in the characters and converts them into tokens.
//! Operators `(`, `==`, numbers `123`, `-4.5`, string literals `"hi!"`,
//! identifiers `min` and keywords `LET` are all tokens; keywords are just
//! identifiers with a special spelling.
//!
//! Whitespace is dropped. So the tokens are
//! `["LET", "average", "=", "(", "min", "+", "max", ")", "/", "2", ";"]`.

//! ## Parsing
//!
//! The [`parser`] builds a tree of those tokens, the `abstract syntax tree`,
//! and reports the first `syntax error` it meets.
//!
//! ``` markdown
//! average (Stmt::Declaration)
//! └── / (ExprKind::Binary)
//!     ├── (ExprKind::Group)
//!     │   └── + (ExprKind::Binary)
//!     │       ├── min (ExprKind::Access)
//!     │       └── max (ExprKind::Access)
//!     └── 2 (ExprKind::Literal)
//! ```

//! ## Static analysis
//!
//! The [`analyzer`] finds out which declaration each name refers to, wiring
//! them together through lexical scopes, and checks that operand types fit
//! their operators. Every expression node gets its type written into the tree.

//! ## Tree-walk interpreter
//!
//! The [`interpreter`] executes the annotated tree directly, with exact
//! integer and decimal arithmetic, and returns what `main()` returns.

pub mod analyzer;
pub mod cli;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
mod plcer;
pub mod statement;
pub mod utils;

pub use error::PlcError;
pub use interpreter::{Interpreter, instance::Object, value::Value};
pub use plcer::Plcer;
