//! Lexical scopes as an arena.
//!
//! Every [`Scope`] records the [`ScopeId`] of its parent. The arena is used as
//! a stack: a child is always pushed after its parent and popped before it, so
//! a parent id is always lower than its children's and no scope outlives its
//! parent. The analyzer stores bindings in it, the interpreter stores values.

use std::collections::HashMap;

/// Index of a scope in [`Scopes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

/// Variables by name and functions by `(name, arity)`.
#[derive(Debug, Clone)]
pub struct Scope<V, F> {
	parent:    Option<ScopeId>,
	variables: HashMap<String, V>,
	functions: HashMap<(String, usize), F>,
}

impl<V, F> Default for Scope<V, F> {
	fn default() -> Self { Self::new(None) }
}

impl<V, F> Scope<V, F> {
	pub fn new(parent: Option<ScopeId>) -> Self { Self { parent, variables: HashMap::new(), functions: HashMap::new() } }

	pub fn parent(&self) -> Option<ScopeId> { self.parent }

	/// Defining a name that already exists in this scope replaces it.
	pub fn define_variable(&mut self, name: impl Into<String>, variable: V) { self.variables.insert(name.into(), variable); }

	pub fn define_function(&mut self, name: impl Into<String>, arity: usize, function: F) {
		self.functions.insert((name.into(), arity), function);
	}

	/// Looks only at this scope.
	pub fn variable(&self, name: &str) -> Option<&V> { self.variables.get(name) }

	/// Looks only at this scope.
	pub fn function(&self, name: &str, arity: usize) -> Option<&F> {
		// the tuple key needs an owned `String`
		self.functions.get(&(name.to_string(), arity))
	}

	pub fn variables(&self) -> impl Iterator<Item = (&str, &V)> {
		self.variables.iter().map(|(name, variable)| (name.as_str(), variable))
	}
}

/// The scope arena. The root scope lives for as long as the arena.
#[derive(Debug, Clone)]
pub struct Scopes<V, F> {
	scopes: Vec<Scope<V, F>>,
}

impl<V, F> Default for Scopes<V, F> {
	fn default() -> Self { Self::new() }
}

impl<V, F> Scopes<V, F> {
	pub fn new() -> Self { Self { scopes: vec![Scope::new(None)] } }

	pub fn root(&self) -> ScopeId { ScopeId(0) }

	/// Opens a child scope of `parent` on top of the stack.
	pub fn push(&mut self, parent: ScopeId) -> ScopeId {
		let id = ScopeId(self.scopes.len());
		tracing::trace!(scope = id.0, parent = parent.0, "push scope");
		self.scopes.push(Scope::new(Some(parent)));
		id
	}

	/// Closes `id` and everything opened after it. The root scope is never popped.
	pub fn pop(&mut self, id: ScopeId) {
		tracing::trace!(scope = id.0, "pop scope");
		self.scopes.truncate(id.0.max(1));
	}

	/// Number of live scopes, the root included.
	pub fn depth(&self) -> usize { self.scopes.len() }

	pub fn scope(&self, id: ScopeId) -> &Scope<V, F> { &self.scopes[id.0] }

	pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope<V, F> { &mut self.scopes[id.0] }

	pub fn define_variable(&mut self, id: ScopeId, name: impl Into<String>, variable: V) {
		self.scope_mut(id).define_variable(name, variable)
	}

	pub fn define_function(&mut self, id: ScopeId, name: impl Into<String>, arity: usize, function: F) {
		self.scope_mut(id).define_function(name, arity, function)
	}

	/// Walks from `id` outward; the innermost definition wins.
	pub fn lookup_variable(&self, id: ScopeId, name: &str) -> Option<&V> {
		self.chain(id).find_map(|scope| scope.variable(name))
	}

	pub fn lookup_function(&self, id: ScopeId, name: &str, arity: usize) -> Option<&F> {
		self.chain(id).find_map(|scope| scope.function(name, arity))
	}

	fn chain(&self, id: ScopeId) -> impl Iterator<Item = &Scope<V, F>> {
		std::iter::successors(Some(self.scope(id)), |scope| scope.parent.map(|parent| self.scope(parent)))
	}
}
