//! Accessor binding context with scope tracking.
//!
//! Tracks accessor bindings (e.g., `const t = useTranslations("Namespace")`)
//! with proper scope handling for nested functions and arrow functions.

use std::collections::HashMap;

/// What a name refers to within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSlot {
    /// An accessor bound to this namespace.
    Accessor(String),
    /// A parameter or local that hides an outer accessor of the same name.
    Shadowed,
}

/// Manages accessor bindings with a stack of scopes (innermost last).
///
/// # Example
/// ```ignore
/// const t = useTranslations("Common");  // scope 0: t -> Common
/// function inner(t) {                   // push scope 1, t shadowed
///     t("key");                          // not attributed
/// }                                      // pop scope 1
/// ```
pub struct BindingContext {
    bindings_stack: Vec<HashMap<String, BindingSlot>>,
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingContext {
    /// Create a new BindingContext with a single global scope.
    pub fn new() -> Self {
        Self {
            bindings_stack: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.bindings_stack.push(HashMap::new());
    }

    /// Exit the current scope. Keeps at least the global scope.
    pub fn exit_scope(&mut self) {
        if self.bindings_stack.len() > 1 {
            self.bindings_stack.pop();
        }
    }

    pub fn bind_accessor(&mut self, name: String, namespace: String) {
        if let Some(scope) = self.bindings_stack.last_mut() {
            scope.insert(name, BindingSlot::Accessor(namespace));
        }
    }

    /// Hide an outer accessor of the same name in the current scope.
    /// Names with no binding anywhere are left alone.
    pub fn shadow(&mut self, name: &str) {
        if self.lookup(name).is_none() {
            return;
        }
        if let Some(scope) = self.bindings_stack.last_mut() {
            scope.insert(name.to_string(), BindingSlot::Shadowed);
        }
    }

    fn lookup(&self, name: &str) -> Option<&BindingSlot> {
        self.bindings_stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Namespace of the accessor `name` refers to here, if any.
    pub fn namespace_of(&self, name: &str) -> Option<&str> {
        match self.lookup(name) {
            Some(BindingSlot::Accessor(namespace)) => Some(namespace),
            _ => None,
        }
    }
}
