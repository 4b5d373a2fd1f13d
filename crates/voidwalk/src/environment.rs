//! Runtime environment: the scope tree, call bookkeeping, builtins and
//! captured output

mod frame;
mod prelude;
mod scope;

pub use frame::ScopeGuard;
pub use scope::{parent_name, Scope, ScopeKind};

use std::collections::HashMap;
use std::rc::Rc;

use crate::class::ClassInfo;
use crate::context::ROOT_SCOPE;
use crate::error::EvalError;
use crate::operation::Operation;
use crate::symbol::{BuiltinFn, EnumSymbol, FunctionSymbol, Symbol, TypeSymbol, Variable};
use crate::types::DeclaredType;
use crate::value::Value;

/// Text written by the builtin printers.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    text: String,
    echo: bool,
}

impl OutputBuffer {
    pub fn write(&mut self, s: &str) {
        if self.echo {
            print!("{}", s);
        }
        self.text.push_str(s);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }
}

/// The runtime environment.
///
/// Scopes form a tree keyed by fully-qualified `::` names. Lookups start
/// at the current scope and ascend by stripping the last segment of the
/// name, skipping ancestors that do not exist, until the root has been
/// checked.
///
/// # Example
///
/// ```
/// use voidwalk::{DeclaredType, Environment, Value};
///
/// let mut env = Environment::new();
/// env.declare_variable("x", Value::Integer(1), DeclaredType::Int).unwrap();
///
/// {
///     let mut guard = env.block_guard("main::while_1_1").unwrap();
///     guard.declare_variable("y", Value::Integer(2), DeclaredType::Int).unwrap();
///     // outer names are visible from inside
///     assert_eq!(guard.resolve_variable("x").unwrap(), &Value::Integer(1));
/// }
///
/// // back in main; y lives in the block scope, not here
/// assert!(env.resolve_variable("y").is_err());
/// ```
#[derive(Debug)]
pub struct Environment {
    scopes: HashMap<String, Scope>,

    /// Qualified name of the scope statements currently run in
    current: String,

    /// Scopes to return to, innermost last
    previous: Vec<String>,

    /// Source of unique call-scope suffixes; reset only by `reset`
    call_counter: u64,

    /// Current call depth (for recursion limiting)
    call_depth: usize,

    /// Class of each active call, `None` for plain functions
    class_stack: Vec<Option<String>>,

    builtins: HashMap<String, BuiltinFn>,

    output: OutputBuffer,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment holding only the root scope.
    pub fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(
            ROOT_SCOPE.to_string(),
            Scope::new(ROOT_SCOPE.to_string(), ScopeKind::Root),
        );
        Self {
            scopes,
            current: ROOT_SCOPE.to_string(),
            previous: Vec::new(),
            call_counter: 0,
            call_depth: 0,
            class_stack: Vec::new(),
            builtins: HashMap::new(),
            output: OutputBuffer::default(),
        }
    }

    /// Full reinitialization: every scope, the call counter, the output and
    /// the builtin table start over.
    pub fn reset(&mut self) {
        tracing::debug!(scopes = self.scopes.len(), "resetting environment");
        *self = Self::with_prelude();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scope Tree
    // ═══════════════════════════════════════════════════════════════════

    /// Create a scope if it does not exist yet. Returns whether it was
    /// created.
    pub fn create(&mut self, name: &str, kind: ScopeKind) -> bool {
        if self.scopes.contains_key(name) {
            return false;
        }
        let scope = Scope::new(name.to_string(), kind);
        if let Some(parent) = scope.parent().and_then(|p| self.scopes.get_mut(p)) {
            parent.children.push(name.to_string());
        }
        tracing::trace!(scope = name, ?kind, "create scope");
        self.scopes.insert(name.to_string(), scope);
        true
    }

    /// Make `name` the current scope, remembering the one we leave.
    pub fn enter(&mut self, name: &str) -> Result<(), EvalError> {
        if !self.scopes.contains_key(name) {
            return Err(EvalError::runtime(format!("scope {} does not exist", name)));
        }
        tracing::trace!(from = %self.current, to = name, "enter scope");
        let left = std::mem::replace(&mut self.current, name.to_string());
        self.previous.push(left);
        Ok(())
    }

    /// Return to the scope that was current before the last `enter`.
    pub fn enter_previous(&mut self) {
        if let Some(previous) = self.previous.pop() {
            tracing::trace!(from = %self.current, to = %previous, "exit scope");
            self.current = previous;
        }
    }

    /// Remove a scope and everything beneath it.
    pub fn remove_scope(&mut self, name: &str) {
        let Some(scope) = self.scopes.remove(name) else {
            return;
        };
        if let Some(parent) = scope.parent().and_then(|p| self.scopes.get_mut(p)) {
            parent.children.retain(|c| c != name);
        }
        for child in &scope.children {
            self.remove_scope(child);
        }
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    pub fn contains_scope(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Number of scopes entered and not yet exited.
    pub fn depth(&self) -> usize {
        self.previous.len()
    }

    fn current_scope_mut(&mut self) -> Result<&mut Scope, EvalError> {
        let name = &self.current;
        self.scopes
            .get_mut(name)
            .ok_or_else(|| EvalError::runtime(format!("current scope {} is missing", name)))
    }

    /// Existing scopes from the current one up to the root.
    fn ascent(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self.current.as_str()), |&name| parent_name(name))
            .filter_map(|name| self.scopes.get(name))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Symbol Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Add a symbol to the matching namespace of the current scope.
    ///
    /// A name already present in the same namespace of the same scope is a
    /// NameError, except in block scopes where it is replaced.
    pub fn add(&mut self, symbol: Symbol) -> Result<(), EvalError> {
        let scope = self.current_scope_mut()?;
        let replace = scope.kind.allows_redeclaration();
        let taken = match &symbol {
            Symbol::Variable { name, .. } | Symbol::Constant { name, .. } => {
                scope.variables.contains_key(name) || scope.constants.contains_key(name)
            }
            Symbol::Function(f) => scope.functions.contains_key(f.name()),
            Symbol::Class(c) => scope.types.contains_key(c.name()),
            Symbol::Enum(e) => scope.types.contains_key(&e.name),
        };
        if taken && !replace {
            return Err(EvalError::name(format!(
                "{} already declared in scope {}",
                symbol.name(),
                scope.name
            )));
        }

        match symbol {
            Symbol::Variable { name, variable } => {
                scope.constants.shift_remove(&name);
                scope.variables.insert(name, variable);
            }
            Symbol::Constant { name, value } => {
                scope.variables.shift_remove(&name);
                scope.constants.insert(name, value);
            }
            Symbol::Function(f) => {
                scope.functions.insert(f.name().to_string(), f);
            }
            Symbol::Class(c) => {
                scope.types.insert(c.name().to_string(), TypeSymbol::Class(c));
            }
            Symbol::Enum(e) => {
                scope.types.insert(e.name.clone(), TypeSymbol::Enum(e));
            }
        }
        Ok(())
    }

    /// Declare a variable in the current scope.
    pub fn declare_variable(
        &mut self,
        name: impl Into<String>,
        value: Value,
        ty: DeclaredType,
    ) -> Result<(), EvalError> {
        self.add(Symbol::Variable {
            name: name.into(),
            variable: Variable::new(value, ty),
        })
    }

    /// Bind a variable in the current scope, replacing any previous
    /// binding. Used for call parameters, `this` and loop variables.
    pub fn bind_variable(
        &mut self,
        name: impl Into<String>,
        value: Value,
        ty: DeclaredType,
    ) -> Result<(), EvalError> {
        let scope = self.current_scope_mut()?;
        scope.variables.insert(name.into(), Variable::new(value, ty));
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Resolution (ascent)
    // ═══════════════════════════════════════════════════════════════════

    /// Nearest variable, or constant at the same level, named `name`.
    pub fn resolve_variable(&self, name: &str) -> Result<&Value, EvalError> {
        self.ascent()
            .find_map(|scope| {
                scope
                    .variables
                    .get(name)
                    .map(|v| &v.value)
                    .or_else(|| scope.constants.get(name))
            })
            .ok_or_else(|| EvalError::name(format!("undefined variable ${}", name)))
    }

    /// Nearest variable cell named `name`, for assignment.
    pub fn resolve_variable_mut(&mut self, name: &str) -> Result<&mut Variable, EvalError> {
        let mut owner = None;
        for scope in self.ascent() {
            if scope.variables.contains_key(name) {
                owner = Some(scope.name.clone());
                break;
            }
            if scope.constants.contains_key(name) {
                return Err(EvalError::runtime(format!(
                    "cannot assign to constant {}",
                    name
                )));
            }
        }
        owner
            .and_then(|scope| self.scopes.get_mut(&scope))
            .and_then(|scope| scope.variables.get_mut(name))
            .ok_or_else(|| EvalError::name(format!("undefined variable ${}", name)))
    }

    /// Nearest variable cell, if any (constants excluded).
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.ascent().find_map(|scope| scope.variables.get(name))
    }

    pub fn resolve_function(&self, name: &str) -> Result<Rc<FunctionSymbol>, EvalError> {
        self.ascent()
            .find_map(|scope| scope.functions.get(name))
            .map(Rc::clone)
            .ok_or_else(|| EvalError::name(format!("undefined function {}", name)))
    }

    /// Nearest class or enum named `name`.
    pub fn resolve_type(&self, name: &str) -> Option<TypeSymbol> {
        self.ascent()
            .find_map(|scope| scope.types.get(name))
            .cloned()
    }

    pub fn resolve_class(&self, name: &str) -> Result<Rc<ClassInfo>, EvalError> {
        match self.resolve_type(name) {
            Some(TypeSymbol::Class(class)) => Ok(class),
            Some(TypeSymbol::Enum(_)) => {
                Err(EvalError::type_error(format!("{} is an enum, not a class", name)))
            }
            None => Err(EvalError::name(format!("undefined class {}", name))),
        }
    }

    pub fn resolve_enum(&self, name: &str) -> Option<Rc<EnumSymbol>> {
        match self.resolve_type(name) {
            Some(TypeSymbol::Enum(e)) => Some(e),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Operation Logs
    // ═══════════════════════════════════════════════════════════════════

    pub fn append_operation(&mut self, scope: &str, operation: Operation) -> Result<(), EvalError> {
        let scope = self
            .scopes
            .get_mut(scope)
            .ok_or_else(|| EvalError::runtime(format!("scope {} does not exist", scope)))?;
        Rc::make_mut(&mut scope.operations).push(operation);
        Ok(())
    }

    /// Cut a scope's log back to its first `len` operations.
    pub fn truncate_operations(&mut self, scope: &str, len: usize) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            Rc::make_mut(&mut scope.operations).truncate(len);
        }
    }

    /// Shared handle to a scope's log; empty if the scope does not exist.
    pub fn operations(&self, scope: &str) -> Rc<Vec<Operation>> {
        self.scopes
            .get(scope)
            .map(|s| Rc::clone(&s.operations))
            .unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Bookkeeping (Stack Overflow Protection, Call Scopes)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a function call. Returns error if max depth exceeded.
    pub fn enter_call(&mut self, class: Option<String>, max_depth: usize) -> Result<(), EvalError> {
        if self.call_depth >= max_depth {
            return Err(EvalError::runtime(format!(
                "stack overflow: call depth {} exceeds maximum {}",
                self.call_depth, max_depth
            )));
        }
        self.call_depth += 1;
        self.class_stack.push(class);
        Ok(())
    }

    /// Exit a function call.
    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
        self.class_stack.pop();
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Class of the method currently executing, if any.
    pub fn executing_class(&self) -> Option<&str> {
        self.class_stack.last().and_then(|c| c.as_deref())
    }

    /// Reserve a fresh `<defining>::<name>::call<N>` scope name.
    pub fn next_call_scope(&mut self, defining_scope: &str, name: &str) -> String {
        self.call_counter += 1;
        format!("{}::{}::call{}", defining_scope, name, self.call_counter)
    }

    pub fn call_counter(&self) -> u64 {
        self.call_counter
    }

    // ═══════════════════════════════════════════════════════════════════
    // Builtins and Output
    // ═══════════════════════════════════════════════════════════════════

    pub fn define_builtin(&mut self, builtin: BuiltinFn) {
        tracing::debug!(name = %builtin.name, "register builtin");
        self.builtins.insert(builtin.name.clone(), builtin);
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinFn> {
        self.builtins.get(name)
    }

    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    pub fn take_output(&mut self) -> String {
        self.output.take()
    }

    pub fn output_mut(&mut self) -> &mut OutputBuffer {
        &mut self.output
    }
}
