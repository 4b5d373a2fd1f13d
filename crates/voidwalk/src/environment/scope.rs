//! A single node of the scope tree

use std::rc::Rc;

use indexmap::IndexMap;

use crate::operation::Operation;
use crate::symbol::{FunctionSymbol, TypeSymbol, Variable};
use crate::value::Value;

/// What created a scope; decides how redeclaration is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The script root
    Root,
    /// A function, method or class body as seen by the parser
    Body,
    /// One invocation of a function or method
    Call,
    /// A loop or conditional body, reused across iterations
    Block,
}

impl ScopeKind {
    /// Block scopes re-run their declarations, so redeclaring updates the
    /// existing binding instead of failing.
    pub fn allows_redeclaration(&self) -> bool {
        matches!(self, ScopeKind::Block)
    }
}

/// A named scope with four independent namespaces and an operation log.
#[derive(Debug, Clone)]
pub struct Scope {
    pub(super) name: String,
    pub(super) kind: ScopeKind,
    pub(super) parent: Option<String>,
    pub(super) children: Vec<String>,
    pub(super) variables: IndexMap<String, Variable>,
    pub(super) constants: IndexMap<String, Value>,
    pub(super) functions: IndexMap<String, Rc<FunctionSymbol>>,
    pub(super) types: IndexMap<String, TypeSymbol>,
    pub(super) operations: Rc<Vec<Operation>>,
}

impl Scope {
    pub(super) fn new(name: String, kind: ScopeKind) -> Self {
        let parent = parent_name(&name).map(str::to_string);
        Self {
            name,
            kind,
            parent,
            children: Vec::new(),
            variables: IndexMap::new(),
            constants: IndexMap::new(),
            functions: IndexMap::new(),
            types: IndexMap::new(),
            operations: Rc::new(Vec::new()),
        }
    }

    /// Fully-qualified `::`-separated name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Qualified name of the parent scope.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Rc<FunctionSymbol>> {
        self.functions.get(name)
    }

    pub fn type_symbol(&self, name: &str) -> Option<&TypeSymbol> {
        self.types.get(name)
    }

    /// Names of the variables declared here, in declaration order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

/// Strip the last `::segment` of a qualified name.
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once("::").map(|(parent, _)| parent)
}
