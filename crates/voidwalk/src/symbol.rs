//! Symbols: the named entities stored in a scope's namespaces

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{EnumDecl, FunctionDecl, Param};
use crate::class::ClassInfo;
use crate::environment::OutputBuffer;
use crate::error::EvalError;
use crate::types::DeclaredType;
use crate::value::Value;

/// A mutable variable cell.
#[derive(Debug, Clone)]
pub struct Variable {
    pub value: Value,
    pub ty: DeclaredType,
}

impl Variable {
    pub fn new(value: Value, ty: DeclaredType) -> Self {
        Self { value, ty }
    }
}

/// A user-defined function or method.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub decl: Rc<FunctionDecl>,

    /// Scope the function was declared in at run time; call scopes are
    /// created beneath it
    pub defining_scope: String,

    /// Owning class for methods
    pub class: Option<String>,
}

impl FunctionSymbol {
    pub fn function(decl: Rc<FunctionDecl>, defining_scope: impl Into<String>) -> Self {
        Self {
            decl,
            defining_scope: defining_scope.into(),
            class: None,
        }
    }

    pub fn method(
        decl: Rc<FunctionDecl>,
        class_scope: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            decl,
            defining_scope: class_scope.into(),
            class: Some(class.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn params(&self) -> &[Param] {
        &self.decl.params
    }

    pub fn return_type(&self) -> &DeclaredType {
        &self.decl.return_type
    }

    pub fn is_private(&self) -> bool {
        self.decl.private
    }

    /// Display name: `Class::method` for methods.
    pub fn qualified_name(&self) -> String {
        match &self.class {
            Some(class) => format!("{}::{}", class, self.decl.name),
            None => self.decl.name.clone(),
        }
    }
}

/// An enum: member name to integer value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSymbol {
    pub name: String,
    pub members: IndexMap<String, i64>,
}

impl EnumSymbol {
    /// Assign values; unassigned members continue from the previous one.
    pub fn from_decl(decl: &EnumDecl) -> Result<Self, EvalError> {
        let mut members = IndexMap::new();
        let mut next = 0i64;
        for (name, explicit) in &decl.members {
            let value = explicit.unwrap_or(next);
            if members.insert(name.clone(), value).is_some() {
                return Err(EvalError::name(format!(
                    "enum member {}::{} already declared",
                    decl.name, name
                )));
            }
            next = value.wrapping_add(1);
        }
        Ok(Self {
            name: decl.name.clone(),
            members,
        })
    }

    pub fn value(&self, member: &str) -> Option<i64> {
        self.members.get(member).copied()
    }
}

/// Entries in the class/enum namespace.
#[derive(Debug, Clone)]
pub enum TypeSymbol {
    Class(Rc<ClassInfo>),
    Enum(Rc<EnumSymbol>),
}

/// Anything that can be added to a scope.
#[derive(Debug, Clone)]
pub enum Symbol {
    Variable { name: String, variable: Variable },
    Constant { name: String, value: Value },
    Function(Rc<FunctionSymbol>),
    Class(Rc<ClassInfo>),
    Enum(Rc<EnumSymbol>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable { name, .. } | Symbol::Constant { name, .. } => name,
            Symbol::Function(f) => f.name(),
            Symbol::Class(c) => c.name(),
            Symbol::Enum(e) => &e.name,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Builtins
// ═══════════════════════════════════════════════════════════════════════

/// Native callback signature. Errors are plain messages; the caller turns
/// them into runtime errors at the call site.
pub type BuiltinFnPtr = Rc<dyn Fn(&[Value], &mut OutputBuffer) -> Result<Value, String>>;

/// A native function exposed to scripts.
#[derive(Clone)]
pub struct BuiltinFn {
    pub name: String,

    /// `None` for variadic
    pub arity: Option<usize>,

    pub return_type: DeclaredType,

    pub func: BuiltinFnPtr,
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}
