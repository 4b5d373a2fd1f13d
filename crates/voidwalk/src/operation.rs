//! Operations: statements recorded, in source order, against a scope

use crate::ast::{Stmt, StmtKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Declaration,
    Assignment,
    Expression,
    Conditional,
    Loop,
    Switch,
    Return,
    Break,
    Continue,
    FunctionDeclaration,
    ClassDeclaration,
    EnumDeclaration,
}

/// `{kind, target name, owned statement}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,

    /// The name the statement acts on, empty when there is none
    pub target: String,

    pub stmt: Stmt,
}

impl Operation {
    /// Classify a statement into an operation.
    pub fn new(stmt: Stmt) -> Self {
        let (kind, target) = match &stmt.kind {
            StmtKind::Declare { name, .. } => (OperationKind::Declaration, name.clone()),
            StmtKind::Assign { target, .. } => {
                (OperationKind::Assignment, target.base_name().to_string())
            }
            StmtKind::Expression(_) => (OperationKind::Expression, String::new()),
            StmtKind::If { .. } => (OperationKind::Conditional, String::new()),
            StmtKind::While { .. } | StmtKind::For { .. } | StmtKind::ForEach { .. } => {
                (OperationKind::Loop, String::new())
            }
            StmtKind::Switch { .. } => (OperationKind::Switch, String::new()),
            StmtKind::Return(_) => (OperationKind::Return, String::new()),
            StmtKind::Break => (OperationKind::Break, String::new()),
            StmtKind::Continue => (OperationKind::Continue, String::new()),
            StmtKind::Function(decl) => (OperationKind::FunctionDeclaration, decl.name.clone()),
            StmtKind::Class(decl) => (OperationKind::ClassDeclaration, decl.name.clone()),
            StmtKind::Enum(decl) => (OperationKind::EnumDeclaration, decl.name.clone()),
        };
        Self { kind, target, stmt }
    }
}
