//! Executable expression and statement trees
//!
//! The parser lowers its parsed-expression trees into these closed sum
//! types; the evaluator matches on them exhaustively.

use std::fmt;
use std::rc::Rc;

use crate::error::Location;
use crate::types::DeclaredType;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// Operators
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::And | BinaryOp::Or => 1,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge => 2,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 4,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Value),
    /// `$name` or a bare constant name
    Identifier(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// `object->property`
    Member {
        object: Box<Expr>,
        property: String,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `{ key: value, ... }`; array literals arrive here keyed by position
    ObjectLiteral(Vec<(String, Expr)>),
    New {
        class: String,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `Name::member`: an enum member or a static property
    Scoped {
        scope: String,
        member: String,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Self { kind, location }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Self { kind, location }
    }
}

/// One step of an assignment path below the base variable.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// `->name`
    Member(String),
    /// `[expr]`
    Index(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `$base->a[0]...`
    Variable {
        name: String,
        path: Vec<PathSegment>,
    },
    /// `Class::prop`
    Static { class: String, member: String },
}

impl AssignTarget {
    /// Name recorded as the operation's target.
    pub fn base_name(&self) -> &str {
        match self {
            AssignTarget::Variable { name, .. } => name,
            AssignTarget::Static { member, .. } => member,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: DeclaredType,
}

/// A function or method signature. The body lives in the operation log of
/// `body_scope`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: DeclaredType,
    pub body_scope: String,
    pub private: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: DeclaredType,
    pub private: bool,
    pub is_static: bool,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    /// Scope holding the method bodies
    pub scope: String,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<Rc<FunctionDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    /// Members in source order; `None` means "previous + 1"
    pub members: Vec<(String, Option<i64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachBinding {
    pub name: String,
    pub ty: DeclaredType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Declare {
        name: String,
        ty: DeclaredType,
        init: Expr,
        constant: bool,
    },
    Assign {
        target: AssignTarget,
        value: Expr,
    },
    Expression(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    ForEach {
        key: Option<ForEachBinding>,
        value: ForEachBinding,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Function(Rc<FunctionDecl>),
    Class(Rc<ClassDecl>),
    Enum(EnumDecl),
}

impl StmtKind {
    /// Short label used in traces.
    pub fn label(&self) -> &'static str {
        match self {
            StmtKind::Declare { constant: true, .. } => "const",
            StmtKind::Declare { .. } => "declare",
            StmtKind::Assign { .. } => "assign",
            StmtKind::Expression(_) => "expression",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { .. } => "for",
            StmtKind::ForEach { .. } => "for-in",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Return(_) => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Function(_) => "function",
            StmtKind::Class(_) => "class",
            StmtKind::Enum(_) => "enum",
        }
    }
}
