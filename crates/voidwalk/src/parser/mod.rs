//! Parser: token stream → per-scope operation logs
//!
//! # Architecture
//!
//! ```text
//! tokens ─► expr (shunting-yard) ─► ParsedExpr ─► lower ─► ast::Expr
//!    │
//!    └────► stmt / decl (recursive descent) ─► ast::Stmt ─► Operation
//! ```
//!
//! Top-level statements, and the statements of every function, method and
//! class body, are appended as [`Operation`]s to the log of the scope they
//! were declared in. Bodies get their own child scope
//! (`<parent>::<name>`), created in the shared [`Environment`] while
//! parsing. Control-flow bodies are kept inline in their statement.

mod decl;
mod expr;
mod lower;
mod parsed;
mod stmt;

pub use lower::lower;
pub use parsed::{ObjectEntry, Operator, ParsedExpr};

use std::collections::HashSet;

use crate::environment::{Environment, ScopeKind};
use crate::error::{EvalError, Location};
use crate::operation::Operation;
use crate::token::{Token, TokenKind};
use crate::types::DeclaredType;

pub struct Parser<'env> {
    tokens: Vec<Token>,
    pos: usize,
    env: &'env mut Environment,

    /// Scope whose log receives parsed statements
    scope: String,

    /// Enclosing parse scopes, innermost last
    scope_stack: Vec<String>,

    /// Names declared in each open lexical block
    declared: Vec<HashSet<String>>,

    /// Body scopes this parser created, in creation order
    created: Vec<String>,
}

impl<'env> Parser<'env> {
    /// Parse into the environment's current scope.
    pub fn new(tokens: Vec<Token>, env: &'env mut Environment) -> Self {
        let scope = env.current_name().to_string();
        Self {
            tokens,
            pos: 0,
            env,
            scope,
            scope_stack: Vec::new(),
            declared: vec![HashSet::new()],
            created: Vec::new(),
        }
    }

    /// Parse every statement up to end of input, appending each as an
    /// operation. Returns the number of operations appended.
    ///
    /// On error nothing is left behind: the log is cut back to where it
    /// started and the body scopes created so far are removed.
    pub fn parse_program(&mut self) -> Result<usize, EvalError> {
        let scope = self.scope.clone();
        let start = self.env.operations(&scope).len();
        let mut count = 0;
        while !self.peek().is_eof() {
            let appended = self.parse_statement().and_then(|stmt| {
                self.env.append_operation(&scope, Operation::new(stmt))
            });
            if let Err(err) = appended {
                self.rollback(&scope, start);
                return Err(err);
            }
            count += 1;
        }
        tracing::trace!(scope = %scope, count, "parsed program");
        Ok(count)
    }

    /// Body scopes created by this parser, outermost first.
    pub fn created_scopes(&self) -> &[String] {
        &self.created
    }

    fn rollback(&mut self, scope: &str, start: usize) {
        tracing::trace!(scope, start, bodies = self.created.len(), "rollback parse");
        self.env.truncate_operations(scope, start);
        for body in self.created.drain(..).rev() {
            self.env.remove_scope(&body);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Token `n` places ahead; end of input repeats forever.
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
        token
    }

    fn location(&self) -> Location {
        self.peek().location.clone()
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.peek().is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_operator(&mut self, op: &str) -> bool {
        if self.peek().is_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.peek().is_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<Token, EvalError> {
        if self.peek().is_punct(p) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{}'", p)))
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token, EvalError> {
        if self.peek().is_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{}'", word)))
        }
    }

    fn expect_identifier(&mut self) -> Result<Token, EvalError> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn expect_variable(&mut self) -> Result<Token, EvalError> {
        if self.peek().kind == TokenKind::Variable {
            Ok(self.advance())
        } else {
            Err(self.unexpected("variable"))
        }
    }

    /// SyntaxError at the current token.
    fn unexpected(&self, expected: &str) -> EvalError {
        let token = self.peek();
        EvalError::expected(
            format!("unexpected {}", token),
            expected,
            token.location.clone(),
        )
    }

    // ═══════════════════════════════════════════════════════════════════
    // Types
    // ═══════════════════════════════════════════════════════════════════

    /// Whether a declaration starts here: a type keyword, or a class name
    /// followed by a variable.
    fn at_type(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Keyword => {
                DeclaredType::from_keyword(&token.text).is_some() && token.text != "null"
            }
            TokenKind::Identifier => self.peek_at(1).kind == TokenKind::Variable,
            _ => false,
        }
    }

    fn parse_type(&mut self) -> Result<DeclaredType, EvalError> {
        let token = self.peek().clone();
        let ty = match token.kind {
            TokenKind::Keyword => DeclaredType::from_keyword(&token.text),
            TokenKind::Identifier => Some(DeclaredType::Class(token.text.clone())),
            _ => None,
        };
        match ty {
            Some(ty) => {
                self.advance();
                Ok(ty)
            }
            None => Err(self.unexpected("type")),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Parse Scopes and Blocks
    // ═══════════════════════════════════════════════════════════════════

    /// Open a body scope `<current>::<name>` and make it the target of
    /// parsed statements. Fails if any scope of that name exists already,
    /// empty or not.
    fn open_body_scope(&mut self, name: &str, location: &Location) -> Result<String, EvalError> {
        let qualified = format!("{}::{}", self.scope, name);
        if !self.env.create(&qualified, ScopeKind::Body) {
            return Err(EvalError::NameError {
                message: format!("{} already declared in scope {}", name, self.scope),
                location: location.clone(),
            });
        }
        self.created.push(qualified.clone());
        let outer = std::mem::replace(&mut self.scope, qualified.clone());
        self.scope_stack.push(outer);
        self.declared.push(HashSet::new());
        Ok(qualified)
    }

    fn close_body_scope(&mut self) {
        if let Some(outer) = self.scope_stack.pop() {
            self.scope = outer;
        }
        self.declared.pop();
    }

    /// Record a declaration in the innermost lexical block.
    fn note_declaration(&mut self, name: &str, location: &Location) -> Result<(), EvalError> {
        let fresh = self
            .declared
            .last_mut()
            .map_or(true, |names| names.insert(name.to_string()));
        if fresh {
            Ok(())
        } else {
            Err(EvalError::NameError {
                message: format!("${} already declared in scope {}", name, self.scope),
                location: location.clone(),
            })
        }
    }

    /// Parse `{ statements }`, or a single statement, as an inline block.
    fn parse_block(&mut self) -> Result<Vec<crate::ast::Stmt>, EvalError> {
        self.declared.push(HashSet::new());
        let result = self.parse_block_inner();
        self.declared.pop();
        result
    }

    fn parse_block_inner(&mut self) -> Result<Vec<crate::ast::Stmt>, EvalError> {
        if !self.eat_punct("{") {
            return Ok(vec![self.parse_statement()?]);
        }
        let mut stmts = Vec::new();
        while !self.peek().is_punct("}") {
            if self.peek().is_eof() {
                return Err(self.unexpected("'}'"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance();
        Ok(stmts)
    }

    /// Parse `{ statements }` into the log of the current body scope.
    fn parse_body_operations(&mut self) -> Result<(), EvalError> {
        self.expect_punct("{")?;
        while !self.peek().is_punct("}") {
            if self.peek().is_eof() {
                return Err(self.unexpected("'}'"));
            }
            let stmt = self.parse_statement()?;
            let scope = self.scope.clone();
            self.env.append_operation(&scope, Operation::new(stmt))?;
        }
        self.advance();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::operation::OperationKind;

    fn parse(src: &str) -> Result<Environment, EvalError> {
        let mut env = Environment::new();
        let tokens = tokenize(src, "test")?;
        Parser::new(tokens, &mut env).parse_program()?;
        Ok(env)
    }

    #[test]
    fn test_top_level_statements_become_root_operations() {
        let env = parse("int $a = 1; $a = 2; print($a);").unwrap();
        let kinds: Vec<OperationKind> = env.operations("main").iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Declaration,
                OperationKind::Assignment,
                OperationKind::Expression
            ]
        );
        assert_eq!(env.operations("main")[1].target, "a");
    }

    #[test]
    fn test_function_body_goes_to_child_scope() {
        let env = parse("function add(int $a, int $b) int { return $a + $b; }").unwrap();
        let root = env.operations("main");
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].kind, OperationKind::FunctionDeclaration);
        assert_eq!(root[0].target, "add");
        let body = env.operations("main::add");
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].kind, OperationKind::Return);
    }

    #[test]
    fn test_class_methods_get_scopes_under_class() {
        let env = parse("class A { function f() { return 1; } }").unwrap();
        assert!(env.contains_scope("main::A"));
        assert_eq!(env.operations("main::A::f").len(), 1);
    }

    #[test]
    fn test_same_block_redeclaration_is_name_error() {
        let err = parse("int $a = 1; int $a = 2;").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_shadowing_in_nested_body_is_allowed() {
        assert!(parse("int $a = 1; function f() { int $a = 2; }").is_ok());
    }

    #[test]
    fn test_duplicate_function_is_name_error() {
        let err = parse("function f() { return 1; } function f() { return 2; }").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
    }

    #[test]
    fn test_duplicate_empty_function_is_name_error() {
        let err = parse("function f() { } f(); function f() { print(1); }").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
    }

    #[test]
    fn test_parse_error_rolls_back_log_and_bodies() {
        let mut env = Environment::new();
        let tokens = tokenize("function g() int { return 1; } int $x = ;", "t").unwrap();
        let mut parser = Parser::new(tokens, &mut env);
        assert!(parser.parse_program().is_err());
        assert!(parser.created_scopes().is_empty());
        assert!(!env.contains_scope("main::g"));
        assert!(env.operations("main").is_empty());
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("int $a = 1").unwrap_err();
        assert!(matches!(
            err,
            EvalError::SyntaxError { expected: Some(ref e), .. } if e == "';'"
        ));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("while (true) { $a = 1;").unwrap_err();
        assert!(matches!(err, EvalError::SyntaxError { .. }));
    }
}
