//! Statement parsing

use super::lower::{assign_target, lower};
use super::parsed::ParsedExpr;
use super::Parser;
use crate::ast::{BinaryOp, Expr, ExprKind, ForEachBinding, Stmt, StmtKind, SwitchCase};
use crate::error::{EvalError, Location};
use crate::stack::ensure_sufficient_stack;
use crate::token::TokenKind;
use crate::value::{Value, ValueType};

impl<'env> Parser<'env> {
    /// Parse one complete statement, including its terminator.
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, EvalError> {
        ensure_sufficient_stack(|| self.parse_statement_kind())
    }

    fn parse_statement_kind(&mut self) -> Result<Stmt, EvalError> {
        let token = self.peek().clone();
        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "function" => return self.parse_function_statement(),
                "class" => return self.parse_class(),
                "enum" => return self.parse_enum(),
                "if" => return self.parse_if(),
                "while" => return self.parse_while(),
                "for" => return self.parse_for(),
                "switch" => return self.parse_switch(),
                "return" => return self.parse_return(),
                "break" | "continue" => {
                    self.advance();
                    self.expect_punct(";")?;
                    let kind = if token.text == "break" {
                        StmtKind::Break
                    } else {
                        StmtKind::Continue
                    };
                    return Ok(Stmt::new(kind, token.location));
                }
                _ => {}
            }
        }
        let stmt = self.parse_simple_statement()?;
        self.expect_punct(";")?;
        Ok(stmt)
    }

    /// Declarations, assignments, increments and expression statements,
    /// without the trailing `;`. Also used for `for` init and step.
    fn parse_simple_statement(&mut self) -> Result<Stmt, EvalError> {
        if self.peek().is_keyword("const") || self.at_type() {
            return self.parse_declaration();
        }

        let location = self.location();

        // ++$x / --$x
        for (symbol, op) in [("++", BinaryOp::Add), ("--", BinaryOp::Sub)] {
            if self.eat_operator(symbol) {
                let target = self.parse_expression(None)?;
                return increment(target, op, location);
            }
        }

        let lhs = self.parse_expression(None)?;

        for (symbol, op) in [("++", BinaryOp::Add), ("--", BinaryOp::Sub)] {
            if self.eat_operator(symbol) {
                return increment(lhs, op, location);
            }
        }

        if self.eat_operator("=") {
            let target = assign_target(lhs)?;
            let value = lower(self.parse_expression(None)?)?;
            return Ok(Stmt::new(StmtKind::Assign { target, value }, location));
        }

        for (symbol, op) in [
            ("+=", BinaryOp::Add),
            ("-=", BinaryOp::Sub),
            ("*=", BinaryOp::Mul),
            ("/=", BinaryOp::Div),
            ("%=", BinaryOp::Rem),
        ] {
            if self.peek().is_operator(symbol) {
                let op_location = self.advance().location;
                let rhs = lower(self.parse_expression(None)?)?;
                return compound_assignment(lhs, op, rhs, op_location, location);
            }
        }

        Ok(Stmt::new(StmtKind::Expression(lower(lhs)?), location))
    }

    /// `[const] <type> $name [= expr]` (constants may use a bare name).
    fn parse_declaration(&mut self) -> Result<Stmt, EvalError> {
        let location = self.location();
        let constant = self.eat_keyword("const");
        let ty = self.parse_type()?;

        let name_token = match self.peek().kind {
            TokenKind::Variable => self.advance(),
            TokenKind::Identifier if constant => self.advance(),
            _ => return Err(self.unexpected("variable name")),
        };
        self.note_declaration(&name_token.text, &name_token.location)?;

        let init = if self.eat_operator("=") {
            lower(self.parse_expression(Some(&ty))?)?
        } else if constant {
            return Err(self.unexpected("'=' (constants need a value)"));
        } else {
            Expr::new(
                ExprKind::Literal(Value::Null(ValueType::Null)),
                name_token.location.clone(),
            )
        };

        Ok(Stmt::new(
            StmtKind::Declare {
                name: name_token.text,
                ty,
                init,
                constant,
            },
            location,
        ))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Control Flow
    // ═══════════════════════════════════════════════════════════════════

    fn parse_condition(&mut self) -> Result<Expr, EvalError> {
        self.expect_punct("(")?;
        let condition = lower(self.parse_expression(None)?)?;
        self.expect_punct(")")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("if")?.location;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat_keyword("else") {
            if self.peek().is_keyword("if") {
                vec![self.parse_if()?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            location,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("while")?.location;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While { condition, body }, location))
    }

    /// `for (init; cond; step)` or `for ([type $k,] type $v : expr)`.
    fn parse_for(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("for")?.location;
        self.expect_punct("(")?;
        self.declared.push(Default::default());
        let result = if self.at_foreach() {
            self.parse_foreach_rest(location)
        } else {
            self.parse_c_for_rest(location)
        };
        self.declared.pop();
        result
    }

    fn at_foreach(&self) -> bool {
        self.at_type()
            && self.peek_at(1).kind == TokenKind::Variable
            && (self.peek_at(2).is_punct(",") || self.peek_at(2).is_punct(":"))
    }

    fn parse_foreach_rest(&mut self, location: Location) -> Result<Stmt, EvalError> {
        let first = self.parse_foreach_binding()?;
        let (key, value) = if self.eat_punct(",") {
            (Some(first), self.parse_foreach_binding()?)
        } else {
            (None, first)
        };
        self.expect_punct(":")?;
        let iterable = lower(self.parse_expression(None)?)?;
        self.expect_punct(")")?;
        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::ForEach {
                key,
                value,
                iterable,
                body,
            },
            location,
        ))
    }

    fn parse_foreach_binding(&mut self) -> Result<ForEachBinding, EvalError> {
        let ty = self.parse_type()?;
        let name = self.expect_variable()?;
        self.note_declaration(&name.text, &name.location)?;
        Ok(ForEachBinding {
            name: name.text,
            ty,
        })
    }

    fn parse_c_for_rest(&mut self, location: Location) -> Result<Stmt, EvalError> {
        let init = if self.peek().is_punct(";") {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_punct(";")?;
        let condition = if self.peek().is_punct(";") {
            None
        } else {
            Some(lower(self.parse_expression(None)?)?)
        };
        self.expect_punct(";")?;
        let step = if self.peek().is_punct(")") {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_punct(")")?;
        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                step,
                body,
            },
            location,
        ))
    }

    /// `switch (expr) { case e: ... default: ... }` with an optional `;`.
    fn parse_switch(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("switch")?.location;
        let subject = self.parse_condition()?;
        self.expect_punct("{")?;
        self.declared.push(Default::default());

        let mut cases = Vec::new();
        let mut default = None;
        while !self.eat_punct("}") {
            if self.eat_keyword("case") {
                let value = lower(self.parse_expression(None)?)?;
                self.expect_punct(":")?;
                let body = self.parse_case_body()?;
                cases.push(SwitchCase { value, body });
            } else if self.peek().is_keyword("default") {
                let token = self.advance();
                self.expect_punct(":")?;
                if default.is_some() {
                    return Err(EvalError::syntax("duplicate default label", token.location));
                }
                default = Some(self.parse_case_body()?);
            } else {
                return Err(self.unexpected("'case', 'default' or '}'"));
            }
        }

        self.declared.pop();
        self.eat_punct(";");
        Ok(Stmt::new(
            StmtKind::Switch {
                subject,
                cases,
                default,
            },
            location,
        ))
    }

    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, EvalError> {
        let mut body = Vec::new();
        loop {
            let token = self.peek();
            if token.is_keyword("case") || token.is_keyword("default") || token.is_punct("}") {
                return Ok(body);
            }
            if token.is_eof() {
                return Err(self.unexpected("'}'"));
            }
            body.push(self.parse_statement()?);
        }
    }

    fn parse_return(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("return")?.location;
        let value = if self.peek().is_punct(";") {
            None
        } else {
            Some(lower(self.parse_expression(None)?)?)
        };
        self.expect_punct(";")?;
        Ok(Stmt::new(StmtKind::Return(value), location))
    }
}

/// `$x++` and friends become `$x = $x ± 1`.
fn increment(target: ParsedExpr, op: BinaryOp, location: Location) -> Result<Stmt, EvalError> {
    let one = Expr::new(ExprKind::Literal(Value::Integer(1)), location.clone());
    compound_assignment(target, op, one, location.clone(), location)
}

/// `target op= rhs` → `target = target op rhs`.
fn compound_assignment(
    target: ParsedExpr,
    op: BinaryOp,
    rhs: Expr,
    op_location: Location,
    location: Location,
) -> Result<Stmt, EvalError> {
    let current = lower(target.clone())?;
    let target = assign_target(target)?;
    let value = Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(current),
            rhs: Box::new(rhs),
        },
        op_location,
    );
    Ok(Stmt::new(StmtKind::Assign { target, value }, location))
}
