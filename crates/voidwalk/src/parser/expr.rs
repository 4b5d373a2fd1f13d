//! Expression parsing: shunting-yard over an operator stack and an
//! operand stack
//!
//! Precedence, loosest first:
//!
//! | level | operators                         |
//! |-------|-----------------------------------|
//! | 1     | `&&` `\|\|`                       |
//! | 2     | `==` `!=` `<` `>` `<=` `>=`       |
//! | 3     | `+` `-`                           |
//! | 4     | `*` `/` `%`                       |
//! | 5     | unary `+` `-` `!`                 |
//! | 6     | `->` and `[ ]`                    |
//!
//! All binary levels are left-associative. Whether `+`/`-` is unary is
//! decided by `expect_operand`, which is true at the start, after any
//! operator and after `(`.

use super::parsed::{ObjectEntry, Operator, ParsedExpr};
use super::Parser;
use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{EvalError, Location};
use crate::token::TokenKind;
use crate::types::DeclaredType;
use crate::value::{Value, ValueType};

/// Entries of the operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Unary(UnaryOp),
    Binary(Operator),
    /// `(` sentinel
    Group,
}

impl Pending {
    fn precedence(&self) -> u8 {
        match self {
            Pending::Unary(_) => Operator::UNARY_PRECEDENCE,
            Pending::Binary(op) => op.precedence(),
            Pending::Group => 0,
        }
    }
}

struct Stacks {
    output: Vec<ParsedExpr>,
    operators: Vec<(Pending, Location)>,
}

impl Stacks {
    /// Pop and apply operators that bind at least as tightly as
    /// `precedence`, stopping at a group sentinel.
    fn reduce_while(&mut self, precedence: u8) -> Result<(), EvalError> {
        while let Some((top, _)) = self.operators.last() {
            if matches!(top, Pending::Group) || top.precedence() < precedence {
                break;
            }
            self.reduce_top()?;
        }
        Ok(())
    }

    fn reduce_top(&mut self) -> Result<(), EvalError> {
        let Some((pending, location)) = self.operators.pop() else {
            return Ok(());
        };
        match pending {
            Pending::Unary(op) => {
                let operand = self.pop_operand(&location, op.symbol())?;
                self.output.push(ParsedExpr::Unary {
                    op,
                    operand: Box::new(operand),
                    location,
                });
            }
            Pending::Binary(op) => {
                let rhs = self.pop_operand(&location, "operator")?;
                let lhs = self.pop_operand(&location, "operator")?;
                self.output.push(ParsedExpr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    location,
                });
            }
            Pending::Group => {
                return Err(EvalError::expected("unmatched '('", "')'", location));
            }
        }
        Ok(())
    }

    fn pop_operand(&mut self, location: &Location, what: &str) -> Result<ParsedExpr, EvalError> {
        self.output.pop().ok_or_else(|| {
            EvalError::expected(
                format!("missing operand for {}", what),
                "expression",
                location.clone(),
            )
        })
    }
}

impl<'env> Parser<'env> {
    /// Parse a maximal expression. Stops (without consuming) at anything
    /// that cannot continue it: `;`, `,`, `:`, `=`, an unmatched `)`, ...
    ///
    /// When `expected` is given, numeric literals are coerced toward it.
    pub(crate) fn parse_expression(
        &mut self,
        expected: Option<&DeclaredType>,
    ) -> Result<ParsedExpr, EvalError> {
        let start = self.location();
        let mut stacks = Stacks {
            output: Vec::new(),
            operators: Vec::new(),
        };
        let mut groups = 0usize;
        let mut expect_operand = true;

        loop {
            let token = self.peek().clone();

            if expect_operand {
                if let Some(op) = unary_operator(&token) {
                    self.advance();
                    stacks.operators.push((Pending::Unary(op), token.location));
                    continue;
                }
                if token.is_punct("(") {
                    self.advance();
                    stacks.operators.push((Pending::Group, token.location));
                    groups += 1;
                    continue;
                }
                let operand = self.parse_operand()?;
                stacks.output.push(operand);
                expect_operand = false;
                continue;
            }

            if token.is_operator("->") {
                stacks.reduce_while(Operator::POSTFIX_PRECEDENCE)?;
                self.advance();
                stacks
                    .operators
                    .push((Pending::Binary(Operator::Member), token.location));
                expect_operand = true;
                continue;
            }

            if token.is_punct("[") {
                stacks.reduce_while(Operator::POSTFIX_PRECEDENCE)?;
                self.advance();
                let index = self.parse_expression(None)?;
                self.expect_punct("]")?;
                let object = stacks.pop_operand(&token.location, "'['")?;
                stacks.output.push(ParsedExpr::Binary {
                    op: Operator::Index,
                    lhs: Box::new(object),
                    rhs: Box::new(index),
                    location: token.location,
                });
                continue;
            }

            if let Some(op) = binary_operator(&token) {
                stacks.reduce_while(op.precedence())?;
                self.advance();
                stacks
                    .operators
                    .push((Pending::Binary(Operator::Binary(op)), token.location));
                expect_operand = true;
                continue;
            }

            if token.is_punct(")") && groups > 0 {
                self.advance();
                stacks.reduce_while(0)?;
                match stacks.operators.pop() {
                    Some((Pending::Group, _)) => groups -= 1,
                    _ => return Err(EvalError::syntax("unmatched ')'", token.location)),
                }
                continue;
            }

            break;
        }

        if expect_operand {
            let message = if stacks.output.is_empty() && stacks.operators.is_empty() {
                "empty expression"
            } else {
                "missing operand"
            };
            return Err(EvalError::expected(message, "expression", self.location()));
        }

        while !stacks.operators.is_empty() {
            stacks.reduce_top()?;
        }

        let expr = match (stacks.output.pop(), stacks.output.is_empty()) {
            (Some(expr), true) => expr,
            _ => return Err(EvalError::syntax("malformed expression", start)),
        };
        Ok(match expected {
            Some(ty) => expr.coerce_literal(ty),
            None => expr,
        })
    }

    /// A single operand: literal, variable, name, call, `new`, object or
    /// array literal.
    fn parse_operand(&mut self) -> Result<ParsedExpr, EvalError> {
        let token = self.peek().clone();
        let location = token.location.clone();

        match token.kind {
            TokenKind::Integer => {
                self.advance();
                let n: i64 = token.text.parse().map_err(|_| {
                    EvalError::syntax(
                        format!("integer literal {} out of range", token.text),
                        location.clone(),
                    )
                })?;
                Ok(literal(Value::Integer(n), location))
            }
            TokenKind::Decimal => {
                self.advance();
                let n: f64 = token.text.parse().map_err(|_| {
                    EvalError::syntax(format!("invalid number {}", token.text), location.clone())
                })?;
                Ok(literal(Value::Double(n), location))
            }
            TokenKind::String => {
                self.advance();
                Ok(literal(Value::String(token.text), location))
            }
            TokenKind::Variable => {
                self.advance();
                Ok(ParsedExpr::Variable {
                    name: token.text,
                    location,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                if self.peek().is_punct("(") {
                    let args = self.parse_arguments()?;
                    return Ok(ParsedExpr::Call {
                        name: token.text,
                        args,
                        location,
                    });
                }
                if self.eat_operator("::") {
                    let member = self.expect_identifier()?;
                    return Ok(ParsedExpr::Scoped {
                        scope: token.text,
                        member: member.text,
                        location,
                    });
                }
                Ok(ParsedExpr::Name {
                    name: token.text,
                    location,
                })
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" | "false" => {
                    self.advance();
                    Ok(literal(Value::Boolean(token.text == "true"), location))
                }
                "null" => {
                    self.advance();
                    Ok(literal(Value::Null(ValueType::Null), location))
                }
                "new" => {
                    self.advance();
                    let class = self.expect_identifier()?;
                    let args = if self.peek().is_punct("(") {
                        self.parse_arguments()?
                    } else {
                        Vec::new()
                    };
                    Ok(ParsedExpr::New {
                        class: class.text,
                        args,
                        location,
                    })
                }
                _ => Err(self.unexpected("expression")),
            },
            TokenKind::Punctuation if token.text == "{" => self.parse_object_literal(),
            TokenKind::Punctuation if token.text == "[" => self.parse_array_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `( expr, expr, ... )`
    pub(super) fn parse_arguments(&mut self) -> Result<Vec<ParsedExpr>, EvalError> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if self.eat_punct(")") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression(None)?);
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(")")?;
            return Ok(args);
        }
    }

    /// `{ [type] key: expr, ... }` with identifier, string, number or
    /// variable keys.
    fn parse_object_literal(&mut self) -> Result<ParsedExpr, EvalError> {
        let location = self.expect_punct("{")?.location;
        let mut entries = Vec::new();
        while !self.peek().is_punct("}") {
            let ty = if self.at_entry_type() {
                Some(self.parse_type()?)
            } else {
                None
            };
            let key = self.parse_object_key()?;
            self.expect_punct(":")?;
            let value = self.parse_expression(ty.as_ref())?;
            entries.push(ObjectEntry { key, ty, value });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(ParsedExpr::Object { entries, location })
    }

    /// A type tag precedes the key when the token after it is not `:`.
    fn at_entry_type(&self) -> bool {
        let token = self.peek();
        let is_type = match token.kind {
            TokenKind::Keyword => DeclaredType::from_keyword(&token.text).is_some(),
            TokenKind::Identifier => true,
            _ => false,
        };
        is_type && !self.peek_at(1).is_punct(":")
    }

    fn parse_object_key(&mut self) -> Result<String, EvalError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Identifier
            | TokenKind::Keyword
            | TokenKind::String
            | TokenKind::Integer
            | TokenKind::Variable => {
                self.advance();
                Ok(token.text)
            }
            _ => Err(self.unexpected("object key")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<ParsedExpr, EvalError> {
        let location = self.expect_punct("[")?.location;
        let mut items = Vec::new();
        while !self.peek().is_punct("]") {
            items.push(self.parse_expression(None)?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(ParsedExpr::Array { items, location })
    }
}

fn literal(value: Value, location: Location) -> ParsedExpr {
    ParsedExpr::Literal { value, location }
}

fn unary_operator(token: &crate::token::Token) -> Option<UnaryOp> {
    if token.kind != TokenKind::Operator {
        return None;
    }
    match token.text.as_str() {
        "-" => Some(UnaryOp::Neg),
        "+" => Some(UnaryOp::Plus),
        "!" => Some(UnaryOp::Not),
        _ => None,
    }
}

fn binary_operator(token: &crate::token::Token) -> Option<BinaryOp> {
    if token.kind != TokenKind::Operator {
        return None;
    }
    BinaryOp::from_symbol(&token.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> Result<ParsedExpr, EvalError> {
        let mut env = Environment::new();
        let tokens = tokenize(src, "t")?;
        let mut parser = Parser::new(tokens, &mut env);
        parser.parse_expression(None)
    }

    /// Render a parsed tree in prefix form for compact assertions.
    fn sexp(expr: &ParsedExpr) -> String {
        match expr {
            ParsedExpr::Literal { value, .. } => match value {
                Value::String(s) => format!("{:?}", s),
                other => other.to_string(),
            },
            ParsedExpr::Variable { name, .. } => format!("${}", name),
            ParsedExpr::Name { name, .. } => name.clone(),
            ParsedExpr::Scoped { scope, member, .. } => format!("{}::{}", scope, member),
            ParsedExpr::Call { name, args, .. } => {
                let args: Vec<String> = args.iter().map(sexp).collect();
                format!("(call {} {})", name, args.join(" "))
            }
            ParsedExpr::New { class, args, .. } => format!("(new {} {})", class, args.len()),
            ParsedExpr::Object { entries, .. } => {
                let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
                format!("{{{}}}", keys.join(" "))
            }
            ParsedExpr::Array { items, .. } => format!("[{}]", items.len()),
            ParsedExpr::Unary { op, operand, .. } => format!("({} {})", op.symbol(), sexp(operand)),
            ParsedExpr::Binary { op, lhs, rhs, .. } => {
                let sym = match op {
                    Operator::Binary(b) => b.symbol(),
                    Operator::Member => "->",
                    Operator::Index => "[]",
                };
                format!("({} {} {})", sym, sexp(lhs), sexp(rhs))
            }
        }
    }

    fn tree(src: &str) -> String {
        sexp(&parse(src).unwrap())
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert_eq!(tree("1 + 2 * 3"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(tree("10 - 4 - 3"), "(- (- 10 4) 3)");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(tree("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    }

    #[test]
    fn test_logical_loosest() {
        assert_eq!(
            tree("$a < 1 && $b == 2 || !$c"),
            "(|| (&& (< $a 1) (== $b 2)) (! $c))"
        );
    }

    #[test]
    fn test_unary_minus_after_operator() {
        assert_eq!(tree("2 * -3"), "(* 2 (- 3))");
        assert_eq!(tree("-2 - -3"), "(- (- 2) (- 3))");
    }

    #[test]
    fn test_member_binds_tighter_than_unary() {
        assert_eq!(tree("-$a->b"), "(- (-> $a b))");
        assert_eq!(tree("!$o->ok"), "(! (-> $o ok))");
    }

    #[test]
    fn test_member_chain_and_method_call() {
        assert_eq!(tree("$a->b->c"), "(-> (-> $a b) c)");
        assert_eq!(tree("$a->f(1, 2)"), "(-> $a (call f 1 2))");
    }

    #[test]
    fn test_indexing() {
        assert_eq!(tree("$o[\"k\"]"), "([] $o \"k\")");
        assert_eq!(tree("$a->b[0]"), "([] (-> $a b) 0)");
        assert_eq!(tree("$m[1][2] + 1"), "(+ ([] ([] $m 1) 2) 1)");
    }

    #[test]
    fn test_calls_and_new() {
        assert_eq!(tree("add(1, 2 * 3)"), "(call add 1 (* 2 3))");
        assert_eq!(tree("f()"), "(call f )");
        assert_eq!(tree("new Point(1, 2)"), "(new Point 2)");
        assert_eq!(tree("Color::Red"), "Color::Red");
    }

    #[test]
    fn test_object_and_array_literals() {
        assert_eq!(tree("{\"k\": \"v\", n: 1, int c: 2}"), "{k n c}");
        assert_eq!(tree("[1, 2, 3]"), "[3]");
        assert_eq!(tree("{}"), "{}");
    }

    #[test]
    fn test_stops_at_statement_terminator() {
        let mut env = Environment::new();
        let tokens = tokenize("1 + 2; 3", "t").unwrap();
        let mut parser = Parser::new(tokens, &mut env);
        parser.parse_expression(None).unwrap();
        assert!(parser.peek().is_punct(";"));
    }

    #[test]
    fn test_unmatched_open_paren() {
        assert!(matches!(parse("(1 + 2"), Err(EvalError::SyntaxError { .. })));
    }

    #[test]
    fn test_missing_operand() {
        let err = parse("1 +").unwrap_err();
        assert!(matches!(err, EvalError::SyntaxError { .. }));
        assert_eq!(err.location().column, 4);
    }

    #[test]
    fn test_empty_expression() {
        let err = parse(";").unwrap_err();
        assert!(matches!(err, EvalError::SyntaxError { .. }));
    }

    #[test]
    fn test_expected_type_coerces_literal() {
        let mut env = Environment::new();
        let tokens = tokenize("5", "t").unwrap();
        let mut parser = Parser::new(tokens, &mut env);
        let expr = parser.parse_expression(Some(&DeclaredType::Double)).unwrap();
        assert!(matches!(
            expr,
            ParsedExpr::Literal { value: Value::Double(d), .. } if d == 5.0
        ));
    }
}
