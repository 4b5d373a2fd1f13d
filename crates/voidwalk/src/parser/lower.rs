//! Lowering parsed expressions into the executable AST

use super::parsed::{Operator, ParsedExpr};
use crate::ast::{AssignTarget, Expr, ExprKind, PathSegment};
use crate::error::EvalError;

/// Turn a parsed-expression tree into an [`Expr`].
///
/// `->` becomes a member read or, when its right side is a call, a method
/// call; `[ ]` becomes an index read; array literals become objects keyed
/// by position.
pub fn lower(parsed: ParsedExpr) -> Result<Expr, EvalError> {
    let location = parsed.location().clone();
    let kind = match parsed {
        ParsedExpr::Literal { value, .. } => ExprKind::Literal(value),
        ParsedExpr::Variable { name, .. } | ParsedExpr::Name { name, .. } => {
            ExprKind::Identifier(name)
        }
        ParsedExpr::Scoped { scope, member, .. } => ExprKind::Scoped { scope, member },
        ParsedExpr::Call { name, args, .. } => ExprKind::Call {
            name,
            args: lower_all(args)?,
        },
        ParsedExpr::New { class, args, .. } => ExprKind::New {
            class,
            args: lower_all(args)?,
        },
        ParsedExpr::Object { entries, .. } => ExprKind::ObjectLiteral(
            entries
                .into_iter()
                .map(|entry| Ok((entry.key, lower(entry.value)?)))
                .collect::<Result<_, EvalError>>()?,
        ),
        ParsedExpr::Array { items, .. } => ExprKind::ObjectLiteral(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Ok((i.to_string(), lower(item)?)))
                .collect::<Result<_, EvalError>>()?,
        ),
        ParsedExpr::Unary { op, operand, .. } => ExprKind::Unary {
            op,
            operand: Box::new(lower(*operand)?),
        },
        ParsedExpr::Binary { op, lhs, rhs, .. } => match op {
            Operator::Binary(op) => ExprKind::Binary {
                op,
                lhs: Box::new(lower(*lhs)?),
                rhs: Box::new(lower(*rhs)?),
            },
            Operator::Index => ExprKind::Index {
                object: Box::new(lower(*lhs)?),
                index: Box::new(lower(*rhs)?),
            },
            Operator::Member => match *rhs {
                ParsedExpr::Name { name, .. } => ExprKind::Member {
                    object: Box::new(lower(*lhs)?),
                    property: name,
                },
                ParsedExpr::Call { name, args, .. } => ExprKind::MethodCall {
                    receiver: Box::new(lower(*lhs)?),
                    method: name,
                    args: lower_all(args)?,
                },
                other => {
                    return Err(EvalError::expected(
                        "invalid member access",
                        "property or method name after '->'",
                        other.location().clone(),
                    ))
                }
            },
        },
    };
    Ok(Expr::new(kind, location))
}

fn lower_all(items: Vec<ParsedExpr>) -> Result<Vec<Expr>, EvalError> {
    items.into_iter().map(lower).collect()
}

/// Interpret a parsed expression as the left side of an assignment: a
/// variable followed by `->member` / `[index]` steps, or `Class::prop`.
pub(super) fn assign_target(parsed: ParsedExpr) -> Result<AssignTarget, EvalError> {
    match parsed {
        ParsedExpr::Scoped { scope, member, .. } => Ok(AssignTarget::Static {
            class: scope,
            member,
        }),
        other => {
            let mut path = Vec::new();
            let name = collect_path(other, &mut path)?;
            Ok(AssignTarget::Variable { name, path })
        }
    }
}

fn collect_path(parsed: ParsedExpr, path: &mut Vec<PathSegment>) -> Result<String, EvalError> {
    match parsed {
        ParsedExpr::Variable { name, .. } => Ok(name),
        ParsedExpr::Binary {
            op: Operator::Member,
            lhs,
            rhs,
            ..
        } => {
            let base = collect_path(*lhs, path)?;
            match *rhs {
                ParsedExpr::Name { name, .. } => path.push(PathSegment::Member(name)),
                other => return Err(invalid_target(&other)),
            }
            Ok(base)
        }
        ParsedExpr::Binary {
            op: Operator::Index,
            lhs,
            rhs,
            ..
        } => {
            let base = collect_path(*lhs, path)?;
            path.push(PathSegment::Index(lower(*rhs)?));
            Ok(base)
        }
        other => Err(invalid_target(&other)),
    }
}

fn invalid_target(parsed: &ParsedExpr) -> EvalError {
    EvalError::expected(
        "invalid assignment target",
        "variable, property or index",
        parsed.location().clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::value::Value;

    fn parsed(src: &str) -> ParsedExpr {
        let mut env = Environment::new();
        let tokens = tokenize(src, "t").unwrap();
        Parser::new(tokens, &mut env).parse_expression(None).unwrap()
    }

    #[test]
    fn test_member_with_call_becomes_method_call() {
        let expr = lower(parsed("$b->speak(1)")).unwrap();
        let ExprKind::MethodCall { method, args, .. } = expr.kind else {
            panic!("expected method call, got {:?}", expr.kind);
        };
        assert_eq!(method, "speak");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_member_with_name_becomes_member() {
        let expr = lower(parsed("$b->name")).unwrap();
        assert!(matches!(expr.kind, ExprKind::Member { ref property, .. } if property == "name"));
    }

    #[test]
    fn test_member_requires_name() {
        let err = lower(parsed("$a->1")).unwrap_err();
        assert!(matches!(err, EvalError::SyntaxError { .. }));
    }

    #[test]
    fn test_array_lowers_to_positional_object() {
        let expr = lower(parsed("[10, 20]")).unwrap();
        let ExprKind::ObjectLiteral(entries) = expr.kind else {
            panic!("expected object literal");
        };
        assert_eq!(entries[0].0, "0");
        assert_eq!(entries[1].0, "1");
        assert_eq!(entries[1].1.kind, ExprKind::Literal(Value::Integer(20)));
    }

    #[test]
    fn test_assign_target_path() {
        let target = assign_target(parsed("$o->a[\"k\"]->b")).unwrap();
        let AssignTarget::Variable { name, path } = target else {
            panic!("expected variable target");
        };
        assert_eq!(name, "o");
        assert_eq!(path.len(), 3);
        assert!(matches!(&path[0], PathSegment::Member(m) if m == "a"));
        assert!(matches!(&path[1], PathSegment::Index(_)));
        assert!(matches!(&path[2], PathSegment::Member(m) if m == "b"));
    }

    #[test]
    fn test_static_assign_target() {
        let target = assign_target(parsed("Counter::count")).unwrap();
        assert_eq!(
            target,
            AssignTarget::Static {
                class: "Counter".into(),
                member: "count".into()
            }
        );
    }

    #[test]
    fn test_call_is_not_assignable() {
        assert!(assign_target(parsed("f()")).is_err());
        assert!(assign_target(parsed("1 + 2")).is_err());
    }
}
