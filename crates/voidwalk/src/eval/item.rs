//! Function, class and enum declarations at run time

use std::rc::Rc;

use super::Evaluate;
use crate::ast::{ClassDecl, EnumDecl, FunctionDecl};
use crate::class::{ClassInfo, PropertyInfo};
use crate::symbol::{EnumSymbol, FunctionSymbol, Symbol};
use crate::{Environment, EvalContext, EvalError};

/// Register a function in the current scope. Its calls will open scopes
/// beneath this one.
pub fn declare_function(decl: &Rc<FunctionDecl>, env: &mut Environment) -> Result<(), EvalError> {
    let function = FunctionSymbol::function(Rc::clone(decl), env.current_name());
    tracing::trace!(function = %decl.name, scope = %env.current_name(), "declare function");
    env.add(Symbol::Function(Rc::new(function)))
}

/// Build the class registry entry and register it in the current scope.
///
/// The parent must already be visible from here. Static properties are
/// initialized now, in the class scope.
pub fn declare_class(
    decl: &Rc<ClassDecl>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let parent = decl
        .parent
        .as_deref()
        .map(|name| env.resolve_class(name))
        .transpose()?;
    let mut class = ClassInfo::new(decl.name.as_str(), decl.scope.as_str(), parent);

    for property in &decl.properties {
        let info = PropertyInfo {
            name: property.name.clone(),
            ty: property.ty.clone(),
            private: property.private,
            declared_in: decl.name.clone(),
            default: property.default.clone(),
        };
        if !property.is_static {
            class.add_property(info);
            continue;
        }
        let value = match &property.default {
            Some(default) => {
                let mut scope = env.enter_guard(&decl.scope)?;
                let value = default.eval(&mut scope, ctx)?.detach();
                property.ty.bind(value).map_err(|value| {
                    EvalError::type_error(format!(
                        "static {}::{} must be {}, got {}",
                        decl.name,
                        property.name,
                        property.ty,
                        value.type_name()
                    ))
                    .at(&default.location)
                })?
            }
            None => property.ty.zero_value(),
        };
        class.add_static(info, value);
    }

    for method in &decl.methods {
        class.add_method(Rc::new(FunctionSymbol::method(
            Rc::clone(method),
            decl.scope.as_str(),
            decl.name.as_str(),
        )));
    }

    tracing::trace!(class = %decl.name, parent = ?decl.parent, "declare class");
    env.add(Symbol::Class(Rc::new(class)))
}

pub fn declare_enum(decl: &EnumDecl, env: &mut Environment) -> Result<(), EvalError> {
    let symbol = EnumSymbol::from_decl(decl)?;
    env.add(Symbol::Enum(Rc::new(symbol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;

    fn run(src: &str) -> Result<Interpreter, EvalError> {
        let mut interp = Interpreter::new();
        interp.run_script(src, "test")?;
        Ok(interp)
    }

    #[test]
    fn test_function_is_registered_where_declared() {
        let interp = run("function f() { }").unwrap();
        let scope = interp.environment().scope("main").unwrap();
        assert!(scope.function("f").is_some());
    }

    #[test]
    fn test_unknown_parent_is_name_error() {
        let err = run("class B extends Missing { }").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
    }

    #[test]
    fn test_subclass_layout_includes_parent_properties() {
        let interp = run("class A { int $a = 1; } class B extends A { int $b = 2; }").unwrap();
        let class = interp.environment().resolve_class("B").unwrap();
        let names: Vec<&str> = class.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(class.property("a").unwrap().declared_in, "A");
    }

    #[test]
    fn test_duplicate_enum_in_same_scope() {
        let err = run("enum E { A } enum E { B }").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
    }
}
