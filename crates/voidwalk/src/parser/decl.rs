//! Function, class and enum declarations

use std::rc::Rc;

use super::lower::lower;
use super::Parser;
use crate::ast::{ClassDecl, EnumDecl, FunctionDecl, Param, PropertyDecl, Stmt, StmtKind};
use crate::error::{EvalError, Location};
use crate::token::TokenKind;
use crate::types::DeclaredType;

impl<'env> Parser<'env> {
    pub(super) fn parse_function_statement(&mut self) -> Result<Stmt, EvalError> {
        let location = self.location();
        let decl = self.parse_function(false)?;
        Ok(Stmt::new(StmtKind::Function(Rc::new(decl)), location))
    }

    /// `function name(<type> $p, ...) [<type>] { body }`
    ///
    /// The body is parsed into the operation log of `<scope>::<name>`.
    fn parse_function(&mut self, private: bool) -> Result<FunctionDecl, EvalError> {
        let location = self.expect_keyword("function")?.location;
        let name = self.expect_identifier()?;
        let params = self.parse_parameters()?;
        let return_type = if self.peek().is_punct("{") {
            DeclaredType::Auto
        } else {
            self.parse_type()?
        };

        let body_scope = self.open_body_scope(&name.text, &name.location)?;
        for param in &params {
            self.note_declaration(&param.name, &location)?;
        }
        let body = self.parse_body_operations();
        self.close_body_scope();
        body?;

        Ok(FunctionDecl {
            name: name.text,
            params,
            return_type,
            body_scope,
            private,
            location,
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<Param>, EvalError> {
        self.expect_punct("(")?;
        let mut params: Vec<Param> = Vec::new();
        if self.eat_punct(")") {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.expect_variable()?;
            if params.iter().any(|p| p.name == name.text) {
                return Err(EvalError::NameError {
                    message: format!("duplicate parameter ${}", name.text),
                    location: name.location,
                });
            }
            params.push(Param {
                name: name.text,
                ty,
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    /// `class Name [extends Parent] { members } [;]`
    ///
    /// Members are properties (`[static] <type> $name [= expr];`) and
    /// methods. Each may carry `private`/`public`; the labels `private:` and
    /// `public:` change the default for the members after them. Without a
    /// label, members are public.
    pub(super) fn parse_class(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("class")?.location;
        let name = self.expect_identifier()?;
        let parent = if self.eat_keyword("extends") {
            Some(self.expect_identifier()?.text)
        } else {
            None
        };
        if parent.as_deref() == Some(name.text.as_str()) {
            return Err(EvalError::syntax(
                format!("class {} cannot extend itself", name.text),
                name.location,
            ));
        }
        let scope = self.open_body_scope(&name.text, &name.location)?;
        let members = self.parse_class_members();
        self.close_body_scope();
        let (properties, methods) = members?;
        self.eat_punct(";");

        let decl = ClassDecl {
            name: name.text,
            parent,
            scope,
            properties,
            methods,
        };
        Ok(Stmt::new(StmtKind::Class(Rc::new(decl)), location))
    }

    fn parse_class_members(
        &mut self,
    ) -> Result<(Vec<PropertyDecl>, Vec<Rc<FunctionDecl>>), EvalError> {
        self.expect_punct("{")?;
        let mut properties: Vec<PropertyDecl> = Vec::new();
        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();
        let mut section_private = false;

        while !self.eat_punct("}") {
            if self.peek().is_eof() {
                return Err(self.unexpected("'}'"));
            }

            // access label: `private:` / `public:`
            if (self.peek().is_keyword("private") || self.peek().is_keyword("public"))
                && self.peek_at(1).is_punct(":")
            {
                section_private = self.advance().text == "private";
                self.advance();
                continue;
            }

            let mut private = section_private;
            let mut is_static = false;
            loop {
                if self.eat_keyword("private") {
                    private = true;
                } else if self.eat_keyword("public") {
                    private = false;
                } else if self.eat_keyword("static") {
                    is_static = true;
                } else {
                    break;
                }
            }

            if self.peek().is_keyword("function") {
                let method = self.parse_function(private)?;
                if methods.iter().any(|m| m.name == method.name) {
                    return Err(duplicate_member(&method.name, &method.location));
                }
                methods.push(Rc::new(method));
                continue;
            }

            let ty = self.parse_type()?;
            let name = self.expect_variable()?;
            if properties.iter().any(|p| p.name == name.text) {
                return Err(duplicate_member(&name.text, &name.location));
            }
            let default = if self.eat_operator("=") {
                Some(lower(self.parse_expression(Some(&ty))?)?)
            } else {
                None
            };
            self.expect_punct(";")?;
            properties.push(PropertyDecl {
                name: name.text,
                ty,
                private,
                is_static,
                default,
            });
        }
        Ok((properties, methods))
    }

    /// `enum Name { A, B = 5, C } [;]`
    pub(super) fn parse_enum(&mut self) -> Result<Stmt, EvalError> {
        let location = self.expect_keyword("enum")?.location;
        let name = self.expect_identifier()?;
        self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.peek().is_punct("}") {
            let member = self.expect_identifier()?;
            let value = if self.eat_operator("=") {
                Some(self.parse_enum_value()?)
            } else {
                None
            };
            members.push((member.text, value));
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        self.eat_punct(";");
        Ok(Stmt::new(
            StmtKind::Enum(EnumDecl {
                name: name.text,
                members,
            }),
            location,
        ))
    }

    fn parse_enum_value(&mut self) -> Result<i64, EvalError> {
        let negative = self.eat_operator("-");
        let token = self.peek().clone();
        if token.kind != TokenKind::Integer {
            return Err(self.unexpected("integer"));
        }
        self.advance();
        let value: i64 = token.text.parse().map_err(|_| {
            EvalError::syntax(format!("enum value {} out of range", token.text), token.location)
        })?;
        Ok(if negative { -value } else { value })
    }
}

fn duplicate_member(name: &str, location: &Location) -> EvalError {
    EvalError::NameError {
        message: format!("member {} already declared", name),
        location: location.clone(),
    }
}
