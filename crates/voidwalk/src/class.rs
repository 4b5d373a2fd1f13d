//! Class registry entries
//!
//! A [`ClassInfo`] is the single description of a class used everywhere at
//! run time: instance layout, method tables, statics and access control.
//! It is built once when the class declaration executes and shared by
//! `Rc` between the scope that registered it and every instance.
//!
//! # Layout
//!
//! Property descriptors are flattened: a subclass starts from a copy of its
//! parent's descriptors and its own entries shadow same-named ones. Methods
//! are kept per class and resolved by walking the parent chain.
//!
//! # Access
//!
//! A private member is reachable when the executing method's class is the
//! class that declared the member, or the instance's own class (whose
//! flattened layout holds every inherited slot). Classes in between get no
//! transitive access.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::Expr;
use crate::error::EvalError;
use crate::symbol::FunctionSymbol;
use crate::types::DeclaredType;
use crate::value::{ObjectMap, Value};

/// Name of the method run by `new`.
pub const CONSTRUCTOR: &str = "construct";

/// One property descriptor.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: DeclaredType,
    pub private: bool,

    /// Class whose declaration introduced this property
    pub declared_in: String,

    pub default: Option<Expr>,
}

#[derive(Debug)]
pub struct ClassInfo {
    name: String,
    parent: Option<Rc<ClassInfo>>,
    scope: String,
    properties: IndexMap<String, PropertyInfo>,
    methods: IndexMap<String, Rc<FunctionSymbol>>,
    static_properties: IndexMap<String, PropertyInfo>,
    statics: RefCell<ObjectMap>,
}

impl ClassInfo {
    /// Start a class, inheriting the parent's property layout.
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        parent: Option<Rc<ClassInfo>>,
    ) -> Self {
        let properties = parent
            .as_ref()
            .map(|p| p.properties.clone())
            .unwrap_or_default();
        Self {
            name: name.into(),
            parent,
            scope: scope.into(),
            properties,
            methods: IndexMap::new(),
            static_properties: IndexMap::new(),
            statics: RefCell::new(ObjectMap::new()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Building
    // ═══════════════════════════════════════════════════════════════════

    /// Add an instance property, shadowing an inherited one of the same name.
    pub fn add_property(&mut self, property: PropertyInfo) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn add_method(&mut self, method: Rc<FunctionSymbol>) {
        self.methods.insert(method.name().to_string(), method);
    }

    pub fn add_static(&mut self, property: PropertyInfo, value: Value) {
        self.statics.borrow_mut().insert(property.name.clone(), value);
        self.static_properties.insert(property.name.clone(), property);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<ClassInfo>> {
        self.parent.as_ref()
    }

    /// Qualified scope that holds the method bodies.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// This class followed by its ancestors.
    pub fn ancestry(&self) -> impl Iterator<Item = &ClassInfo> {
        std::iter::successors(Some(self), |&c| c.parent.as_deref())
    }

    /// Whether this class is `name` or inherits from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.ancestry().any(|c| c.name == name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// Resolve a method in this class, then up the parent chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<FunctionSymbol>> {
        self.ancestry()
            .find_map(|c| c.methods.get(name))
            .map(Rc::clone)
    }

    pub fn constructor(&self) -> Option<Rc<FunctionSymbol>> {
        self.find_method(CONSTRUCTOR)
    }

    /// Resolve a static property descriptor and the class that owns its
    /// storage.
    pub fn find_static(&self, name: &str) -> Option<(&ClassInfo, &PropertyInfo)> {
        self.ancestry()
            .find_map(|c| c.static_properties.get(name).map(|p| (c, p)))
    }

    /// Current value of a static property (a copy).
    pub fn static_value(&self, name: &str) -> Option<Value> {
        let (owner, _) = self.find_static(name)?;
        let statics = owner.statics.borrow();
        statics.get(name).cloned()
    }

    /// Overwrite a static property. Returns `false` if no class in the
    /// chain declares it.
    pub fn set_static(&self, name: &str, value: Value) -> bool {
        match self.find_static(name) {
            Some((owner, _)) => {
                owner.statics.borrow_mut().insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }
}

/// Enforce private-member access.
///
/// `receiver_class` is the class of the instance being accessed (or the
/// named class for statics); `executing` is the class of the running
/// method, if any.
pub fn check_access(
    private: bool,
    member: &str,
    declared_in: &str,
    receiver_class: &str,
    executing: Option<&str>,
) -> Result<(), EvalError> {
    if !private {
        return Ok(());
    }
    match executing {
        Some(class) if class == declared_in || class == receiver_class => Ok(()),
        _ => Err(EvalError::access(member, declared_in)),
    }
}
