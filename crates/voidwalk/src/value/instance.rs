//! Class instances

use std::fmt;
use std::rc::Rc;

use super::{ObjectMap, Value};
use crate::class::ClassInfo;

/// A class instance: one field per property in the class's flattened
/// layout, plus the class it was built from.
#[derive(Clone)]
pub struct Instance {
    class: Rc<ClassInfo>,

    /// Field values, key-sorted
    pub fields: ObjectMap,
}

impl Instance {
    pub fn new(class: Rc<ClassInfo>, fields: ObjectMap) -> Self {
        Self { class, fields }
    }

    pub fn class(&self) -> &Rc<ClassInfo> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class_name() == other.class_name() && self.fields == other.fields
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class_name())
            .field("fields", &self.fields)
            .finish()
    }
}
