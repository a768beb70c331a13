//! Class table for one compilation.
//!
//! [`ClassTable`] answers every question the resolver asks about classes:
//! whether a name denotes a class, what its shape is, how classes relate
//! by subtyping and which fields and methods a type offers. Classes
//! declared in the unit being compiled shadow anything the external
//! [`TypeLookup`] knows under the same name.

use std::sync::Arc;

use javelin_core::{AccessFlags, ClassShape, ConstValue, FieldShape, JavaType, MethodShape, TypeLookup};
use rustc_hash::{FxHashMap, FxHashSet};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const THROWABLE: &str = "java.lang.Throwable";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ERROR: &str = "java.lang.Error";

/// A field together with the class that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub owner: String,
    pub field: FieldShape,
}

/// A method together with the class that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMatch {
    pub owner: String,
    pub owner_is_interface: bool,
    pub method: MethodShape,
}

/// Shapes of the unit's own classes layered over a [`TypeLookup`].
pub struct ClassTable<'l> {
    lookup: &'l dyn TypeLookup,
    /// Names declared by the unit, registered before their shapes exist.
    declared: FxHashSet<String>,
    unit: FxHashMap<String, Arc<ClassShape>>,
}

impl<'l> ClassTable<'l> {
    pub fn new(lookup: &'l dyn TypeLookup) -> Self {
        Self {
            lookup,
            declared: FxHashSet::default(),
            unit: FxHashMap::default(),
        }
    }

    // =========================================
    // Registration
    // =========================================

    /// Register a class name of the unit. Returns `false` for duplicates.
    pub fn declare(&mut self, binary_name: &str) -> bool {
        self.declared.insert(binary_name.to_string())
    }

    pub fn is_unit_class(&self, binary_name: &str) -> bool {
        self.declared.contains(binary_name)
    }

    pub fn insert(&mut self, shape: ClassShape) {
        self.unit.insert(shape.name.clone(), Arc::new(shape));
    }

    /// Record the constant value of a unit field once its initializer has
    /// been folded.
    pub fn set_field_constant(&mut self, class: &str, field: &str, value: ConstValue) {
        if let Some(shape) = self.unit.get_mut(class) {
            let shape = Arc::make_mut(shape);
            if let Some(slot) = shape.fields.iter_mut().find(|f| f.name == field) {
                slot.constant = Some(value);
            }
        }
    }

    // =========================================
    // Queries
    // =========================================

    pub fn shape(&self, binary_name: &str) -> Option<Arc<ClassShape>> {
        if let Some(shape) = self.unit.get(binary_name) {
            return Some(Arc::clone(shape));
        }
        if self.declared.contains(binary_name) {
            return None;
        }
        self.lookup.lookup(binary_name)
    }

    /// Whether a class of that name exists, shaped or not.
    pub fn exists(&self, binary_name: &str) -> bool {
        self.declared.contains(binary_name) || self.lookup.lookup(binary_name).is_some()
    }

    pub fn package_exists(&self, package: &str) -> bool {
        if self.lookup.package_exists(package) {
            return true;
        }
        let prefix = format!("{package}.");
        self.declared.iter().any(|name| name.starts_with(&prefix))
    }

    pub fn is_interface(&self, binary_name: &str) -> bool {
        self.shape(binary_name).is_some_and(|s| s.is_interface())
    }

    /// Direct supertypes: the superclass first, then the interfaces.
    fn supertypes(&self, binary_name: &str) -> Vec<String> {
        let Some(shape) = self.shape(binary_name) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(1 + shape.interfaces.len());
        if let Some(superclass) = &shape.superclass {
            out.push(superclass.clone());
        }
        out.extend(shape.interfaces.iter().cloned());
        out
    }

    /// Whether `sub` is `sup` or a subclass or subinterface of it.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == OBJECT {
            return true;
        }
        let mut visited = FxHashSet::default();
        let mut pending = vec![sub.to_string()];
        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for parent in self.supertypes(&current) {
                if parent == sup {
                    return true;
                }
                pending.push(parent);
            }
        }
        false
    }

    /// The superclass chain of `class`, nearest first, stopping at a cycle.
    pub fn superclasses(&self, class: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut current = self.shape(class).and_then(|s| s.superclass.clone());
        while let Some(name) = current {
            if name == class || out.contains(&name) {
                break;
            }
            current = self.shape(&name).and_then(|s| s.superclass.clone());
            out.push(name);
        }
        out
    }

    /// Identity or widening reference conversion between reference types.
    pub fn is_reference_assignable(&self, from: &JavaType, to: &JavaType) -> bool {
        match (from, to) {
            (JavaType::Null, JavaType::Class(_) | JavaType::Array(_) | JavaType::Null) => true,
            (JavaType::Class(a), JavaType::Class(b)) => self.is_subclass(a, b),
            (JavaType::Array(_), JavaType::Class(b)) => {
                matches!(
                    b.as_str(),
                    OBJECT | "java.lang.Cloneable" | "java.io.Serializable"
                )
            }
            (JavaType::Array(a), JavaType::Array(b)) => match (a.as_ref(), b.as_ref()) {
                (JavaType::Primitive(x), JavaType::Primitive(y)) => x == y,
                (x, y) if x.is_reference() && y.is_reference() => {
                    self.is_reference_assignable(x, y)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether a cast between two reference types can succeed at run time.
    pub fn is_reference_castable(&self, from: &JavaType, to: &JavaType) -> bool {
        if self.is_reference_assignable(from, to) || self.is_reference_assignable(to, from) {
            return true;
        }
        match (from, to) {
            (JavaType::Class(a), JavaType::Class(b)) => {
                let (Some(sa), Some(sb)) = (self.shape(a), self.shape(b)) else {
                    return false;
                };
                (sa.is_interface() && (sb.is_interface() || !sb.access.is_final()))
                    || (sb.is_interface() && !sa.access.is_final())
            }
            (JavaType::Array(a), JavaType::Array(b)) => {
                a.is_reference() && b.is_reference() && self.is_reference_castable(a, b)
            }
            _ => false,
        }
    }

    /// Checked exceptions are throwables that are neither runtime
    /// exceptions nor errors.
    pub fn is_checked_exception(&self, class: &str) -> bool {
        self.is_subclass(class, THROWABLE)
            && !self.is_subclass(class, RUNTIME_EXCEPTION)
            && !self.is_subclass(class, ERROR)
    }

    /// Whether a member of `owner` with `access` may be used from `from`.
    pub fn is_accessible(&self, owner: &str, access: AccessFlags, from: &str) -> bool {
        if access.contains(AccessFlags::PUBLIC) {
            return true;
        }
        if access.is_private() {
            return owner == from;
        }
        if package_of(owner) == package_of(from) {
            return true;
        }
        access.contains(AccessFlags::PROTECTED) && self.is_subclass(from, owner)
    }

    // =========================================
    // Members
    // =========================================

    /// Find a field by searching the class, its superinterfaces and then
    /// its superclass chain.
    pub fn find_field(&self, class: &str, name: &str) -> Option<FieldMatch> {
        let mut visited = FxHashSet::default();
        self.find_field_in(class, name, &mut visited)
    }

    fn find_field_in(
        &self,
        class: &str,
        name: &str,
        visited: &mut FxHashSet<String>,
    ) -> Option<FieldMatch> {
        if !visited.insert(class.to_string()) {
            return None;
        }
        let shape = self.shape(class)?;
        if let Some(field) = shape.field(name) {
            return Some(FieldMatch {
                owner: shape.name.clone(),
                field: field.clone(),
            });
        }
        for interface in &shape.interfaces {
            if let Some(found) = self.find_field_in(interface, name, visited) {
                return Some(found);
            }
        }
        let superclass = shape.superclass.as_deref()?;
        self.find_field_in(superclass, name, visited)
    }

    /// Every method called `name` visible in `class`, most derived first.
    /// A method hidden by one with the same parameter types in a subtype
    /// is left out.
    pub fn find_methods(&self, class: &str, name: &str) -> Vec<MethodMatch> {
        let mut out: Vec<MethodMatch> = Vec::new();
        let mut visited = FxHashSet::default();
        let mut pending = vec![class.to_string()];
        let mut index = 0;
        while index < pending.len() {
            let current = pending[index].clone();
            index += 1;
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(shape) = self.shape(&current) else {
                continue;
            };
            for method in shape.methods_named(name) {
                if out.iter().any(|m| m.method.params() == method.params()) {
                    continue;
                }
                out.push(MethodMatch {
                    owner: shape.name.clone(),
                    owner_is_interface: shape.is_interface(),
                    method: method.clone(),
                });
            }
            if let Some(superclass) = &shape.superclass {
                pending.push(superclass.clone());
            }
            pending.extend(shape.interfaces.iter().cloned());
            if shape.is_interface() && shape.superclass.is_none() {
                pending.push(OBJECT.to_string());
            }
        }
        out
    }

    /// Constructors declared by `class` itself.
    pub fn constructors(&self, class: &str) -> Vec<MethodShape> {
        self.shape(class)
            .map(|shape| shape.constructors().cloned().collect())
            .unwrap_or_default()
    }
}

/// Package part of a dotted binary name.
pub fn package_of(binary_name: &str) -> &str {
    binary_name.rsplit_once('.').map_or("", |(package, _)| package)
}

/// Last component of a dotted binary name.
pub fn simple_name(binary_name: &str) -> &str {
    binary_name.rsplit_once('.').map_or(binary_name, |(_, simple)| simple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::{ClassPath, ClassShapeBuilder};

    fn table_with(class_path: &ClassPath) -> ClassTable<'_> {
        ClassTable::new(class_path)
    }

    #[test]
    fn subclassing_through_interfaces() {
        let class_path = ClassPath::with_builtins();
        let table = table_with(&class_path);
        assert!(table.is_subclass("java.lang.String", "java.lang.CharSequence"));
        assert!(table.is_subclass("java.lang.Integer", "java.lang.Number"));
        assert!(table.is_subclass("java.lang.Runnable", OBJECT));
        assert!(!table.is_subclass("java.lang.Number", "java.lang.Integer"));
    }

    #[test]
    fn checked_exceptions() {
        let class_path = ClassPath::with_builtins();
        let table = table_with(&class_path);
        assert!(table.is_checked_exception("java.lang.Exception"));
        assert!(table.is_checked_exception("java.io.IOException"));
        assert!(!table.is_checked_exception("java.lang.IllegalArgumentException"));
        assert!(!table.is_checked_exception(ERROR));
    }

    #[test]
    fn array_assignability() {
        let class_path = ClassPath::with_builtins();
        let table = table_with(&class_path);
        let strings = JavaType::string().array_of();
        let objects = JavaType::object().array_of();
        let ints = JavaType::INT.array_of();
        assert!(table.is_reference_assignable(&strings, &objects));
        assert!(!table.is_reference_assignable(&objects, &strings));
        assert!(table.is_reference_castable(&objects, &strings));
        assert!(!table.is_reference_assignable(&ints, &objects));
        assert!(table.is_reference_assignable(&ints, &JavaType::object()));
        assert!(table.is_reference_assignable(&JavaType::Null, &ints));
    }

    #[test]
    fn unit_classes_shadow_lookup() {
        let class_path = ClassPath::with_builtins();
        let mut table = table_with(&class_path);
        assert!(table.declare("demo.Point"));
        assert!(!table.declare("demo.Point"));
        assert!(table.exists("demo.Point"));
        assert!(table.shape("demo.Point").is_none());
        assert!(table.package_exists("demo"));

        let shape = ClassShapeBuilder::class("demo.Point")
            .field("x", "I", AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL)
            .build()
            .unwrap();
        table.insert(shape);
        table.set_field_constant("demo.Point", "x", ConstValue::Int(3));
        let field = table.find_field("demo.Point", "x").unwrap();
        assert_eq!(field.owner, "demo.Point");
        assert_eq!(field.field.constant, Some(ConstValue::Int(3)));
    }

    #[test]
    fn overridden_methods_appear_once() {
        let class_path = ClassPath::with_builtins();
        let table = table_with(&class_path);
        let methods = table.find_methods("java.lang.String", "toString");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].owner, "java.lang.String");

        let on_interface = table.find_methods("java.lang.Runnable", "hashCode");
        assert_eq!(on_interface.len(), 1);
        assert_eq!(on_interface[0].owner, OBJECT);
    }

    #[test]
    fn access_rules() {
        let class_path = ClassPath::with_builtins();
        let table = table_with(&class_path);
        assert!(table.is_accessible("a.A", AccessFlags::empty(), "a.B"));
        assert!(!table.is_accessible("a.A", AccessFlags::empty(), "b.B"));
        assert!(!table.is_accessible("a.A", AccessFlags::PRIVATE, "a.B"));
        assert!(table.is_accessible("a.A", AccessFlags::PRIVATE, "a.A"));
    }
}
