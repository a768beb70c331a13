//! External type lookup.
//!
//! The compiler consults a [`TypeLookup`] for every class name that is not
//! declared in the unit being compiled. Lookups are read-only, so a single
//! [`ClassPath`] can serve any number of concurrent compilations.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::builtins;
use crate::shape::ClassShape;

/// Source of class shapes for names outside the compilation unit.
pub trait TypeLookup: Send + Sync {
    /// Shape of the class with the given dotted binary name.
    fn lookup(&self, binary_name: &str) -> Option<Arc<ClassShape>>;

    /// Whether any known class lives in `package` (or one of its subpackages).
    fn package_exists(&self, package: &str) -> bool;
}

/// An in-memory [`TypeLookup`].
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    classes: FxHashMap<String, Arc<ClassShape>>,
    packages: FxHashSet<String>,
}

impl ClassPath {
    /// An empty class path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A class path holding the `java.lang` and `java.io` shapes the
    /// compiler relies on (`Object`, `String`, boxes, `Throwable`, ...).
    pub fn with_builtins() -> Self {
        let mut class_path = Self::new();
        for builder in builtins::shapes() {
            match builder.build() {
                Ok(shape) => class_path.insert(shape),
                Err(err) => log::error!("skipping built-in class shape: {err}"),
            }
        }
        class_path
    }

    /// Add (or replace) a class shape.
    pub fn insert(&mut self, shape: ClassShape) {
        let mut package = shape.package();
        while !package.is_empty() {
            self.packages.insert(package.to_string());
            package = package.rsplit_once('.').map_or("", |(parent, _)| parent);
        }
        self.classes.insert(shape.name.clone(), Arc::new(shape));
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeLookup for ClassPath {
    fn lookup(&self, binary_name: &str) -> Option<Arc<ClassShape>> {
        self.classes.get(binary_name).cloned()
    }

    fn package_exists(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{AccessFlags, ClassShapeBuilder};

    #[test]
    fn builtins_are_present() {
        let cp = ClassPath::with_builtins();
        let string = cp.lookup("java.lang.String").unwrap();
        assert_eq!(string.superclass.as_deref(), Some("java.lang.Object"));
        assert!(cp.lookup("java.lang.Object").unwrap().superclass.is_none());
        assert!(cp.lookup("java.io.PrintStream").is_some());
        assert!(cp.package_exists("java"));
        assert!(cp.package_exists("java.lang"));
        assert!(!cp.package_exists("javax"));
    }

    #[test]
    fn every_builtin_shape_builds() {
        for builder in builtins::shapes() {
            assert!(builder.clone().build().is_ok(), "{builder:?}");
        }
    }

    #[test]
    fn host_shapes_can_be_added() {
        let mut cp = ClassPath::new();
        assert!(cp.is_empty());
        cp.insert(
            ClassShapeBuilder::class("com.acme.Widget")
                .method("size", "()I", AccessFlags::PUBLIC)
                .build()
                .unwrap(),
        );
        assert_eq!(cp.len(), 1);
        assert!(cp.package_exists("com.acme"));
        assert!(cp.package_exists("com"));
    }

    #[test]
    fn lookup_is_shareable_across_threads() {
        let cp: Arc<dyn TypeLookup> = Arc::new(ClassPath::with_builtins());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cp = Arc::clone(&cp);
                std::thread::spawn(move || cp.lookup("java.lang.Math").is_some())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
