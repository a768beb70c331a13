//! The side table the resolver fills and the generator reads.
//!
//! Nodes are never annotated in place. Every fact is keyed by the
//! [`NodeId`] the parser assigned, is written exactly once and is
//! read-only afterwards.

use javelin_core::{CompilationError, ConstValue, JavaType, MethodDescriptor, Span};
use javelin_parser::ast::NodeId;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use crate::conversion::Conversion;

/// Index of a local variable in [`ResolvedFacts::locals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u32);

impl LocalId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A local variable or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalInfo {
    pub name: String,
    pub ty: JavaType,
    /// First local variable slot, relative to the start of its body.
    pub slot: u16,
    pub is_final: bool,
    /// Value of a `final` local with a constant initializer.
    pub constant: Option<ConstValue>,
    pub span: Span,
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Declaring class, dotted.
    pub owner: String,
    pub name: String,
    pub ty: JavaType,
    pub is_static: bool,
    pub is_final: bool,
    pub constant: Option<ConstValue>,
}

/// How a method is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Static,
    Virtual,
    Interface,
    /// Constructors, private methods and `super.m()`.
    Special,
}

/// A resolved method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    /// The class named in the constant pool reference. Array types are
    /// used for `clone()` on arrays.
    pub owner: JavaType,
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub kind: InvokeKind,
    /// Declared exception types, dotted.
    pub throws: Vec<String>,
}

/// One link of a resolved dotted name.
#[derive(Debug, Clone, PartialEq)]
pub enum NameStep {
    Local(LocalId),
    /// A field. An instance field as the first step is read from `this`;
    /// a static field after a value discards that value.
    Field(FieldRef),
    ArrayLength,
}

/// What an expression node denotes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Binding {
    #[default]
    None,
    /// A dotted name denoting a value.
    Path(Vec<NameStep>),
    /// A dotted name or `TypeExpr` denoting a type.
    Type(JavaType),
    Field(FieldRef),
    ArrayLength,
    /// A method, constructor or explicit constructor call.
    Method(MethodRef),
    /// An operator evaluated in `operand` type. `result` converts the
    /// operator's value back to the variable type for compound
    /// assignments and increments.
    Operator {
        operand: JavaType,
        result: Vec<Conversion>,
    },
}

/// Everything known about one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprFact {
    /// Static type before `conversion`.
    pub ty: JavaType,
    pub constant: Option<ConstValue>,
    pub binding: Binding,
    /// Conversion to the type the enclosing construct expects.
    pub conversion: Conversion,
}

impl ExprFact {
    pub fn new(ty: JavaType) -> Self {
        Self {
            ty,
            constant: None,
            binding: Binding::None,
            conversion: Conversion::Identity,
        }
    }

    pub fn constant(value: ConstValue) -> Self {
        Self {
            ty: value.java_type(),
            constant: Some(value),
            binding: Binding::None,
            conversion: Conversion::Identity,
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }
}

/// Identifies a body: a method or constructor by member index, or the
/// initializer code of a class. The synthesized default constructor uses
/// the index one past the last member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKey {
    Member { class: u32, member: u32 },
    InstanceInit { class: u32 },
    StaticInit { class: u32 },
}

/// Hidden locals of an enhanced `for` over an array.
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachFact {
    pub array: LocalId,
    pub index: LocalId,
    pub element: JavaType,
    /// Conversion from the element type to the loop variable type.
    pub conversion: Conversion,
}

/// The resolver's side table.
#[derive(Debug, Default)]
pub struct ResolvedFacts {
    exprs: FxHashMap<NodeId, ExprFact>,
    locals: Vec<LocalInfo>,
    /// Declarators, parameters and catch parameters to their locals.
    decls: FxHashMap<NodeId, LocalId>,
    foreach: FxHashMap<NodeId, ForEachFact>,
    /// Caught classes of each catch clause, dotted.
    catch_types: FxHashMap<NodeId, Vec<String>>,
    /// Constructors of constructors without an explicit `this()` or
    /// `super()` call.
    implicit_super: FxHashMap<BodyKey, MethodRef>,
    /// Slots used by each body's locals.
    frames: FxHashMap<BodyKey, u16>,
}

/// Insert `value` under a fresh `key`. An occupied key keeps its value.
fn write_once<K, V>(map: &mut FxHashMap<K, V>, key: K, value: V, what: &str) -> Result<(), CompilationError>
where
    K: Hash + Eq + std::fmt::Debug,
{
    match map.entry(key) {
        Entry::Occupied(entry) => Err(CompilationError::internal(format!(
            "{what} for {:?} recorded twice",
            entry.key()
        ))),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}

impl ResolvedFacts {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================
    // Writes (once per key)
    // =========================================

    pub fn record(&mut self, id: NodeId, fact: ExprFact) -> Result<(), CompilationError> {
        write_once(&mut self.exprs, id, fact, "expression fact")
    }

    pub fn add_local(&mut self, info: LocalInfo) -> LocalId {
        self.locals.push(info);
        LocalId(self.locals.len() as u32 - 1)
    }

    /// Id the next [`add_local`](Self::add_local) will return.
    pub fn next_local(&self) -> LocalId {
        LocalId(self.locals.len() as u32)
    }

    pub fn set_local_constant(&mut self, id: LocalId, value: ConstValue) {
        if let Some(local) = self.locals.get_mut(id.index()) {
            local.constant = Some(value);
        }
    }

    pub fn declare(&mut self, id: NodeId, local: LocalId) -> Result<(), CompilationError> {
        write_once(&mut self.decls, id, local, "declaration")
    }

    pub fn record_foreach(&mut self, id: NodeId, fact: ForEachFact) -> Result<(), CompilationError> {
        write_once(&mut self.foreach, id, fact, "enhanced for")
    }

    pub fn record_catch(&mut self, id: NodeId, types: Vec<String>) -> Result<(), CompilationError> {
        write_once(&mut self.catch_types, id, types, "catch clause")
    }

    pub fn record_implicit_super(&mut self, key: BodyKey, ctor: MethodRef) -> Result<(), CompilationError> {
        write_once(&mut self.implicit_super, key, ctor, "implicit super()")
    }

    pub fn record_frame(&mut self, key: BodyKey, slots: u16) -> Result<(), CompilationError> {
        write_once(&mut self.frames, key, slots, "frame")
    }

    // =========================================
    // Reads
    // =========================================

    pub fn get(&self, id: NodeId) -> Option<&ExprFact> {
        self.exprs.get(&id)
    }

    /// The fact of a node the generator or flow analysis depends on.
    pub fn expr(&self, id: NodeId) -> Result<&ExprFact, CompilationError> {
        self.exprs
            .get(&id)
            .ok_or_else(|| CompilationError::internal(format!("no fact recorded for {id:?}")))
    }

    pub fn local(&self, id: LocalId) -> Result<&LocalInfo, CompilationError> {
        self.locals
            .get(id.index())
            .ok_or_else(|| CompilationError::internal(format!("unknown local {id:?}")))
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    pub fn decl(&self, id: NodeId) -> Result<LocalId, CompilationError> {
        self.decls
            .get(&id)
            .copied()
            .ok_or_else(|| CompilationError::internal(format!("no local declared by {id:?}")))
    }

    pub fn foreach(&self, id: NodeId) -> Result<&ForEachFact, CompilationError> {
        self.foreach
            .get(&id)
            .ok_or_else(|| CompilationError::internal(format!("no enhanced for recorded at {id:?}")))
    }

    pub fn catch_types(&self, id: NodeId) -> Result<&[String], CompilationError> {
        self.catch_types
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| CompilationError::internal(format!("no catch types recorded at {id:?}")))
    }

    pub fn implicit_super(&self, key: BodyKey) -> Option<&MethodRef> {
        self.implicit_super.get(&key)
    }

    pub fn frame(&self, key: BodyKey) -> u16 {
        self.frames.get(&key).copied().unwrap_or(0)
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_are_written_once() {
        let mut facts = ResolvedFacts::new();
        facts.record(NodeId(3), ExprFact::new(JavaType::INT)).unwrap();
        let err = facts.record(NodeId(3), ExprFact::new(JavaType::LONG)).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
        assert_eq!(facts.expr(NodeId(3)).unwrap().ty, JavaType::INT);
        assert!(facts.expr(NodeId(4)).is_err());
    }

    #[test]
    fn second_writes_keep_the_first_value() {
        let mut facts = ResolvedFacts::new();
        let key = BodyKey::StaticInit { class: 0 };
        facts.record_frame(key, 2).unwrap();
        assert!(facts.record_frame(key, 9).is_err());
        assert_eq!(facts.frame(key), 2);

        facts.declare(NodeId(1), LocalId(0)).unwrap();
        assert!(facts.declare(NodeId(1), LocalId(5)).is_err());
        assert_eq!(facts.decl(NodeId(1)).unwrap(), LocalId(0));

        facts.record_catch(NodeId(2), vec!["java.io.IOException".to_string()]).unwrap();
        assert!(facts.record_catch(NodeId(2), Vec::new()).is_err());
        assert_eq!(facts.catch_types(NodeId(2)).unwrap(), ["java.io.IOException"]);
    }

    #[test]
    fn locals_are_numbered_densely() {
        let mut facts = ResolvedFacts::new();
        let info = |name: &str, slot| LocalInfo {
            name: name.to_string(),
            ty: JavaType::INT,
            slot,
            is_final: false,
            constant: None,
            span: Span::default(),
        };
        assert_eq!(facts.next_local(), LocalId(0));
        let a = facts.add_local(info("a", 1));
        let b = facts.add_local(info("b", 2));
        assert_eq!((a, b), (LocalId(0), LocalId(1)));
        facts.set_local_constant(b, ConstValue::Int(4));
        assert_eq!(facts.local(b).unwrap().constant, Some(ConstValue::Int(4)));
    }
}
