//! Declaration AST nodes: compilation units, types and members.

use bitflags::bitflags;
use javelin_core::Span;

use super::expr::Expr;
use super::stmt::{Block, VarDeclarator};
use super::types::TypeExpr;
use super::{Ident, NodeId};

bitflags! {
    /// Declaration modifiers as written in source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
    }
}

/// A whole source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompilationUnit<'ast> {
    pub package: Option<&'ast [Ident<'ast>]>,
    pub imports: &'ast [ImportDecl<'ast>],
    pub types: &'ast [TypeDecl<'ast>],
    pub span: Span,
}

/// `import a.b.C;`, `import a.b.*;`, `import static a.B.m;`, `import static a.B.*;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportDecl<'ast> {
    /// The imported name, without a trailing `*`.
    pub path: &'ast [Ident<'ast>],
    pub is_static: bool,
    pub on_demand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A top-level class or interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    pub modifiers: Modifiers,
    pub kind: TypeKind,
    pub name: Ident<'ast>,
    /// Superclass of a class.
    pub extends: Option<TypeExpr<'ast>>,
    /// Implemented interfaces, or extended interfaces of an interface.
    pub interfaces: &'ast [TypeExpr<'ast>],
    pub members: &'ast [Member<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'ast> {
    Field(&'ast FieldDecl<'ast>),
    Method(&'ast MethodDecl<'ast>),
    Constructor(&'ast ConstructorDecl<'ast>),
    Initializer(&'ast InitializerDecl<'ast>),
}

impl Member<'_> {
    pub fn span(&self) -> Span {
        match self {
            Member::Field(m) => m.span,
            Member::Method(m) => m.span,
            Member::Constructor(m) => m.span,
            Member::Initializer(m) => m.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub modifiers: Modifiers,
    pub ty: TypeExpr<'ast>,
    pub declarators: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub id: NodeId,
    pub is_final: bool,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub modifiers: Modifiers,
    pub return_ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub throws: &'ast [TypeExpr<'ast>],
    /// `None` for abstract and native methods.
    pub body: Option<&'ast Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorCallKind {
    This,
    Super,
}

/// `this(args);` or `super(args);` at the start of a constructor body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplicitCtorCall<'ast> {
    pub id: NodeId,
    pub kind: CtorCallKind,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructorDecl<'ast> {
    pub modifiers: Modifiers,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub throws: &'ast [TypeExpr<'ast>],
    pub explicit_call: Option<&'ast ExplicitCtorCall<'ast>>,
    /// Statements after the explicit constructor call.
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

/// `{ ... }` or `static { ... }` in a class body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitializerDecl<'ast> {
    pub is_static: bool,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}
