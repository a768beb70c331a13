//! Expression AST nodes.
//!
//! Every expression node carries a [`NodeId`] so later passes can attach
//! facts to it without mutating the tree.
//!
//! Dotted identifier chains such as `a.b.c` are kept as a single
//! [`NameExpr`] because the parser cannot tell packages, types, variables
//! and fields apart; the resolver decides what each prefix denotes.

use javelin_core::Span;

use super::ops::{AssignOp, BinaryOp, PostfixOp, UnaryOp};
use super::types::TypeExpr;
use super::{Ident, NodeId};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(&'ast LiteralExpr<'ast>),
    /// Ambiguous dotted name
    Name(&'ast NameExpr<'ast>),
    This(&'ast ThisExpr),
    FieldAccess(&'ast FieldAccessExpr<'ast>),
    MethodCall(&'ast MethodCallExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    NewArray(&'ast NewArrayExpr<'ast>),
    /// `{ a, b }`, only valid as an array variable initializer
    ArrayInit(&'ast ArrayInitExpr<'ast>),
    Index(&'ast IndexExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Postfix(&'ast PostfixExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Conditional(&'ast ConditionalExpr<'ast>),
    Cast(&'ast CastExpr<'ast>),
    InstanceOf(&'ast InstanceOfExpr<'ast>),
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal(e) => e.id,
            Expr::Name(e) => e.id,
            Expr::This(e) => e.id,
            Expr::FieldAccess(e) => e.id,
            Expr::MethodCall(e) => e.id,
            Expr::New(e) => e.id,
            Expr::NewArray(e) => e.id,
            Expr::ArrayInit(e) => e.id,
            Expr::Index(e) => e.id,
            Expr::Assign(e) => e.id,
            Expr::Unary(e) => e.id,
            Expr::Postfix(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Conditional(e) => e.id,
            Expr::Cast(e) => e.id,
            Expr::InstanceOf(e) => e.id,
            Expr::Paren(e) => e.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Name(e) => e.span,
            Expr::This(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::New(e) => e.span,
            Expr::NewArray(e) => e.span,
            Expr::ArrayInit(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Postfix(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::InstanceOf(e) => e.span,
            Expr::Paren(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(self) -> Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = paren.expr;
        }
        expr
    }

    /// Whether this expression may appear as an expression statement.
    pub fn is_statement_expression(&self) -> bool {
        match self {
            Expr::Assign(_) | Expr::MethodCall(_) | Expr::New(_) | Expr::Postfix(_) => true,
            Expr::Unary(u) => matches!(u.op, UnaryOp::PreInc | UnaryOp::PreDec),
            _ => false,
        }
    }
}

/// Literal values. Numeric literals are range-checked by the parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'ast> {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A single UTF-16 code unit.
    Char(u16),
    /// Decoded string contents.
    String(&'ast str),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub id: NodeId,
    pub value: Literal<'ast>,
    pub span: Span,
}

/// `a`, `a.b`, `java.lang.Math.PI`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameExpr<'ast> {
    pub id: NodeId,
    pub parts: &'ast [Ident<'ast>],
    pub span: Span,
}

impl NameExpr<'_> {
    pub fn dotted(&self) -> String {
        super::dotted(self.parts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThisExpr {
    pub id: NodeId,
    pub span: Span,
}

/// The object a field or method is selected from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Receiver<'ast> {
    Expr(Expr<'ast>),
    /// `super.x` / `super.m()`
    Super(Span),
}

/// `expr.name` or `super.name`, for receivers that are not plain names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldAccessExpr<'ast> {
    pub id: NodeId,
    pub target: Receiver<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

/// `m(args)`, `target.m(args)`, `super.m(args)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodCallExpr<'ast> {
    pub id: NodeId,
    pub target: Option<Receiver<'ast>>,
    pub name: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `new T(args)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `new T[n][m][]` or `new T[] { ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewArrayExpr<'ast> {
    pub id: NodeId,
    /// Element type without dimensions.
    pub element: TypeExpr<'ast>,
    /// Sized dimensions, outermost first.
    pub dim_exprs: &'ast [Expr<'ast>],
    /// Unsized trailing dimensions.
    pub extra_dims: u8,
    pub init: Option<&'ast ArrayInitExpr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayInitExpr<'ast> {
    pub id: NodeId,
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub id: NodeId,
    pub array: Expr<'ast>,
    pub index: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub id: NodeId,
    pub op: AssignOp,
    pub target: Expr<'ast>,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostfixExpr<'ast> {
    pub id: NodeId,
    pub op: PostfixOp,
    pub operand: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub op: BinaryOp,
    pub left: Expr<'ast>,
    pub right: Expr<'ast>,
    pub span: Span,
}

/// `condition ? then_expr : else_expr`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalExpr<'ast> {
    pub id: NodeId,
    pub condition: Expr<'ast>,
    pub then_expr: Expr<'ast>,
    pub else_expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr<'ast>,
    pub expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceOfExpr<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub span: Span,
}
