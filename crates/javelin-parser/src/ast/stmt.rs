//! Statement AST nodes.

use javelin_core::Span;

use super::expr::Expr;
use super::types::TypeExpr;
use super::{Ident, NodeId};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Block(&'ast Block<'ast>),
    LocalVar(&'ast LocalVarDecl<'ast>),
    Expr(&'ast ExprStmt<'ast>),
    /// A lone `;`
    Empty(Span),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    ForEach(&'ast ForEachStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Break(&'ast JumpStmt<'ast>),
    Continue(&'ast JumpStmt<'ast>),
    Labeled(&'ast LabeledStmt<'ast>),
    Return(&'ast ReturnStmt<'ast>),
    Throw(&'ast ThrowStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
}

impl Stmt<'_> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::LocalVar(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Empty(span) => *span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Try(s) => s.span,
        }
    }
}

/// `{ stmts }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// One variable in a local variable or field declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    /// C-style dimensions after the name: `int a[]`.
    pub extra_dims: u8,
    pub init: Option<Expr<'ast>>,
    pub span: Span,
}

/// `final int a = 1, b;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVarDecl<'ast> {
    pub is_final: bool,
    pub ty: TypeExpr<'ast>,
    pub declarators: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: Expr<'ast>,
    pub then_stmt: Stmt<'ast>,
    pub else_stmt: Option<Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: Stmt<'ast>,
    pub condition: Expr<'ast>,
    pub span: Span,
}

/// `for (init; condition; update) body`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// A single local variable declaration or a list of expression statements.
    pub init: &'ast [Stmt<'ast>],
    pub condition: Option<Expr<'ast>>,
    pub update: &'ast [Expr<'ast>],
    pub body: Stmt<'ast>,
    pub span: Span,
}

/// `for (T x : array) body`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForEachStmt<'ast> {
    pub is_final: bool,
    pub ty: TypeExpr<'ast>,
    pub var: VarDeclarator<'ast>,
    pub iterable: Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub selector: Expr<'ast>,
    pub groups: &'ast [SwitchGroup<'ast>],
    pub span: Span,
}

/// One or more labels followed by the statements they select.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchGroup<'ast> {
    pub labels: &'ast [CaseLabel<'ast>],
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaseLabel<'ast> {
    Case(Expr<'ast>),
    Default(Span),
}

/// `break [label];` or `continue [label];`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpStmt<'ast> {
    pub label: Option<Ident<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledStmt<'ast> {
    pub label: Ident<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub body: &'ast Block<'ast>,
    pub catches: &'ast [CatchClause<'ast>],
    pub finally: Option<&'ast Block<'ast>>,
    pub span: Span,
}

/// `catch (final A | B e) { ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    /// Identifies the exception parameter.
    pub id: NodeId,
    pub types: &'ast [TypeExpr<'ast>],
    pub name: Ident<'ast>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}
