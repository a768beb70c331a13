//! Read-only AST traversal.
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children in source order. Override a method to act on
//! a node kind; call the `walk_*` function from the override to keep
//! descending.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin_parser::ast::{NameExpr, Parser, Visitor};
//!
//! struct Names(Vec<String>);
//!
//! impl<'ast> Visitor<'ast> for Names {
//!     fn visit_ambiguous_name(&mut self, name: &'ast NameExpr<'ast>) {
//!         self.0.push(name.dotted());
//!     }
//! }
//!
//! let arena = Bump::new();
//! let expr = Parser::new("a.b + f(c) * d[e]", &arena).expression().unwrap();
//! let mut names = Names(Vec::new());
//! names.visit_expr(expr);
//! assert_eq!(names.0, ["a.b", "c", "d", "e"]);
//! ```

use super::decl::*;
use super::expr::*;
use super::stmt::*;
use super::types::TypeExpr;

pub trait Visitor<'ast>: Sized {
    fn visit_compilation_unit(&mut self, unit: &CompilationUnit<'ast>) {
        walk_compilation_unit(self, unit);
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl<'ast>) {
        walk_type_decl(self, decl);
    }

    fn visit_member(&mut self, member: Member<'ast>) {
        walk_member(self, member);
    }

    fn visit_stmt(&mut self, stmt: Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &'ast Block<'ast>) {
        walk_block(self, block);
    }

    fn visit_expr(&mut self, expr: Expr<'ast>) {
        walk_expr(self, expr);
    }

    /// A dotted name whose meaning the parser could not decide.
    fn visit_ambiguous_name(&mut self, _name: &'ast NameExpr<'ast>) {}

    fn visit_type(&mut self, _ty: &TypeExpr<'ast>) {}
}

pub fn walk_compilation_unit<'ast, V: Visitor<'ast>>(v: &mut V, unit: &CompilationUnit<'ast>) {
    for decl in unit.types {
        v.visit_type_decl(decl);
    }
}

pub fn walk_type_decl<'ast, V: Visitor<'ast>>(v: &mut V, decl: &TypeDecl<'ast>) {
    if let Some(extends) = &decl.extends {
        v.visit_type(extends);
    }
    for ty in decl.interfaces {
        v.visit_type(ty);
    }
    for member in decl.members {
        v.visit_member(*member);
    }
}

pub fn walk_member<'ast, V: Visitor<'ast>>(v: &mut V, member: Member<'ast>) {
    match member {
        Member::Field(field) => {
            v.visit_type(&field.ty);
            walk_declarators(v, field.declarators);
        }
        Member::Method(method) => {
            v.visit_type(&method.return_ty);
            walk_params(v, method.params);
            for ty in method.throws {
                v.visit_type(ty);
            }
            if let Some(body) = method.body {
                v.visit_block(body);
            }
        }
        Member::Constructor(ctor) => {
            walk_params(v, ctor.params);
            for ty in ctor.throws {
                v.visit_type(ty);
            }
            if let Some(call) = ctor.explicit_call {
                walk_exprs(v, call.args);
            }
            v.visit_block(ctor.body);
        }
        Member::Initializer(init) => v.visit_block(init.body),
    }
}

fn walk_params<'ast, V: Visitor<'ast>>(v: &mut V, params: &'ast [Param<'ast>]) {
    for param in params {
        v.visit_type(&param.ty);
    }
}

fn walk_declarators<'ast, V: Visitor<'ast>>(v: &mut V, declarators: &'ast [VarDeclarator<'ast>]) {
    for declarator in declarators {
        if let Some(init) = declarator.init {
            v.visit_expr(init);
        }
    }
}

fn walk_exprs<'ast, V: Visitor<'ast>>(v: &mut V, exprs: &'ast [Expr<'ast>]) {
    for expr in exprs {
        v.visit_expr(*expr);
    }
}

pub fn walk_block<'ast, V: Visitor<'ast>>(v: &mut V, block: &'ast Block<'ast>) {
    for stmt in block.stmts {
        v.visit_stmt(*stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(v: &mut V, stmt: Stmt<'ast>) {
    match stmt {
        Stmt::Block(block) => v.visit_block(block),
        Stmt::LocalVar(decl) => {
            v.visit_type(&decl.ty);
            walk_declarators(v, decl.declarators);
        }
        Stmt::Expr(s) => v.visit_expr(s.expr),
        Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
        Stmt::If(s) => {
            v.visit_expr(s.condition);
            v.visit_stmt(s.then_stmt);
            if let Some(else_stmt) = s.else_stmt {
                v.visit_stmt(else_stmt);
            }
        }
        Stmt::While(s) => {
            v.visit_expr(s.condition);
            v.visit_stmt(s.body);
        }
        Stmt::DoWhile(s) => {
            v.visit_stmt(s.body);
            v.visit_expr(s.condition);
        }
        Stmt::For(s) => {
            for init in s.init {
                v.visit_stmt(*init);
            }
            if let Some(condition) = s.condition {
                v.visit_expr(condition);
            }
            walk_exprs(v, s.update);
            v.visit_stmt(s.body);
        }
        Stmt::ForEach(s) => {
            v.visit_type(&s.ty);
            v.visit_expr(s.iterable);
            v.visit_stmt(s.body);
        }
        Stmt::Switch(s) => {
            v.visit_expr(s.selector);
            for group in s.groups {
                for label in group.labels {
                    if let CaseLabel::Case(value) = label {
                        v.visit_expr(*value);
                    }
                }
                for stmt in group.stmts {
                    v.visit_stmt(*stmt);
                }
            }
        }
        Stmt::Labeled(s) => v.visit_stmt(s.body),
        Stmt::Return(s) => {
            if let Some(value) = s.value {
                v.visit_expr(value);
            }
        }
        Stmt::Throw(s) => v.visit_expr(s.expr),
        Stmt::Try(s) => {
            v.visit_block(s.body);
            for catch in s.catches {
                for ty in catch.types {
                    v.visit_type(ty);
                }
                v.visit_block(catch.body);
            }
            if let Some(finally) = s.finally {
                v.visit_block(finally);
            }
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(v: &mut V, expr: Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::This(_) => {}
        Expr::Name(name) => v.visit_ambiguous_name(name),
        Expr::FieldAccess(e) => {
            if let Receiver::Expr(target) = e.target {
                v.visit_expr(target);
            }
        }
        Expr::MethodCall(e) => {
            if let Some(Receiver::Expr(target)) = e.target {
                v.visit_expr(target);
            }
            walk_exprs(v, e.args);
        }
        Expr::New(e) => {
            v.visit_type(&e.ty);
            walk_exprs(v, e.args);
        }
        Expr::NewArray(e) => {
            v.visit_type(&e.element);
            walk_exprs(v, e.dim_exprs);
            if let Some(init) = e.init {
                walk_exprs(v, init.elements);
            }
        }
        Expr::ArrayInit(e) => walk_exprs(v, e.elements),
        Expr::Index(e) => {
            v.visit_expr(e.array);
            v.visit_expr(e.index);
        }
        Expr::Assign(e) => {
            v.visit_expr(e.target);
            v.visit_expr(e.value);
        }
        Expr::Unary(e) => v.visit_expr(e.operand),
        Expr::Postfix(e) => v.visit_expr(e.operand),
        Expr::Binary(e) => {
            v.visit_expr(e.left);
            v.visit_expr(e.right);
        }
        Expr::Conditional(e) => {
            v.visit_expr(e.condition);
            v.visit_expr(e.then_expr);
            v.visit_expr(e.else_expr);
        }
        Expr::Cast(e) => {
            v.visit_type(&e.ty);
            v.visit_expr(e.expr);
        }
        Expr::InstanceOf(e) => {
            v.visit_expr(e.expr);
            v.visit_type(&e.ty);
        }
        Expr::Paren(e) => v.visit_expr(e.expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Parser;
    use bumpalo::Bump;

    #[derive(Default)]
    struct Counter {
        exprs: usize,
        stmts: usize,
        types: usize,
    }

    impl<'ast> Visitor<'ast> for Counter {
        fn visit_expr(&mut self, expr: Expr<'ast>) {
            self.exprs += 1;
            walk_expr(self, expr);
        }

        fn visit_stmt(&mut self, stmt: Stmt<'ast>) {
            self.stmts += 1;
            walk_stmt(self, stmt);
        }

        fn visit_type(&mut self, _ty: &TypeExpr<'ast>) {
            self.types += 1;
        }
    }

    #[test]
    fn walks_every_statement_and_expression() {
        let arena = Bump::new();
        let source = "class C { int f(int n) { int s = 0; for (int i = 0; i < n; i++) s += i; return s; } }";
        let unit = Parser::new(source, &arena).compilation_unit().unwrap();
        let mut counter = Counter::default();
        counter.visit_compilation_unit(&unit);
        // int s = 0; for; int i = 0; s += i; return s;
        assert_eq!(counter.stmts, 5);
        // 0, 0, i < n, i, n, i++, i, s += i, s, i, s
        assert_eq!(counter.exprs, 11);
        // return int, param int, local int, loop int
        assert_eq!(counter.types, 4);
    }
}
