//! Declarations synthesized around user code.
//!
//! Expressions and scripts become the body of one method, class bodies the
//! members of one class. The nodes are built in the parser's arena with
//! fresh node ids, so the resolver treats them like parsed source.

use javelin_core::{CompilationError, JavaType, Span};
use javelin_parser::Parser;
use javelin_parser::ast::{
    Block, CompilationUnit, Ident, ImportDecl, Member, MethodDecl, Modifiers, Param, Stmt, TypeBase, TypeDecl,
    TypeExpr, TypeKind,
};

use crate::options::{CompilerOptions, MethodSignature};

fn idents<'ast>(parser: &Parser<'_, 'ast>, dotted: &str, span: Span) -> &'ast [Ident<'ast>] {
    let arena = parser.arena();
    let parts: Vec<Ident<'ast>> = dotted
        .split('.')
        .map(|part| Ident::new(arena.alloc_str(part), span))
        .collect();
    arena.alloc_slice_copy(&parts)
}

/// The source form of a resolved type. Class names are written fully
/// qualified.
pub(crate) fn type_expr<'ast>(
    parser: &Parser<'_, 'ast>,
    ty: &JavaType,
    span: Span,
) -> Result<TypeExpr<'ast>, CompilationError> {
    let mut dims = 0u8;
    let mut element = ty;
    while let JavaType::Array(inner) = element {
        dims += 1;
        element = inner;
    }
    let base = match element {
        JavaType::Void if dims == 0 => TypeBase::Void,
        JavaType::Primitive(p) => TypeBase::Primitive(*p),
        JavaType::Class(name) => TypeBase::Named(idents(parser, name, span)),
        JavaType::Void | JavaType::Null | JavaType::Array(_) => {
            return Err(CompilationError::InvalidOperation {
                message: format!("'{ty}' cannot be declared"),
                span,
            });
        }
    };
    Ok(TypeExpr { base, dims, span })
}

fn class_type<'ast>(parser: &Parser<'_, 'ast>, name: &str, span: Span) -> TypeExpr<'ast> {
    TypeExpr {
        base: TypeBase::Named(idents(parser, name, span)),
        dims: 0,
        span,
    }
}

/// A method named after the options, with `stmts` as its body.
pub(crate) fn method<'ast>(
    parser: &mut Parser<'_, 'ast>,
    options: &CompilerOptions,
    signature: &MethodSignature,
    return_type: &JavaType,
    stmts: &'ast [Stmt<'ast>],
    span: Span,
) -> Result<Member<'ast>, CompilationError> {
    let mut params = Vec::with_capacity(signature.params.len());
    for (name, ty) in &signature.params {
        let ty = type_expr(parser, ty, span)?;
        let name = Ident::new(parser.arena().alloc_str(name), span);
        params.push(Param {
            id: parser.fresh_id(),
            is_final: false,
            ty,
            name,
            span,
        });
    }
    let throws: Vec<TypeExpr<'ast>> = signature
        .throws
        .iter()
        .map(|exception| class_type(parser, exception, span))
        .collect();

    let mut modifiers = Modifiers::PUBLIC;
    if options.is_static {
        modifiers |= Modifiers::STATIC;
    }
    let arena = parser.arena();
    let body: &'ast Block<'ast> = arena.alloc(Block { stmts, span });
    let decl = arena.alloc(MethodDecl {
        modifiers,
        return_ty: type_expr(parser, return_type, span)?,
        name: Ident::new(arena.alloc_str(&options.method_name), span),
        params: arena.alloc_slice_copy(&params),
        throws: arena.alloc_slice_copy(&throws),
        body: Some(body),
        span,
    });
    Ok(Member::Method(decl))
}

/// A unit holding one public class with the given members.
pub(crate) fn unit<'ast>(
    parser: &Parser<'_, 'ast>,
    options: &CompilerOptions,
    imports: &'ast [ImportDecl<'ast>],
    members: &'ast [Member<'ast>],
    span: Span,
) -> CompilationUnit<'ast> {
    let arena = parser.arena();
    let package = options.package();
    let interfaces: Vec<TypeExpr<'ast>> = options
        .interfaces
        .iter()
        .map(|name| class_type(parser, name, span))
        .collect();
    let decl = TypeDecl {
        modifiers: Modifiers::PUBLIC,
        kind: TypeKind::Class,
        name: Ident::new(arena.alloc_str(options.simple_class_name()), span),
        extends: options.superclass.as_deref().map(|name| class_type(parser, name, span)),
        interfaces: arena.alloc_slice_copy(&interfaces),
        members,
        span,
    };
    CompilationUnit {
        package: (!package.is_empty()).then(|| idents(parser, package, span)),
        imports,
        types: arena.alloc_slice_copy(&[decl]),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use javelin_core::PrimitiveType;

    #[test]
    fn array_types_count_dimensions() {
        let arena = Bump::new();
        let parser = Parser::new("", &arena);
        let ty = type_expr(&parser, &JavaType::string().with_dims(2), Span::default()).unwrap();
        assert_eq!(ty.dims, 2);
        assert_eq!(ty.name().as_deref(), Some("java.lang.String"));

        let ty = type_expr(&parser, &JavaType::INT, Span::default()).unwrap();
        assert_eq!(ty.base, TypeBase::Primitive(PrimitiveType::Int));

        let ty = type_expr(&parser, &JavaType::DOUBLE.with_dims(3), Span::default()).unwrap();
        assert_eq!((ty.base, ty.dims), (TypeBase::Primitive(PrimitiveType::Double), 3));
    }

    #[test]
    fn null_is_not_declarable() {
        let arena = Bump::new();
        let parser = Parser::new("", &arena);
        assert!(type_expr(&parser, &JavaType::Null, Span::default()).is_err());
        assert!(type_expr(&parser, &JavaType::Void, Span::default()).unwrap().is_void());
    }

    #[test]
    fn unit_in_package() {
        let arena = Bump::new();
        let parser = Parser::new("", &arena);
        let options = CompilerOptions::new().class_name("a.b.Gen").implements("java.lang.Runnable");
        let unit = unit(&parser, &options, &[], &[], Span::default());
        assert_eq!(unit.package.map(javelin_parser::ast::dotted).as_deref(), Some("a.b"));
        assert_eq!(unit.types[0].name.name, "Gen");
        assert_eq!(unit.types[0].interfaces.len(), 1);
    }
}
