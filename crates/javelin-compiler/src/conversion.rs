//! Conversions between static types.
//!
//! Every value the resolver checks against an expected type gets a
//! [`Conversion`] recorded next to it. The conversion both proves the
//! value fits and tells the generator which instructions to add after
//! evaluating it.
//!
//! ## Contexts
//!
//! - [`strict_invocation`]: identity, widening primitive, widening reference
//! - [`loose_invocation`]: the above plus boxing and unboxing
//! - [`assignment`]: loose invocation plus narrowing of `int` constants to
//!   `byte`, `short` and `char` (and their boxes)
//! - [`casting`]: every conversion a cast may perform

use javelin_core::{ConstValue, JavaType, PrimitiveType};

use crate::context::ClassTable;

/// The conversion applied to a value to obtain the type its context needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Conversion {
    #[default]
    Identity,
    /// Widen a primitive to the given type.
    WideningPrimitive(PrimitiveType),
    /// Narrow a primitive to the given type.
    NarrowingPrimitive(PrimitiveType),
    /// No instructions; the value already is an instance of the target.
    WideningReference,
    /// `checkcast` to the given type.
    NarrowingReference(JavaType),
    /// Box a primitive of the given type, possibly followed by a widening
    /// reference conversion.
    Boxing(PrimitiveType),
    /// Unbox to the given primitive.
    Unboxing(PrimitiveType),
    /// Unbox to `unboxed`, then widen to `target`.
    UnboxingWidening {
        unboxed: PrimitiveType,
        target: PrimitiveType,
    },
    /// Narrow an `int` constant to `target` and box it.
    NarrowingBoxing(PrimitiveType),
    /// `checkcast` to the box of the given primitive, then unbox.
    CheckedUnboxing(PrimitiveType),
}

impl Conversion {
    /// Rank used to compare conversions: identity < widening primitive <
    /// boxing and unboxing < widening reference < narrowing.
    pub fn rank(&self) -> u8 {
        match self {
            Conversion::Identity => 0,
            Conversion::WideningPrimitive(_) => 1,
            Conversion::Boxing(_)
            | Conversion::Unboxing(_)
            | Conversion::UnboxingWidening { .. }
            | Conversion::NarrowingBoxing(_)
            | Conversion::CheckedUnboxing(_) => 2,
            Conversion::WideningReference => 3,
            Conversion::NarrowingPrimitive(_) | Conversion::NarrowingReference(_) => 4,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Conversion::Identity)
    }
}

/// Identity, widening primitive and widening reference conversions.
pub fn strict_invocation(table: &ClassTable<'_>, from: &JavaType, to: &JavaType) -> Option<Conversion> {
    if from.is_void() || to.is_void() {
        return None;
    }
    if from == to {
        return Some(Conversion::Identity);
    }
    match (from, to) {
        (JavaType::Primitive(p), JavaType::Primitive(q)) => {
            p.widens_to(*q).then_some(Conversion::WideningPrimitive(*q))
        }
        (f, t) if f.is_reference() && t.is_reference() => table
            .is_reference_assignable(f, t)
            .then_some(Conversion::WideningReference),
        _ => None,
    }
}

/// Strict invocation conversions plus boxing and unboxing.
pub fn loose_invocation(table: &ClassTable<'_>, from: &JavaType, to: &JavaType) -> Option<Conversion> {
    if let Some(conversion) = strict_invocation(table, from, to) {
        return Some(conversion);
    }
    match (from, to) {
        (JavaType::Primitive(p), t) if t.is_reference() && !matches!(t, JavaType::Null) => {
            let boxed = JavaType::class(p.box_class());
            table
                .is_reference_assignable(&boxed, t)
                .then_some(Conversion::Boxing(*p))
        }
        (f, JavaType::Primitive(q)) => {
            let p = f.unboxed()?;
            if p == *q {
                Some(Conversion::Unboxing(p))
            } else if p.widens_to(*q) {
                Some(Conversion::UnboxingWidening {
                    unboxed: p,
                    target: *q,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Assignment conversion. `constant` is the value of the expression when
/// it is a constant expression.
pub fn assignment(
    table: &ClassTable<'_>,
    from: &JavaType,
    to: &JavaType,
    constant: Option<&ConstValue>,
) -> Option<Conversion> {
    if let Some(conversion) = loose_invocation(table, from, to) {
        return Some(conversion);
    }
    let small_int = matches!(
        from.as_primitive(),
        Some(PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char | PrimitiveType::Int)
    );
    let value = constant.filter(|_| small_int)?.as_i32()?;
    if let Some(target) = to.as_primitive() {
        return fits(value, target).then_some(Conversion::NarrowingPrimitive(target));
    }
    let target = to.unboxed()?;
    fits(value, target).then_some(Conversion::NarrowingBoxing(target))
}

fn fits(value: i32, target: PrimitiveType) -> bool {
    match target {
        PrimitiveType::Byte => i8::try_from(value).is_ok(),
        PrimitiveType::Short => i16::try_from(value).is_ok(),
        PrimitiveType::Char => u16::try_from(value).is_ok(),
        _ => false,
    }
}

/// Conversions permitted by a cast expression.
pub fn casting(table: &ClassTable<'_>, from: &JavaType, to: &JavaType) -> Option<Conversion> {
    if let Some(conversion) = loose_invocation(table, from, to) {
        return Some(conversion);
    }
    match (from, to) {
        (JavaType::Primitive(p), JavaType::Primitive(q)) => {
            (p.is_numeric() && q.is_numeric()).then_some(Conversion::NarrowingPrimitive(*q))
        }
        (f, JavaType::Primitive(q)) if f.is_reference() => {
            let boxed = JavaType::class(q.box_class());
            table
                .is_reference_castable(f, &boxed)
                .then_some(Conversion::CheckedUnboxing(*q))
        }
        (f, t) if f.is_reference() && t.is_reference() => table
            .is_reference_castable(f, t)
            .then(|| Conversion::NarrowingReference(t.clone())),
        _ => None,
    }
}

/// The type a value has after `conversion` is applied to a value of type
/// `from`.
pub fn converted_type(from: &JavaType, conversion: &Conversion) -> JavaType {
    match conversion {
        Conversion::Identity | Conversion::WideningReference => from.clone(),
        Conversion::WideningPrimitive(p)
        | Conversion::NarrowingPrimitive(p)
        | Conversion::Unboxing(p)
        | Conversion::CheckedUnboxing(p) => JavaType::Primitive(*p),
        Conversion::UnboxingWidening { target, .. } => JavaType::Primitive(*target),
        Conversion::NarrowingReference(t) => t.clone(),
        Conversion::Boxing(p) | Conversion::NarrowingBoxing(p) => JavaType::class(p.box_class()),
    }
}
