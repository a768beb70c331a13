//! Constant folding.
//!
//! Evaluates operators over [`ConstValue`]s with Java semantics: two's
//! complement wrapping for integral arithmetic, IEEE 754 single and double
//! precision for floating point, masked shift distances. Integral division
//! by zero is not a constant expression and folds to `None`.

use javelin_core::{ConstValue, JavaType, PrimitiveType};
use javelin_parser::ast::{BinaryOp, UnaryOp};
use ordered_float::OrderedFloat;

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    fn of(value: &ConstValue, ty: PrimitiveType) -> Option<Num> {
        Some(match value.convert_to(ty)? {
            ConstValue::Int(v) => Num::Int(v),
            ConstValue::Long(v) => Num::Long(v),
            ConstValue::Float(v) => Num::Float(v.0),
            ConstValue::Double(v) => Num::Double(v.0),
            _ => return None,
        })
    }

    fn into_const(self) -> ConstValue {
        match self {
            Num::Int(v) => ConstValue::Int(v),
            Num::Long(v) => ConstValue::Long(v),
            Num::Float(v) => ConstValue::Float(OrderedFloat(v)),
            Num::Double(v) => ConstValue::Double(OrderedFloat(v)),
        }
    }
}

/// Fold a unary operator. `operand` is the promoted operand type.
pub fn unary(op: UnaryOp, value: &ConstValue, operand: &JavaType) -> Option<ConstValue> {
    if op == UnaryOp::Not {
        return value.as_bool().map(|b| ConstValue::Boolean(!b));
    }
    let ty = operand.as_primitive()?;
    let num = Num::of(value, ty)?;
    let folded = match (op, num) {
        (UnaryOp::Plus, n) => n,
        (UnaryOp::Neg, Num::Int(v)) => Num::Int(v.wrapping_neg()),
        (UnaryOp::Neg, Num::Long(v)) => Num::Long(v.wrapping_neg()),
        (UnaryOp::Neg, Num::Float(v)) => Num::Float(-v),
        (UnaryOp::Neg, Num::Double(v)) => Num::Double(-v),
        (UnaryOp::BitNot, Num::Int(v)) => Num::Int(!v),
        (UnaryOp::BitNot, Num::Long(v)) => Num::Long(!v),
        _ => return None,
    };
    Some(folded.into_const())
}

/// Fold a binary operator. `operand` is the type both operands were
/// converted to: the promoted numeric type, `boolean`, or `String` for
/// concatenation and string equality. For shifts it is the promoted type
/// of the left operand.
pub fn binary(
    op: BinaryOp,
    left: &ConstValue,
    right: &ConstValue,
    operand: &JavaType,
) -> Option<ConstValue> {
    if operand.is_string() {
        return match op {
            BinaryOp::Add => Some(ConstValue::String(format!(
                "{}{}",
                left.to_java_string(),
                right.to_java_string()
            ))),
            BinaryOp::Equal => Some(ConstValue::Boolean(left == right)),
            BinaryOp::NotEqual => Some(ConstValue::Boolean(left != right)),
            _ => None,
        };
    }
    if operand.is_boolean() {
        let (l, r) = (left.as_bool()?, right.as_bool()?);
        return Some(ConstValue::Boolean(match op {
            BinaryOp::LogicalAnd | BinaryOp::BitAnd => l && r,
            BinaryOp::LogicalOr | BinaryOp::BitOr => l || r,
            BinaryOp::BitXor | BinaryOp::NotEqual => l != r,
            BinaryOp::Equal => l == r,
            _ => return None,
        }));
    }

    let ty = operand.as_primitive()?;
    if op.is_shift() {
        let distance = right.as_i64()?;
        return shift(op, Num::of(left, ty)?, distance).map(Num::into_const);
    }
    let (l, r) = (Num::of(left, ty)?, Num::of(right, ty)?);
    if op.is_comparison() {
        return compare(op, l, r).map(ConstValue::Boolean);
    }
    arithmetic(op, l, r).map(Num::into_const)
}

fn shift(op: BinaryOp, value: Num, distance: i64) -> Option<Num> {
    Some(match value {
        Num::Int(v) => {
            let d = (distance & 0x1f) as u32;
            Num::Int(match op {
                BinaryOp::ShiftLeft => v.wrapping_shl(d),
                BinaryOp::ShiftRight => v.wrapping_shr(d),
                BinaryOp::ShiftRightUnsigned => ((v as u32) >> d) as i32,
                _ => return None,
            })
        }
        Num::Long(v) => {
            let d = (distance & 0x3f) as u32;
            Num::Long(match op {
                BinaryOp::ShiftLeft => v.wrapping_shl(d),
                BinaryOp::ShiftRight => v.wrapping_shr(d),
                BinaryOp::ShiftRightUnsigned => ((v as u64) >> d) as i64,
                _ => return None,
            })
        }
        _ => return None,
    })
}

fn compare(op: BinaryOp, l: Num, r: Num) -> Option<bool> {
    let ordering = match (l, r) {
        (Num::Int(a), Num::Int(b)) => a.partial_cmp(&b),
        (Num::Long(a), Num::Long(b)) => a.partial_cmp(&b),
        (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
        (Num::Double(a), Num::Double(b)) => a.partial_cmp(&b),
        _ => return None,
    };
    // NaN compares unequal and unordered.
    let Some(ordering) = ordering else {
        return Some(op == BinaryOp::NotEqual);
    };
    Some(match op {
        BinaryOp::Equal => ordering.is_eq(),
        BinaryOp::NotEqual => ordering.is_ne(),
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEqual => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        BinaryOp::GreaterEqual => ordering.is_ge(),
        _ => return None,
    })
}

fn arithmetic(op: BinaryOp, l: Num, r: Num) -> Option<Num> {
    Some(match (l, r) {
        (Num::Int(a), Num::Int(b)) => Num::Int(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b != 0 => a.wrapping_div(b),
            BinaryOp::Rem if b != 0 => a.wrapping_rem(b),
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            _ => return None,
        }),
        (Num::Long(a), Num::Long(b)) => Num::Long(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b != 0 => a.wrapping_div(b),
            BinaryOp::Rem if b != 0 => a.wrapping_rem(b),
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            _ => return None,
        }),
        (Num::Float(a), Num::Float(b)) => Num::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => return None,
        }),
        (Num::Double(a), Num::Double(b)) => Num::Double(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => return None,
        }),
        _ => return None,
    })
}

/// Fold a cast of a constant to `target`. Only primitive and `String`
/// targets yield constants.
pub fn cast(value: &ConstValue, target: &JavaType) -> Option<ConstValue> {
    match target {
        JavaType::Primitive(p) => value.convert_to(*p),
        t if t.is_string() => matches!(value, ConstValue::String(_)).then(|| value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i32) -> ConstValue {
        ConstValue::Int(v)
    }

    #[test]
    fn integer_arithmetic_folds() {
        let product = binary(BinaryOp::Mul, &int(2), &int(3), &JavaType::INT).unwrap();
        let sum = binary(BinaryOp::Add, &product, &int(1), &JavaType::INT).unwrap();
        assert_eq!(sum, int(7));
        assert_eq!(
            binary(BinaryOp::Add, &int(i32::MAX), &int(1), &JavaType::INT),
            Some(int(i32::MIN))
        );
        assert_eq!(binary(BinaryOp::Div, &int(1), &int(0), &JavaType::INT), None);
        assert_eq!(binary(BinaryOp::Rem, &int(-7), &int(2), &JavaType::INT), Some(int(-1)));
    }

    #[test]
    fn mixed_operands_are_promoted() {
        let folded = binary(
            BinaryOp::Div,
            &int(1),
            &ConstValue::Double(OrderedFloat(4.0)),
            &JavaType::DOUBLE,
        );
        assert_eq!(folded, Some(ConstValue::Double(OrderedFloat(0.25))));
        let chars = binary(BinaryOp::Add, &ConstValue::Char(65), &int(1), &JavaType::INT);
        assert_eq!(chars, Some(int(66)));
    }

    #[test]
    fn shifts_mask_their_distance() {
        assert_eq!(binary(BinaryOp::ShiftLeft, &int(1), &int(33), &JavaType::INT), Some(int(2)));
        assert_eq!(
            binary(BinaryOp::ShiftRightUnsigned, &int(-1), &int(28), &JavaType::INT),
            Some(int(15))
        );
        assert_eq!(
            binary(BinaryOp::ShiftLeft, &ConstValue::Long(1), &int(40), &JavaType::LONG),
            Some(ConstValue::Long(1 << 40))
        );
    }

    #[test]
    fn comparisons_and_nan() {
        let nan = ConstValue::Double(OrderedFloat(f64::NAN));
        assert_eq!(
            binary(BinaryOp::Less, &int(1), &int(2), &JavaType::INT),
            Some(ConstValue::Boolean(true))
        );
        assert_eq!(
            binary(BinaryOp::Equal, &nan, &nan, &JavaType::DOUBLE),
            Some(ConstValue::Boolean(false))
        );
        assert_eq!(
            binary(BinaryOp::NotEqual, &nan, &nan, &JavaType::DOUBLE),
            Some(ConstValue::Boolean(true))
        );
    }

    #[test]
    fn string_concatenation() {
        let folded = binary(
            BinaryOp::Add,
            &ConstValue::String("n=".into()),
            &ConstValue::Char(b'x' as u16),
            &JavaType::string(),
        );
        assert_eq!(folded, Some(ConstValue::String("n=x".into())));
    }

    #[test]
    fn unary_and_casts() {
        assert_eq!(unary(UnaryOp::Neg, &int(5), &JavaType::INT), Some(int(-5)));
        assert_eq!(unary(UnaryOp::BitNot, &int(0), &JavaType::INT), Some(int(-1)));
        assert_eq!(
            unary(UnaryOp::Not, &ConstValue::Boolean(true), &JavaType::BOOLEAN),
            Some(ConstValue::Boolean(false))
        );
        assert_eq!(
            cast(&int(300), &JavaType::Primitive(PrimitiveType::Byte)),
            Some(ConstValue::Byte(44))
        );
        assert_eq!(cast(&int(1), &JavaType::object()), None);
    }
}
