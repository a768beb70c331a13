//! Compile-time constant values.
//!
//! [`ConstValue`] is produced by constant folding and by `static final`
//! fields with constant initializers. Floating point payloads are wrapped in
//! [`OrderedFloat`] so that constants can be hashed and compared exactly.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::types::{JavaType, PrimitiveType};

/// A compile-time constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    String(String),
}

impl ConstValue {
    /// The static type of the constant.
    pub fn java_type(&self) -> JavaType {
        match self {
            ConstValue::Boolean(_) => JavaType::Primitive(PrimitiveType::Boolean),
            ConstValue::Byte(_) => JavaType::Primitive(PrimitiveType::Byte),
            ConstValue::Short(_) => JavaType::Primitive(PrimitiveType::Short),
            ConstValue::Char(_) => JavaType::Primitive(PrimitiveType::Char),
            ConstValue::Int(_) => JavaType::INT,
            ConstValue::Long(_) => JavaType::LONG,
            ConstValue::Float(_) => JavaType::FLOAT,
            ConstValue::Double(_) => JavaType::DOUBLE,
            ConstValue::String(_) => JavaType::string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value widened to `i64`, for `byte`, `short`, `char`, `int`
    /// and `long` constants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Byte(v) => Some(*v as i64),
            ConstValue::Short(v) => Some(*v as i64),
            ConstValue::Char(v) => Some(*v as i64),
            ConstValue::Int(v) => Some(*v as i64),
            ConstValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of an `int`-representable constant (`byte`, `short`, `char`, `int`).
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ConstValue::Long(_) => None,
            other => other.as_i64().map(|v| v as i32),
        }
    }

    /// Numeric value as `f64`, for any numeric constant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(v) => Some(v.0 as f64),
            ConstValue::Double(v) => Some(v.0),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Apply a primitive conversion (widening or narrowing) to a numeric
    /// constant, with the same truncation rules as the JVM conversion
    /// instructions.
    pub fn convert_to(&self, target: PrimitiveType) -> Option<ConstValue> {
        if target == PrimitiveType::Boolean {
            return self.as_bool().map(ConstValue::Boolean);
        }
        let value = match self {
            ConstValue::Float(v) => Numeric::Float(v.0 as f64),
            ConstValue::Double(v) => Numeric::Float(v.0),
            other => Numeric::Integral(other.as_i64()?),
        };
        Some(match target {
            PrimitiveType::Byte => ConstValue::Byte(value.to_i32() as i8),
            PrimitiveType::Short => ConstValue::Short(value.to_i32() as i16),
            PrimitiveType::Char => ConstValue::Char(value.to_i32() as u16),
            PrimitiveType::Int => ConstValue::Int(value.to_i32()),
            PrimitiveType::Long => ConstValue::Long(value.to_i64()),
            PrimitiveType::Float => ConstValue::Float(OrderedFloat(match (self, value) {
                (ConstValue::Float(v), _) => v.0,
                (_, Numeric::Integral(i)) => i as f32,
                (_, Numeric::Float(f)) => f as f32,
            })),
            PrimitiveType::Double => ConstValue::Double(OrderedFloat(match value {
                Numeric::Integral(i) => i as f64,
                Numeric::Float(f) => f,
            })),
            PrimitiveType::Boolean => return None,
        })
    }

    /// String conversion as performed by string concatenation.
    pub fn to_java_string(&self) -> String {
        match self {
            ConstValue::Boolean(b) => b.to_string(),
            ConstValue::Byte(v) => v.to_string(),
            ConstValue::Short(v) => v.to_string(),
            ConstValue::Char(c) => char::from_u32(*c as u32)
                .map(String::from)
                .unwrap_or_else(|| char::REPLACEMENT_CHARACTER.to_string()),
            ConstValue::Int(v) => v.to_string(),
            ConstValue::Long(v) => v.to_string(),
            ConstValue::Float(v) => format_floating(v.0 as f64, v.0.to_string(), format!("{:e}", v.0)),
            ConstValue::Double(v) => format_floating(v.0, v.0.to_string(), format!("{:e}", v.0)),
            ConstValue::String(s) => s.clone(),
        }
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Integral(i64),
    Float(f64),
}

impl Numeric {
    /// `f2i`/`d2i`: NaN becomes 0, out-of-range values saturate.
    fn to_i32(self) -> i32 {
        match self {
            Numeric::Integral(i) => i as i32,
            Numeric::Float(f) => f as i32,
        }
    }

    fn to_i64(self) -> i64 {
        match self {
            Numeric::Integral(i) => i,
            Numeric::Float(f) => f as i64,
        }
    }
}

/// Format a floating value the way `Double.toString` does: plain notation
/// for magnitudes in `[1e-3, 1e7)`, computerized scientific notation
/// otherwise, always with at least one fractional digit.
fn format_floating(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Char(_) => write!(f, "'{}'", self.to_java_string()),
            other => f.write_str(&other.to_java_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_truncates() {
        assert_eq!(
            ConstValue::Int(300).convert_to(PrimitiveType::Byte),
            Some(ConstValue::Byte(44))
        );
        assert_eq!(
            ConstValue::Int(-1).convert_to(PrimitiveType::Char),
            Some(ConstValue::Char(0xFFFF))
        );
        assert_eq!(
            ConstValue::Double(OrderedFloat(3.9)).convert_to(PrimitiveType::Int),
            Some(ConstValue::Int(3))
        );
        assert_eq!(
            ConstValue::Double(OrderedFloat(f64::NAN)).convert_to(PrimitiveType::Long),
            Some(ConstValue::Long(0))
        );
    }

    #[test]
    fn widening_preserves_value() {
        assert_eq!(
            ConstValue::Char(65).convert_to(PrimitiveType::Int),
            Some(ConstValue::Int(65))
        );
        assert_eq!(
            ConstValue::Int(7).convert_to(PrimitiveType::Double),
            Some(ConstValue::Double(OrderedFloat(7.0)))
        );
        assert_eq!(ConstValue::String("x".into()).convert_to(PrimitiveType::Int), None);
    }

    #[test]
    fn java_string_conversion() {
        assert_eq!(ConstValue::Double(OrderedFloat(1.0)).to_java_string(), "1.0");
        assert_eq!(ConstValue::Double(OrderedFloat(0.5)).to_java_string(), "0.5");
        assert_eq!(ConstValue::Double(OrderedFloat(1e10)).to_java_string(), "1.0E10");
        assert_eq!(ConstValue::Double(OrderedFloat(1.5e-5)).to_java_string(), "1.5E-5");
        assert_eq!(ConstValue::Float(OrderedFloat(2.5)).to_java_string(), "2.5");
        assert_eq!(ConstValue::Char(b'c' as u16).to_java_string(), "c");
        assert_eq!(ConstValue::Boolean(true).to_java_string(), "true");
        assert_eq!(
            ConstValue::Double(OrderedFloat(f64::NEG_INFINITY)).to_java_string(),
            "-Infinity"
        );
    }
}
