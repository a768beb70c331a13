//! Decoding of literal token text into values.
//!
//! The lexer uses these routines to validate literals while scanning, and
//! the parser uses them again to produce the literal values stored in the
//! AST.

/// A malformed escape sequence, with its byte offset in the literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    pub offset: usize,
    pub detail: String,
}

impl EscapeError {
    fn new(offset: usize, detail: impl Into<String>) -> Self {
        Self {
            offset,
            detail: detail.into(),
        }
    }
}

/// Decode the body of a string or character literal (without quotes) into
/// UTF-16 code units.
pub fn decode_utf16(body: &str) -> Result<Vec<u16>, EscapeError> {
    let mut units = Vec::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(ch.encode_utf16(&mut buf));
            continue;
        }

        let Some((_, escape)) = chars.next() else {
            return Err(EscapeError::new(offset, "trailing backslash"));
        };
        let unit = match escape {
            'b' => 0x08,
            't' => 0x09,
            'n' => 0x0A,
            'f' => 0x0C,
            'r' => 0x0D,
            's' => 0x20,
            '"' => 0x22,
            '\'' => 0x27,
            '\\' => 0x5C,
            '0'..='7' => {
                // Up to three octal digits, at most \377.
                let max_len = if escape <= '3' { 3 } else { 2 };
                let mut value = escape as u16 - '0' as u16;
                let mut len = 1;
                while len < max_len {
                    match chars.peek() {
                        Some(&(_, d @ '0'..='7')) => {
                            value = value * 8 + (d as u16 - '0' as u16);
                            chars.next();
                            len += 1;
                        }
                        _ => break,
                    }
                }
                value
            }
            'u' => {
                while chars.peek().is_some_and(|&(_, c)| c == 'u') {
                    chars.next();
                }
                let mut value: u16 = 0;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16))
                        .ok_or_else(|| EscapeError::new(offset, "malformed \\u escape"))?;
                    value = value * 16 + digit as u16;
                }
                value
            }
            other => {
                return Err(EscapeError::new(offset, format!("unknown escape '\\{other}'")));
            }
        };
        units.push(unit);
    }

    Ok(units)
}

/// Decode a string literal body into a Rust string.
///
/// Unpaired surrogates produced by `\u` escapes cannot be represented and
/// are rejected.
pub fn decode_string(body: &str) -> Result<String, EscapeError> {
    let units = decode_utf16(body)?;
    String::from_utf16(&units).map_err(|_| EscapeError::new(0, "unpaired surrogate in string literal"))
}

/// Value and radix of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerValue {
    /// The literal's magnitude (no sign).
    pub magnitude: u64,
    /// Whether the literal was written in decimal. Only decimal literals are
    /// limited to the positive range of their type.
    pub decimal: bool,
}

/// Parse the text of an integer literal, with or without an `L` suffix.
pub fn parse_integer(lexeme: &str) -> Result<IntegerValue, String> {
    let text = lexeme.trim_end_matches(['l', 'L']);
    if text.ends_with('_') {
        return Err("illegal underscore".to_string());
    }
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (bin, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || digits.starts_with('_') && radix != 8 {
        return Err("missing digits".to_string());
    }
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|_| {
        if cleaned.chars().all(|c| c.is_digit(radix)) {
            "integer number too large".to_string()
        } else {
            format!("invalid digit for radix {radix}")
        }
    })?;

    Ok(IntegerValue {
        magnitude,
        decimal: radix == 10,
    })
}

/// Strip underscores and the type suffix from a floating-point literal,
/// leaving text that `str::parse` understands.
pub fn floating_text(lexeme: &str) -> String {
    lexeme
        .trim_end_matches(['f', 'F', 'd', 'D'])
        .chars()
        .filter(|&c| c != '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_escapes() {
        assert_eq!(decode_string(r#"a\tb\n\"q\"\\"#).unwrap(), "a\tb\n\"q\"\\");
    }

    #[test]
    fn octal_and_unicode_escapes() {
        assert_eq!(decode_string(r"\101\60\0").unwrap(), "A0\0");
        assert_eq!(decode_string(r"A\uu00e9").unwrap(), "Aé");
        assert_eq!(decode_utf16(r"\477").unwrap(), vec![0o47, '7' as u16]);
    }

    #[test]
    fn surrogate_pairs_combine() {
        assert_eq!(decode_string(r"😀").unwrap(), "\u{1F600}");
        assert!(decode_string(r"\uD83D").is_err());
    }

    #[test]
    fn bad_escapes() {
        assert_eq!(decode_utf16(r"ab\q").unwrap_err().offset, 2);
        assert!(decode_utf16(r"\u12").is_err());
        assert!(decode_utf16("\\").is_err());
    }

    #[test]
    fn integer_radixes() {
        assert_eq!(parse_integer("0x1F").unwrap().magnitude, 31);
        assert_eq!(parse_integer("0b101").unwrap().magnitude, 5);
        assert_eq!(parse_integer("017").unwrap().magnitude, 15);
        assert_eq!(parse_integer("1_000L").unwrap().magnitude, 1000);
        assert!(parse_integer("42").unwrap().decimal);
        assert!(!parse_integer("0xFF").unwrap().decimal);
        assert_eq!(parse_integer("0").unwrap().magnitude, 0);
    }

    #[test]
    fn integer_errors() {
        assert!(parse_integer("09").is_err());
        assert!(parse_integer("0x").is_err());
        assert!(parse_integer("1_").is_err());
        assert_eq!(
            parse_integer("99999999999999999999").unwrap_err(),
            "integer number too large"
        );
    }

    #[test]
    fn floating_cleanup() {
        assert_eq!(floating_text("1_000.5f"), "1000.5");
        assert_eq!(floating_text("2e3D"), "2e3");
    }
}
