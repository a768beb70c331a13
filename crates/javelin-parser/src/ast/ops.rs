//! Operator definitions and the precedence table.
//!
//! Binding powers, lowest to highest:
//!
//! | level | operators                         | assoc |
//! |-------|-----------------------------------|-------|
//! | 1     | `=` `+=` `-=` ... `>>>=`          | right |
//! | 2     | `?:`                              | right |
//! | 3     | `\|\|`                            | left  |
//! | 4     | `&&`                              | left  |
//! | 5     | `\|`                              | left  |
//! | 6     | `^`                               | left  |
//! | 7     | `&`                               | left  |
//! | 8     | `==` `!=`                         | left  |
//! | 9     | `<` `<=` `>` `>=` `instanceof`    | left  |
//! | 10    | `<<` `>>` `>>>`                   | left  |
//! | 11    | `+` `-`                           | left  |
//! | 12    | `*` `/` `%`                       | left  |
//! | 13    | prefix `+ - ~ ! ++ --`, casts     | right |
//! | 14    | postfix `++ --`, `.`, `[]`, calls | left  |

use std::fmt;

use crate::lexer::TokenKind;

/// Binding power of assignment operators (right-associative).
pub const ASSIGNMENT_BP: u8 = 2;
/// Binding power of the conditional operator (right-associative).
pub const CONDITIONAL_BP: u8 = 4;
/// Binding power of `instanceof`, which shares the relational level.
pub const INSTANCEOF_BP: u8 = 17;
/// Binding power of prefix operators and casts.
pub const UNARY_BP: u8 = 25;
/// Binding power of postfix operators, member access, indexing and calls.
pub const POSTFIX_BP: u8 = 27;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Left and right binding power for the Pratt parser.
    pub fn binding_power(self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (5, 6),
            LogicalAnd => (7, 8),
            BitOr => (9, 10),
            BitXor => (11, 12),
            BitAnd => (13, 14),
            Equal | NotEqual => (15, 16),
            Less | LessEqual | Greater | GreaterEqual => (17, 18),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (19, 20),
            Add | Sub => (21, 22),
            Mul | Div | Rem => (23, 24),
        }
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitOr,
            Caret => BinaryOp::BitXor,
            Amp => BinaryOp::BitAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Rem,
            _ => return None,
        })
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(
            self,
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::ShiftRightUnsigned
        )
    }

    /// `&&` and `||`.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `++x`
    PreInc,
    /// `--x`
    PreDec,
}

impl UnaryOp {
    pub fn from_token(token: TokenKind) -> Option<Self> {
        Some(match token {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

/// Postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::PlusPlus => Some(PostfixOp::Inc),
            TokenKind::MinusMinus => Some(PostfixOp::Dec),
            _ => None,
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
}

impl AssignOp {
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            Equal => AssignOp::Assign,
            PlusEqual => AssignOp::Add,
            MinusEqual => AssignOp::Sub,
            StarEqual => AssignOp::Mul,
            SlashEqual => AssignOp::Div,
            PercentEqual => AssignOp::Rem,
            AmpEqual => AssignOp::BitAnd,
            PipeEqual => AssignOp::BitOr,
            CaretEqual => AssignOp::BitXor,
            LessLessEqual => AssignOp::ShiftLeft,
            GreaterGreaterEqual => AssignOp::ShiftRight,
            GreaterGreaterGreaterEqual => AssignOp::ShiftRightUnsigned,
            _ => return None,
        })
    }

    /// The arithmetic operator of a compound assignment.
    pub fn binary_op(self) -> Option<BinaryOp> {
        Some(match self {
            AssignOp::Assign => return None,
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::Rem => BinaryOp::Rem,
            AssignOp::BitAnd => BinaryOp::BitAnd,
            AssignOp::BitOr => BinaryOp::BitOr,
            AssignOp::BitXor => BinaryOp::BitXor,
            AssignOp::ShiftLeft => BinaryOp::ShiftLeft,
            AssignOp::ShiftRight => BinaryOp::ShiftRight,
            AssignOp::ShiftRightUnsigned => BinaryOp::ShiftRightUnsigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_is_ordered() {
        assert!(BinaryOp::Mul.binding_power().0 > BinaryOp::Add.binding_power().0);
        assert!(BinaryOp::Add.binding_power().0 > BinaryOp::ShiftLeft.binding_power().0);
        assert!(BinaryOp::LogicalAnd.binding_power().0 > BinaryOp::LogicalOr.binding_power().0);
        assert!(BinaryOp::LogicalOr.binding_power().0 > CONDITIONAL_BP);
        assert!(CONDITIONAL_BP > ASSIGNMENT_BP);
        assert_eq!(BinaryOp::Less.binding_power().0, INSTANCEOF_BP);
        assert!(UNARY_BP > BinaryOp::Mul.binding_power().1);
    }

    #[test]
    fn compound_assignment_maps_to_binary() {
        assert_eq!(AssignOp::ShiftRightUnsigned.binary_op(), Some(BinaryOp::ShiftRightUnsigned));
        assert_eq!(AssignOp::Assign.binary_op(), None);
        assert_eq!(AssignOp::from_token(TokenKind::PercentEqual), Some(AssignOp::Rem));
    }
}
