pub mod error;

use crate::error::{Error, Result};
use std::fmt;

pub const MAX_DECIMAL_PRECISION: u8 = 38;
pub const DEFAULT_DECIMAL_PRECISION: u8 = 10;
pub const DEFAULT_DECIMAL_SCALE: u8 = 0;
pub const DEFAULT_STRING_LENGTH: u32 = 65535;
pub const DEFAULT_CHAR_LENGTH: u32 = 1;

/// Category of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeKind {
    Boolean = 1,
    Byte = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,
    Decimal = 8,
    String = 9,
    Varchar = 10,
    Char = 11,
    Binary = 12,
    Varbinary = 13,
    Date = 14,
    Time = 15,
    Timestamp = 16,
}

impl TypeKind {
    /// Canonical lower-case name of this kind.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Byte => "tinyint",
            TypeKind::Short => "smallint",
            TypeKind::Int => "int",
            TypeKind::Long => "bigint",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::Decimal => "decimal",
            TypeKind::String => "string",
            TypeKind::Varchar => "varchar",
            TypeKind::Char => "char",
            TypeKind::Binary => "binary",
            TypeKind::Varbinary => "varbinary",
            TypeKind::Date => "date",
            TypeKind::Time => "time",
            TypeKind::Timestamp => "timestamp",
        }
    }

    /// Returns the width in bytes of values stored in fixed-width form.
    /// Variable-length kinds return None.
    #[inline]
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TypeKind::Boolean | TypeKind::Byte => Some(1),
            TypeKind::Short => Some(2),
            TypeKind::Int | TypeKind::Float | TypeKind::Date | TypeKind::Time => Some(4),
            TypeKind::Long | TypeKind::Double | TypeKind::Timestamp => Some(8),
            TypeKind::Decimal => Some(8),
            TypeKind::String
            | TypeKind::Varchar
            | TypeKind::Char
            | TypeKind::Binary
            | TypeKind::Varbinary => None,
        }
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Date
                | TypeKind::Time
                | TypeKind::Timestamp
        )
    }

    #[inline]
    pub fn is_floating(self) -> bool {
        matches!(self, TypeKind::Float | TypeKind::Double)
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            TypeKind::String
                | TypeKind::Varchar
                | TypeKind::Char
                | TypeKind::Binary
                | TypeKind::Varbinary
        )
    }

    #[inline]
    fn has_length(self) -> bool {
        matches!(
            self,
            TypeKind::Varchar | TypeKind::Char | TypeKind::Binary | TypeKind::Varbinary
        )
    }
}

/// Describes the type of a single column.
///
/// `max_length` is meaningful for char/varchar/binary/varbinary,
/// `precision` and `scale` only for decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescription {
    pub kind: TypeKind,
    pub max_length: u32,
    pub precision: u8,
    pub scale: u8,
}

impl TypeDescription {
    #[inline]
    pub const fn new(kind: TypeKind) -> Self {
        TypeDescription {
            kind,
            max_length: DEFAULT_STRING_LENGTH,
            precision: DEFAULT_DECIMAL_PRECISION,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    #[inline]
    pub const fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    #[inline]
    pub const fn int() -> Self {
        Self::new(TypeKind::Int)
    }

    #[inline]
    pub const fn long() -> Self {
        Self::new(TypeKind::Long)
    }

    #[inline]
    pub const fn double() -> Self {
        Self::new(TypeKind::Double)
    }

    #[inline]
    pub const fn string() -> Self {
        Self::new(TypeKind::String)
    }

    #[inline]
    pub fn varchar(max_length: u32) -> Result<Self> {
        Self::with_length(TypeKind::Varchar, max_length)
    }

    #[inline]
    pub fn char(max_length: u32) -> Result<Self> {
        Self::with_length(TypeKind::Char, max_length)
    }

    #[inline]
    pub fn decimal(precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
            return Err(Error::InvalidDecimal(precision, scale));
        }
        let mut ty = Self::new(TypeKind::Decimal);
        ty.precision = precision;
        ty.scale = scale;
        Ok(ty)
    }

    #[inline]
    fn with_length(kind: TypeKind, max_length: u32) -> Result<Self> {
        if max_length == 0 {
            return Err(Error::InvalidLength(format!("{}(0)", kind.name())));
        }
        let mut ty = Self::new(kind);
        ty.max_length = max_length;
        Ok(ty)
    }

    /// Parse type from its textual name, e.g. `bigint`, `varchar(32)`,
    /// `decimal(10,2)`. Case and surrounding whitespace are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim().to_ascii_lowercase();
        let (name, args) = match s.find('(') {
            Some(pos) => {
                if !s.ends_with(')') {
                    return Err(Error::InvalidTypeName(input.to_string()));
                }
                (s[..pos].trim(), Some(&s[pos + 1..s.len() - 1]))
            }
            None => (s.as_str(), None),
        };
        let kind = match name {
            "boolean" | "bool" => TypeKind::Boolean,
            "tinyint" | "byte" => TypeKind::Byte,
            "smallint" | "short" => TypeKind::Short,
            "int" | "integer" => TypeKind::Int,
            "bigint" | "long" => TypeKind::Long,
            "float" | "real" => TypeKind::Float,
            "double" => TypeKind::Double,
            "decimal" => TypeKind::Decimal,
            "string" => TypeKind::String,
            "varchar" => TypeKind::Varchar,
            "char" => TypeKind::Char,
            "binary" => TypeKind::Binary,
            "varbinary" => TypeKind::Varbinary,
            "date" => TypeKind::Date,
            "time" => TypeKind::Time,
            "timestamp" => TypeKind::Timestamp,
            _ => return Err(Error::InvalidTypeName(input.to_string())),
        };
        let args: Vec<&str> = match args {
            Some(a) => a.split(',').map(str::trim).collect(),
            None => vec![],
        };
        let parse_num = |arg: &str| {
            arg.parse::<u32>()
                .map_err(|_| Error::InvalidTypeName(input.to_string()))
        };
        match (kind, args.as_slice()) {
            (TypeKind::Decimal, []) => Ok(Self::new(TypeKind::Decimal)),
            (TypeKind::Decimal, [p]) => {
                let p = parse_num(*p)?;
                Self::decimal(u8::try_from(p).unwrap_or(u8::MAX), 0)
            }
            (TypeKind::Decimal, [p, sc]) => {
                let p = parse_num(*p)?;
                let sc = parse_num(*sc)?;
                Self::decimal(
                    u8::try_from(p).unwrap_or(u8::MAX),
                    u8::try_from(sc).unwrap_or(u8::MAX),
                )
            }
            (TypeKind::Char, []) => Self::with_length(kind, DEFAULT_CHAR_LENGTH),
            (k, []) => Ok(Self::new(k)),
            (k, [len]) if k.has_length() => Self::with_length(k, parse_num(*len)?),
            _ => Err(Error::InvalidTypeName(input.to_string())),
        }
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Decimal => write!(f, "decimal({},{})", self.precision, self.scale),
            k if k.has_length() => write!(f, "{}({})", k.name(), self.max_length),
            k => f.write_str(k.name()),
        }
    }
}
