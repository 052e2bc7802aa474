//! XSD built-in types
//!
//! Primitive datatype checks for text values, covering the built-in
//! types the validator recognizes in the `http://www.w3.org/2001/XMLSchema`
//! namespace.

use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

pub use crate::XSD_NAMESPACE;

static HEX_BINARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{2})*$").unwrap());

/// Built-in XSD primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    /// xs:string
    String,
    /// xs:normalizedString
    NormalizedString,
    /// xs:token
    Token,
    /// xs:boolean
    Boolean,
    /// xs:decimal
    Decimal,
    /// xs:integer
    Integer,
    /// xs:long
    Long,
    /// xs:int
    Int,
    /// xs:short
    Short,
    /// xs:byte
    Byte,
    /// xs:nonNegativeInteger
    NonNegativeInteger,
    /// xs:positiveInteger
    PositiveInteger,
    /// xs:unsignedLong
    UnsignedLong,
    /// xs:unsignedInt
    UnsignedInt,
    /// xs:unsignedShort
    UnsignedShort,
    /// xs:unsignedByte
    UnsignedByte,
    /// xs:float
    Float,
    /// xs:double
    Double,
    /// xs:dateTime
    DateTime,
    /// xs:date
    Date,
    /// xs:time
    Time,
    /// xs:hexBinary
    HexBinary,
    /// xs:base64Binary
    Base64Binary,
    /// xs:anyURI
    AnyUri,
    /// xs:anySimpleType
    AnySimpleType,
    /// xs:anyType, the ur-type of untyped element declarations
    AnyType,
}

impl BuiltinType {
    /// Look up a built-in type by its local name in the XSD namespace
    pub fn by_name(local_name: &str) -> Option<Self> {
        match local_name {
            "string" => Some(Self::String),
            "normalizedString" => Some(Self::NormalizedString),
            "token" => Some(Self::Token),
            "boolean" => Some(Self::Boolean),
            "decimal" => Some(Self::Decimal),
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "int" => Some(Self::Int),
            "short" => Some(Self::Short),
            "byte" => Some(Self::Byte),
            "nonNegativeInteger" => Some(Self::NonNegativeInteger),
            "positiveInteger" => Some(Self::PositiveInteger),
            "unsignedLong" => Some(Self::UnsignedLong),
            "unsignedInt" => Some(Self::UnsignedInt),
            "unsignedShort" => Some(Self::UnsignedShort),
            "unsignedByte" => Some(Self::UnsignedByte),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "dateTime" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "hexBinary" => Some(Self::HexBinary),
            "base64Binary" => Some(Self::Base64Binary),
            "anyURI" => Some(Self::AnyUri),
            "anySimpleType" => Some(Self::AnySimpleType),
            "anyType" => Some(Self::AnyType),
            _ => None,
        }
    }

    /// Local name of the type in the XSD namespace
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::NormalizedString => "normalizedString",
            Self::Token => "token",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::Float => "float",
            Self::Double => "double",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::Time => "time",
            Self::HexBinary => "hexBinary",
            Self::Base64Binary => "base64Binary",
            Self::AnyUri => "anyURI",
            Self::AnySimpleType => "anySimpleType",
            Self::AnyType => "anyType",
        }
    }

    /// Qualified display name, as used in diagnostics
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", XSD_NAMESPACE, self.name())
    }

    /// Check a text value against this type's lexical space
    ///
    /// Returns the failure reason when the value is not valid.
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match self {
            Self::String
            | Self::NormalizedString
            | Self::Token
            | Self::AnySimpleType
            | Self::AnyType => Ok(()),
            Self::Boolean => match value {
                "true" | "false" | "1" | "0" => Ok(()),
                _ => Err(format!("The string '{}' is not a valid Boolean value.", value)),
            },
            Self::Decimal => value
                .parse::<Decimal>()
                .map(|_| ())
                .map_err(|_| format!("The string '{}' is not a valid Decimal value.", value)),
            Self::Integer | Self::Long => check_integer(value, i64::MIN, i64::MAX, "Int64"),
            Self::Int => check_integer(value, i32::MIN as i64, i32::MAX as i64, "Int32"),
            Self::Short => check_integer(value, i16::MIN as i64, i16::MAX as i64, "Int16"),
            Self::Byte => check_integer(value, i8::MIN as i64, i8::MAX as i64, "SByte"),
            Self::NonNegativeInteger => check_integer(value, 0, i64::MAX, "NonNegativeInteger"),
            Self::PositiveInteger => check_integer(value, 1, i64::MAX, "PositiveInteger"),
            Self::UnsignedLong => check_unsigned(value, u64::MAX, "UInt64"),
            Self::UnsignedInt => check_unsigned(value, u32::MAX as u64, "UInt32"),
            Self::UnsignedShort => check_unsigned(value, u16::MAX as u64, "UInt16"),
            Self::UnsignedByte => check_unsigned(value, u8::MAX as u64, "Byte"),
            Self::Float => check_floating(value, "Single"),
            Self::Double => check_floating(value, "Double"),
            Self::DateTime => {
                if DateTime::parse_from_rfc3339(value).is_ok()
                    || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
                {
                    Ok(())
                } else {
                    Err(format!("The string '{}' is not a valid DateTime value.", value))
                }
            }
            Self::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| format!("The string '{}' is not a valid Date value.", value)),
            Self::Time => NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
                .map(|_| ())
                .map_err(|_| format!("The string '{}' is not a valid Time value.", value)),
            Self::HexBinary => {
                if HEX_BINARY_RE.is_match(value) {
                    Ok(())
                } else {
                    Err(format!("The string '{}' is not a valid hexBinary value.", value))
                }
            }
            Self::Base64Binary => {
                let compact: String = value.split_whitespace().collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact.as_bytes())
                    .map(|_| ())
                    .map_err(|_| {
                        format!("The string '{}' is not a valid base64Binary value.", value)
                    })
            }
            Self::AnyUri => match url::Url::parse(value) {
                Ok(_) => Ok(()),
                // Relative references are valid anyURI values.
                Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
                Err(_) => Err(format!("The string '{}' is not a valid anyURI value.", value)),
            },
        }
    }
}

fn check_integer(value: &str, min: i64, max: i64, label: &str) -> std::result::Result<(), String> {
    match value.parse::<i64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(()),
        _ => Err(format!("The string '{}' is not a valid {} value.", value, label)),
    }
}

fn check_unsigned(value: &str, max: u64, label: &str) -> std::result::Result<(), String> {
    match value.parse::<u64>() {
        Ok(n) if n <= max => Ok(()),
        _ => Err(format!("The string '{}' is not a valid {} value.", value, label)),
    }
}

fn check_floating(value: &str, label: &str) -> std::result::Result<(), String> {
    match value {
        "INF" | "-INF" | "NaN" => Ok(()),
        _ => value
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| format!("The string '{}' is not a valid {} value.", value, label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(BuiltinType::by_name("int"), Some(BuiltinType::Int));
        assert_eq!(BuiltinType::by_name("dateTime"), Some(BuiltinType::DateTime));
        assert_eq!(BuiltinType::by_name("anyType"), Some(BuiltinType::AnyType));
        assert_eq!(BuiltinType::by_name("nosuch"), None);
    }

    #[test]
    fn test_int_range() {
        assert!(BuiltinType::Int.check("2147483647").is_ok());
        assert!(BuiltinType::Int.check("-2147483648").is_ok());
        assert!(BuiltinType::Int.check("2147483648").is_err());
        assert!(BuiltinType::Int.check("not a number").is_err());
    }

    #[test]
    fn test_int_error_reason() {
        let reason = BuiltinType::Int.check("9999999999").unwrap_err();
        assert_eq!(reason, "The string '9999999999' is not a valid Int32 value.");
    }

    #[test]
    fn test_boolean() {
        for v in ["true", "false", "1", "0"] {
            assert!(BuiltinType::Boolean.check(v).is_ok());
        }
        assert!(BuiltinType::Boolean.check("yes").is_err());
    }

    #[test]
    fn test_decimal_and_floating() {
        assert!(BuiltinType::Decimal.check("3.14").is_ok());
        assert!(BuiltinType::Decimal.check("x").is_err());
        assert!(BuiltinType::Double.check("-1.5e10").is_ok());
        assert!(BuiltinType::Double.check("INF").is_ok());
        assert!(BuiltinType::Float.check("abc").is_err());
    }

    #[test]
    fn test_temporal() {
        assert!(BuiltinType::Date.check("2024-02-29").is_ok());
        assert!(BuiltinType::Date.check("2024-13-01").is_err());
        assert!(BuiltinType::DateTime.check("2024-01-01T10:30:00").is_ok());
        assert!(BuiltinType::DateTime.check("2024-01-01T10:30:00+02:00").is_ok());
        assert!(BuiltinType::DateTime.check("yesterday").is_err());
        assert!(BuiltinType::Time.check("23:59:59.5").is_ok());
    }

    #[test]
    fn test_binary() {
        assert!(BuiltinType::HexBinary.check("0fB8").is_ok());
        assert!(BuiltinType::HexBinary.check("0fB").is_err());
        assert!(BuiltinType::Base64Binary.check("aGVsbG8=").is_ok());
        assert!(BuiltinType::Base64Binary.check("!!!").is_err());
    }

    #[test]
    fn test_any_uri() {
        assert!(BuiltinType::AnyUri.check("https://example.com/x").is_ok());
        assert!(BuiltinType::AnyUri.check("relative/path").is_ok());
        assert!(BuiltinType::AnyUri.check("http://[bad").is_err());
    }
}
