//! Typed values produced by binding, with their natural ordering.

use cmdbind_metadata::ContainerKind;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::path::PathBuf;

/// A typed argument value produced by binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Path(PathBuf),
    Enum {
        ty: String,
        constant: String,
        ordinal: usize,
    },
    /// Value of a custom named type, carrying the raw text it was parsed from.
    Custom { ty: String, raw: String },
    Collection {
        kind: ContainerKind,
        items: Vec<Value>,
    },
    /// A constructed aggregate: its type name and constructor arguments.
    Group { ty: String, args: Vec<Value> },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Textual content of string-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Path(p) => p.to_str(),
            Self::Enum { constant, .. } => Some(constant),
            Self::Custom { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Collection { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn group_args(&self) -> Option<&[Value]> {
        match self {
            Self::Group { args, .. } => Some(args),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => 2,
            Self::Char(_) => 3,
            Self::Str(_) => 4,
            Self::Path(_) => 5,
            Self::Enum { .. } => 6,
            Self::Custom { .. } => 7,
            Self::Collection { .. } => 8,
            Self::Group { .. } => 9,
        }
    }

    /// Natural ordering used by sorted sets.
    ///
    /// Numbers compare numerically across widths, enum constants by
    /// declaration order, everything else by its textual content.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (a, b) if a.rank() == 2 && b.rank() == 2 => a.numeric_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Char(a), Self::Char(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Path(a), Self::Path(b)) => a.cmp(b),
            (
                Self::Enum {
                    ty: ta, ordinal: a, ..
                },
                Self::Enum {
                    ty: tb, ordinal: b, ..
                },
            ) => ta.cmp(tb).then(a.cmp(b)),
            (Self::Custom { raw: a, .. }, Self::Custom { raw: b, .. }) => a.cmp(b),
            (Self::Collection { items: a, .. }, Self::Collection { items: b, .. }) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.natural_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Total order over numbers: by value as `f64` (`total_cmp`, so NaN has
    /// a fixed place), then by width, then exactly within one width.
    fn numeric_cmp(&self, other: &Self) -> Ordering {
        self.numeric()
            .total_cmp(&other.numeric())
            .then_with(|| self.width().cmp(&other.width()))
            .then_with(|| match (self, other) {
                (Self::Int(a), Self::Int(b)) => a.cmp(b),
                (Self::UInt(a), Self::UInt(b)) => a.cmp(b),
                (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
                _ => Ordering::Equal,
            })
    }

    fn width(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::UInt(_) => 1,
            _ => 2,
        }
    }

    fn numeric(&self) -> f64 {
        match self {
            Self::Int(n) => *n as f64,
            Self::UInt(n) => *n as f64,
            Self::Float(f) => *f,
            _ => f64::NAN,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::UInt(n) => serializer.serialize_u64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Path(p) => serializer.serialize_str(&p.to_string_lossy()),
            Self::Enum { constant, .. } => serializer.serialize_str(constant),
            Self::Custom { raw, .. } => serializer.serialize_str(raw),
            Self::Collection { items, .. } => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Group { ty, args } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", ty)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_mixes_numeric_widths() {
        assert_eq!(Value::Int(-1).natural_cmp(&Value::UInt(3)), Ordering::Less);
        assert_eq!(Value::Float(2.5).natural_cmp(&Value::Int(2)), Ordering::Greater);
    }

    #[test]
    fn float_sort_with_nan_is_total() {
        let mut values: Vec<Value> = (0..40)
            .map(|i| {
                if i % 3 == 0 {
                    Value::Float(f64::NAN)
                } else {
                    Value::Float(f64::from(40 - i))
                }
            })
            .chain([Value::Int(7), Value::UInt(7), Value::Int(-3)])
            .collect();
        values.sort_by(Value::natural_cmp);

        let numbers: Vec<f64> = values
            .iter()
            .filter_map(Value::as_f64)
            .filter(|f| !f.is_nan())
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.last().and_then(Value::as_f64).is_some_and(f64::is_nan));
        assert_eq!(Value::Int(7).natural_cmp(&Value::UInt(7)), Ordering::Less);
    }

    #[test]
    fn enums_order_by_declaration() {
        let a = Value::Enum {
            ty: "Color".into(),
            constant: "RED".into(),
            ordinal: 0,
        };
        let b = Value::Enum {
            ty: "Color".into(),
            constant: "BLUE".into(),
            ordinal: 2,
        };
        assert_eq!(a.natural_cmp(&b), Ordering::Less);
    }

    #[test]
    fn serializes_as_plain_json() {
        let v = Value::Group {
            ty: "Address".into(),
            args: vec![
                Value::Str("Main St".into()),
                Value::Collection {
                    kind: ContainerKind::List,
                    items: vec![Value::Int(1), Value::Null],
                },
            ],
        };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"type":"Address","args":["Main St",[1,null]]}"#);
    }
}
