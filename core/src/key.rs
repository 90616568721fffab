//! Primary key values.

use std::fmt;

/// A primary key value, tagged by kind.
///
/// Stores index records by either a text or an integer key; an integer key
/// may be null. Every other kind of value is represented by
/// [`KeyValue::Other`] and never matches anything.
///
/// # Examples
///
/// ```
/// use managed_json_core::KeyValue;
///
/// assert_eq!(KeyValue::from("abc"), KeyValue::Text("abc".into()));
/// assert_eq!(KeyValue::from(42), KeyValue::Integer(Some(42)));
/// assert_eq!(KeyValue::from(None::<i64>), KeyValue::Integer(None));
/// assert_eq!(KeyValue::from(true), KeyValue::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// A text key.
    Text(String),
    /// An integer key; `None` is the null key.
    Integer(Option<i64>),
    /// Any other kind of value. Lookups with it always miss.
    Other,
}

impl KeyValue {
    /// Returns `true` for text and integer keys.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Short name of the key kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Other => "unsupported",
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Integer(Some(n)) => write!(f, "{n}"),
            Self::Integer(None) => f.write_str("null"),
            Self::Other => f.write_str("<unsupported>"),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for KeyValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! integer_keys {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(Some(i64::from(value)))
                }
            }

            impl From<Option<$ty>> for KeyValue {
                fn from(value: Option<$ty>) -> Self {
                    Self::Integer(value.map(i64::from))
                }
            }
        )*
    };
}

integer_keys!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_integer_keys {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or(Self::Other, |n| Self::Integer(Some(n)))
                }
            }
        )*
    };
}

wide_integer_keys!(u64, usize, isize);

macro_rules! unsupported_keys {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(_: $ty) -> Self {
                    Self::Other
                }
            }
        )*
    };
}

unsupported_keys!(bool, f32, f64, char, ());

impl From<&serde_json::Value> for KeyValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text.clone()),
            serde_json::Value::Number(n) => n.as_i64().map_or(Self::Other, |n| Self::Integer(Some(n))),
            _ => Self::Other,
        }
    }
}
