//! Attribute value coercion shared by span attributes and log fields.
//!
//! [`coerce`] maps a value onto the closed set of OpenTelemetry value types.
//! Types outside the table are rendered with their `Debug` representation.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use opentelemetry::logs::AnyValue;
use opentelemetry::{Array, Key, KeyValue, StringValue, Value};

/// A log field as accepted by [`Log`](crate::Log).
pub type LogField = (Key, AnyValue);

/// Any `Display` value, rendered to a string attribute.
pub struct Stringable(Box<dyn fmt::Display + Send + Sync>);

impl Stringable {
    pub fn new(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Self(Box::new(value))
    }
}

impl fmt::Debug for Stringable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stringable({})", self.0)
    }
}

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    String(String),
    StringList(Vec<String>),
    I64(i64),
    I64List(Vec<i64>),
    Bool(bool),
    BoolList(Vec<bool>),
    F64(f64),
    F64List(Vec<f64>),
}

macro_rules! downcast {
    ($any:expr, $($ty:ty => $conv:expr),+ $(,)?) => {
        $(
            if let Some(v) = $any.downcast_ref::<$ty>() {
                #[allow(clippy::redundant_closure_call)]
                return ($conv)(v);
            }
        )+
    };
}

/// Apply the coercion table to `value`.
pub fn coerce<T: Any + fmt::Debug>(value: &T) -> Coerced {
    let any = value as &dyn Any;

    downcast!(any,
        String => |v: &String| Coerced::String(v.clone()),
        &'static str => |v: &&str| Coerced::String((*v).to_owned()),
        Cow<'static, str> => |v: &Cow<'static, str>| Coerced::String(v.to_string()),
        Vec<String> => |v: &Vec<String>| Coerced::StringList(v.clone()),
        Vec<&'static str> => |v: &Vec<&str>| {
            Coerced::StringList(v.iter().map(|s| (*s).to_owned()).collect())
        },
        Stringable => |v: &Stringable| Coerced::String(v.0.to_string()),
        i8 => |v: &i8| Coerced::I64(i64::from(*v)),
        i16 => |v: &i16| Coerced::I64(i64::from(*v)),
        i32 => |v: &i32| Coerced::I64(i64::from(*v)),
        u8 => |v: &u8| Coerced::I64(i64::from(*v)),
        u16 => |v: &u16| Coerced::I64(i64::from(*v)),
        u32 => |v: &u32| Coerced::I64(i64::from(*v)),
        Vec<i32> => |v: &Vec<i32>| Coerced::I64List(v.iter().copied().map(i64::from).collect()),
        Vec<u32> => |v: &Vec<u32>| Coerced::I64List(v.iter().copied().map(i64::from).collect()),
        i64 => |v: &i64| Coerced::I64(*v),
        Vec<i64> => |v: &Vec<i64>| Coerced::I64List(v.clone()),
        isize => |v: &isize| Coerced::I64(*v as i64),
        u64 => |v: &u64| match i64::try_from(*v) {
            Ok(n) => Coerced::I64(n),
            Err(_) => Coerced::String(v.to_string()),
        },
        usize => |v: &usize| match i64::try_from(*v) {
            Ok(n) => Coerced::I64(n),
            Err(_) => Coerced::String(v.to_string()),
        },
        bool => |v: &bool| Coerced::Bool(*v),
        Vec<bool> => |v: &Vec<bool>| Coerced::BoolList(v.clone()),
        f32 => |v: &f32| Coerced::F64(f64::from(*v)),
        f64 => |v: &f64| Coerced::F64(*v),
        Vec<f64> => |v: &Vec<f64>| Coerced::F64List(v.clone()),
        Vec<f32> => |v: &Vec<f32>| Coerced::F64List(v.iter().copied().map(f64::from).collect()),
    );

    Coerced::String(format!("{value:?}"))
}

impl From<Coerced> for Value {
    fn from(value: Coerced) -> Self {
        match value {
            Coerced::String(s) => Value::String(s.into()),
            Coerced::StringList(list) => Value::Array(Array::String(
                list.into_iter().map(StringValue::from).collect(),
            )),
            Coerced::I64(n) => Value::I64(n),
            Coerced::I64List(list) => Value::Array(Array::I64(list)),
            Coerced::Bool(b) => Value::Bool(b),
            Coerced::BoolList(list) => Value::Array(Array::Bool(list)),
            Coerced::F64(f) => Value::F64(f),
            Coerced::F64List(list) => Value::Array(Array::F64(list)),
        }
    }
}

impl From<Coerced> for AnyValue {
    fn from(value: Coerced) -> Self {
        match value {
            Coerced::String(s) => AnyValue::from(s),
            Coerced::StringList(list) => list.into_iter().collect(),
            Coerced::I64(n) => AnyValue::from(n),
            Coerced::I64List(list) => list.into_iter().collect(),
            Coerced::Bool(b) => AnyValue::from(b),
            Coerced::BoolList(list) => list.into_iter().collect(),
            Coerced::F64(f) => AnyValue::from(f),
            Coerced::F64List(list) => list.into_iter().collect(),
        }
    }
}

/// Build a span attribute, coercing `value` through the shared table.
pub fn attribute<T: Any + fmt::Debug>(key: impl Into<Key>, value: T) -> KeyValue {
    KeyValue::new(key, Value::from(coerce(&value)))
}

/// Build a log field, coercing `value` through the shared table.
pub fn log_attribute<T: Any + fmt::Debug>(key: impl Into<Key>, value: T) -> LogField {
    (key.into(), AnyValue::from(coerce(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Order {
        id: u32,
    }

    #[test]
    fn int_becomes_int64() {
        let kv = attribute("n", 3);

        assert_eq!(kv.key.as_str(), "n");
        assert_eq!(kv.value, Value::I64(3));
    }

    #[test]
    fn string_list_stays_a_list() {
        let kv = attribute("tags", vec!["a".to_owned(), "b".to_owned()]);

        assert_eq!(
            kv.value,
            Value::Array(Array::String(vec!["a".into(), "b".into()]))
        );
        assert_eq!(coerce(&vec!["a", "b"]), Coerced::StringList(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn unsupported_type_falls_back_to_debug() {
        let kv = attribute("order", Order { id: 7 });

        assert_eq!(kv.value, Value::String("Order { id: 7 }".into()));
    }

    #[test]
    fn scalar_table() {
        assert_eq!(coerce(&"s"), Coerced::String("s".into()));
        assert_eq!(coerce(&7i64), Coerced::I64(7));
        assert_eq!(coerce(&7u8), Coerced::I64(7));
        assert_eq!(coerce(&true), Coerced::Bool(true));
        assert_eq!(coerce(&1.5f64), Coerced::F64(1.5));
        assert_eq!(coerce(&vec![1i32, 2]), Coerced::I64List(vec![1, 2]));
        assert_eq!(coerce(&vec![1i64, 2]), Coerced::I64List(vec![1, 2]));
        assert_eq!(coerce(&vec![true]), Coerced::BoolList(vec![true]));
        assert_eq!(coerce(&vec![0.5f64]), Coerced::F64List(vec![0.5]));
    }

    #[test]
    fn lengths_and_narrow_lists_are_numeric() {
        let items = vec!["a", "b", "c"];

        assert_eq!(attribute("n", items.len()).value, Value::I64(3));
        assert_eq!(coerce(&usize::MAX), Coerced::String(usize::MAX.to_string()));
        assert_eq!(coerce(&vec![1u32, 2]), Coerced::I64List(vec![1, 2]));
        assert_eq!(coerce(&vec![0.5f32]), Coerced::F64List(vec![0.5]));
    }

    #[test]
    fn large_u64_is_kept_as_text() {
        assert_eq!(coerce(&u64::MAX), Coerced::String(u64::MAX.to_string()));
        assert_eq!(coerce(&9u64), Coerced::I64(9));
    }

    #[test]
    fn stringable_uses_display() {
        let addr: std::net::IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(
            coerce(&Stringable::new(addr)),
            Coerced::String("127.0.0.1".into())
        );
    }

    #[test]
    fn log_fields_share_the_table() {
        let (key, value) = log_attribute("n", 3);
        assert_eq!(key.as_str(), "n");
        assert_eq!(value, AnyValue::Int(3));

        let (_, value) = log_attribute("order", Order { id: 7 });
        assert_eq!(value, AnyValue::String("Order { id: 7 }".into()));

        let (_, value) = log_attribute("flags", vec![true, false]);
        assert_eq!(
            value,
            AnyValue::ListAny(Box::new(vec![
                AnyValue::Boolean(true),
                AnyValue::Boolean(false)
            ]))
        );
    }
}
