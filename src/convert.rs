use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use core::{any::Any, fmt, hash::Hash};
use regex::Regex;
use std::{
    borrow::Cow,
    collections::HashMap,
    net::IpAddr,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};
use url::Url;
use uuid::Uuid;

/// The type tag of a descriptor's element type; converters are registered per tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Integer,
    Natural,
    Float,
    Char,
    String,
    Path,
    Address,
    Uuid,
    Url,
    Date,
    Time,
    DateTime,
    Regex,
    /// An enum-like type: the raw token must be one of the listed values.
    Choice(Vec<Cow<'static, str>>),
    /// A user type; requires a converter registered under this name.
    Custom(Cow<'static, str>),
}

#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Natural(u64),
    Float(f64),
    Char(char),
    String(String),
    Path(PathBuf),
    Address(IpAddr),
    Uuid(Uuid),
    Url(Url),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Regex(Regex),
    Custom(Arc<dyn Any + Send + Sync>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

pub trait Convert: Send + Sync {
    fn convert(&self, value: &str) -> Result<Value, Cow<'static, str>>;
}

impl<E: fmt::Display, F: Fn(&str) -> Result<Value, E> + Send + Sync> Convert for F {
    fn convert(&self, value: &str) -> Result<Value, Cow<'static, str>> {
        self(value).map_err(|error| Cow::Owned(error.to_string()))
    }
}

/// Wraps a [`FromStr`] type in a [`Value::Custom`] converter.
pub fn custom<T: FromStr + Send + Sync + 'static>() -> impl Convert
where
    T::Err: fmt::Display,
{
    |value: &str| value.parse::<T>().map(|value| Value::Custom(Arc::new(value)))
}

struct Choices(Vec<Cow<'static, str>>);

impl Convert for Choices {
    fn convert(&self, value: &str) -> Result<Value, Cow<'static, str>> {
        if self.0.iter().any(|choice| choice == value) {
            return Ok(Value::String(value.to_string()));
        }
        let mut message = String::from("expected one of ");
        for (index, choice) in self.0.iter().enumerate() {
            if index > 0 {
                message.push_str(", ");
            }
            message.push_str(choice);
        }
        Err(Cow::Owned(message))
    }
}

/// Maps type tags to converters. Filled during the build phase and frozen inside the `Parser`.
#[derive(Clone)]
pub struct Registry {
    converters: HashMap<Kind, Arc<dyn Convert>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn has(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::Choice(_)) || self.converters.contains_key(kind)
    }

    pub fn get(&self, kind: &Kind) -> Option<Arc<dyn Convert>> {
        match kind {
            Kind::Choice(choices) => Some(Arc::new(Choices(choices.clone()))),
            kind => self.converters.get(kind).cloned(),
        }
    }

    pub fn insert(&mut self, kind: Kind, converter: impl Convert + 'static) {
        self.converters.insert(kind, Arc::new(converter));
    }

    pub(crate) fn share(&mut self, kind: Kind, converter: Arc<dyn Convert>) {
        self.converters.insert(kind, converter);
    }
}

fn parse<T: FromStr>(value: &str, wrap: fn(T) -> Value) -> Result<Value, Cow<'static, str>>
where
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map(wrap)
        .map_err(|error| Cow::Owned(error.to_string()))
}

fn boolean(value: &str) -> Result<Value, Cow<'static, str>> {
    if value.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if value.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(Cow::Borrowed("expected 'true' or 'false'"))
    }
}

fn date_time(value: &str) -> Result<Value, Cow<'static, str>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map(Value::DateTime)
        .map_err(|error| Cow::Owned(error.to_string()))
}

fn time(value: &str) -> Result<Value, Cow<'static, str>> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(Value::Time)
        .map_err(|error| Cow::Owned(error.to_string()))
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(Kind::Bool, boolean);
        registry.insert(Kind::Integer, |value: &str| parse(value, Value::Integer));
        registry.insert(Kind::Natural, |value: &str| parse(value, Value::Natural));
        registry.insert(Kind::Float, |value: &str| parse(value, Value::Float));
        registry.insert(Kind::Char, |value: &str| parse(value, Value::Char));
        registry.insert(Kind::String, |value: &str| {
            Ok::<_, fmt::Error>(Value::String(value.to_string()))
        });
        registry.insert(Kind::Path, |value: &str| parse(value, Value::Path));
        registry.insert(Kind::Address, |value: &str| parse(value, Value::Address));
        registry.insert(Kind::Uuid, |value: &str| parse(value, Value::Uuid));
        registry.insert(Kind::Url, |value: &str| parse(value, Value::Url));
        registry.insert(Kind::Date, |value: &str| parse(value, Value::Date));
        registry.insert(Kind::Time, time);
        registry.insert(Kind::DateTime, date_time);
        registry.insert(Kind::Regex, |value: &str| parse(value, Value::Regex));
        registry
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "boolean"),
            Kind::Integer => write!(f, "integer number"),
            Kind::Natural => write!(f, "natural number"),
            Kind::Float => write!(f, "real number"),
            Kind::Char => write!(f, "character"),
            Kind::String => write!(f, "string"),
            Kind::Path => write!(f, "path"),
            Kind::Address => write!(f, "ip address"),
            Kind::Uuid => write!(f, "uuid"),
            Kind::Url => write!(f, "url"),
            Kind::Date => write!(f, "date"),
            Kind::Time => write!(f, "time"),
            Kind::DateTime => write!(f, "date time"),
            Kind::Regex => write!(f, "pattern"),
            Kind::Choice(_) => write!(f, "choice"),
            Kind::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Custom(_) => write!(f, "Custom(..)"),
            Value::List(values) => f.debug_list().entries(values).finish(),
            Value::Map(pairs) => f
                .debug_map()
                .entries(pairs.iter().map(|(key, value)| (key, value)))
                .finish(),
            value => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Natural(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Path(value) => write!(f, "{}", value.display()),
            Value::Address(value) => write!(f, "{value}"),
            Value::Uuid(value) => write!(f, "{value}"),
            Value::Url(value) => write!(f, "{value}"),
            Value::Date(value) => write!(f, "{value}"),
            Value::Time(value) => write!(f, "{value}"),
            Value::DateTime(value) => write!(f, "{value}"),
            Value::Regex(value) => write!(f, "{value}"),
            Value::Custom(_) => write!(f, "?"),
            Value::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Integer(left), Value::Integer(right)) => left == right,
            (Value::Natural(left), Value::Natural(right)) => left == right,
            (Value::Float(left), Value::Float(right)) => left == right,
            (Value::Char(left), Value::Char(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Path(left), Value::Path(right)) => left == right,
            (Value::Address(left), Value::Address(right)) => left == right,
            (Value::Uuid(left), Value::Uuid(right)) => left == right,
            (Value::Url(left), Value::Url(right)) => left == right,
            (Value::Date(left), Value::Date(right)) => left == right,
            (Value::Time(left), Value::Time(right)) => left == right,
            (Value::DateTime(left), Value::DateTime(right)) => left == right,
            (Value::Regex(left), Value::Regex(right)) => left.as_str() == right.as_str(),
            (Value::Custom(left), Value::Custom(right)) => Arc::ptr_eq(left, right),
            (Value::List(left), Value::List(right)) => left == right,
            (Value::Map(left), Value::Map(right)) => left == right,
            _ => false,
        }
    }
}

/// Extracts a typed value out of a converted [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! signed {
    ($($type: ty),*) => {
        $(impl FromValue for $type {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Integer(value) => <$type>::try_from(*value).ok(),
                    Value::Natural(value) => <$type>::try_from(*value).ok(),
                    _ => None,
                }
            }
        })*
    };
}

macro_rules! direct {
    ($($type: ty => $variant: ident),*) => {
        $(impl FromValue for $type {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(value) => Some(value.clone()),
                    _ => None,
                }
            }
        })*
    };
}

signed!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
direct!(
    bool => Bool,
    char => Char,
    PathBuf => Path,
    IpAddr => Address,
    Uuid => Uuid,
    Url => Url,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Regex => Regex
);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(value) => Some(*value),
            Value::Integer(value) => Some(*value as f64),
            Value::Natural(value) => Some(*value as f64),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|value| value as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(value) => Some(value.clone()),
            Value::Custom(_) | Value::List(_) | Value::Map(_) => None,
            value => Some(value.to_string()),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(values) => values.iter().map(T::from_value).collect(),
            value => T::from_value(value).map(|value| vec![value]),
        }
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(pairs) => pairs
                .iter()
                .map(|(key, value)| Some((K::from_value(key)?, V::from_value(value)?)))
                .collect(),
            _ => None,
        }
    }
}
