use crate::{
    convert::Value,
    descriptor::{Shape, Slot, Target},
    error::{Error, Path},
};
use std::{borrow::Cow, collections::HashSet};
use tracing::{debug, warn};

/// Holds the values assigned during one parse and applies converted tokens to them.
pub(crate) struct Binder<'a> {
    path: &'a Path,
    overwrite: bool,
    values: Vec<Option<Value>>,
    assigned: HashSet<Slot>,
    options: usize,
}

/// Strips one level of surrounding double quotes.
pub(crate) fn unquote(value: &str) -> &str {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Splits one raw token with the target's split pattern.
pub(crate) fn split<'t>(target: &Target, value: &'t str) -> Vec<&'t str> {
    let value = unquote(value);
    match &target.split {
        Some(pattern) => pattern.split(value).collect(),
        None => vec![value],
    }
}

/// Converts one raw value with the target's converter at `kind` (0 for elements and map keys, 1
/// for map values).
pub(crate) fn convert(
    target: &Target,
    kind: usize,
    value: &str,
    name: &str,
    index: usize,
    path: &Path,
) -> Result<Value, Error> {
    let converter = target.converters.get(kind).or_else(|| target.converters.first());
    let failure = |reason: Cow<'static, str>| Error::FailedToConvert {
        path: path.clone(),
        name: Cow::Owned(name.to_string()),
        index,
        value: Cow::Owned(value.to_string()),
        type_name: Cow::Owned(
            target
                .kinds
                .get(kind)
                .map_or_else(String::new, |kind| kind.to_string()),
        ),
        reason,
    };
    match converter {
        Some(converter) => converter.convert(value).map_err(failure),
        None => Err(failure(Cow::Borrowed("no converter"))),
    }
}

/// Converts the raw tokens of one application into the value shape of `target`.
pub(crate) fn values<S: AsRef<str>>(
    target: &Target,
    raw: &[S],
    name: &str,
    path: &Path,
) -> Result<Vec<Value>, Error> {
    let mut values = Vec::with_capacity(raw.len());
    let pieces = raw.iter().flat_map(|raw| split(target, raw.as_ref()));
    for (index, piece) in pieces.enumerate() {
        let value = match target.shape {
            Shape::Map => {
                let Some((key, value)) = piece.split_once('=') else {
                    return Err(Error::FailedToConvert {
                        path: path.clone(),
                        name: Cow::Owned(name.to_string()),
                        index,
                        value: Cow::Owned(piece.to_string()),
                        type_name: Cow::Borrowed("map entry"),
                        reason: Cow::Borrowed("value should be in KEY=VALUE format"),
                    });
                };
                let key = convert(target, 0, key, name, index, path)?;
                let value = convert(target, 1, value, name, index, path)?;
                Value::Map(vec![(key, value)])
            }
            _ => convert(target, 0, piece, name, index, path)?,
        };
        values.push(value);
    }
    Ok(values)
}

impl<'a> Binder<'a> {
    pub fn new(path: &'a Path, overwrite: bool, options: usize, positions: usize) -> Self {
        Self {
            path,
            overwrite,
            values: vec![None; options + positions],
            assigned: HashSet::new(),
            options,
        }
    }

    fn index(&self, slot: Slot) -> usize {
        match slot {
            Slot::Option(index) => index,
            Slot::Position(index) => self.options + index,
        }
    }

    /// The explicitly assigned value, or the default.
    pub fn current<'t>(&'t self, slot: Slot, target: &'t Target) -> Option<&'t Value> {
        self.values[self.index(slot)]
            .as_ref()
            .or(target.default.as_ref())
    }

    /// Inverts the current boolean value of a flag.
    pub fn toggle(&mut self, slot: Slot, target: &Target, name: &str) -> Result<(), Error> {
        let current = matches!(self.current(slot, target), Some(Value::Bool(true)));
        self.scalar(slot, name, Value::Bool(!current))
    }

    /// Converts and applies the raw tokens consumed by one occurrence of a descriptor.
    pub fn apply<S: AsRef<str>>(
        &mut self,
        slot: Slot,
        target: &Target,
        name: &str,
        raw: &[S],
    ) -> Result<(), Error> {
        let converted = values(target, raw, name, self.path)?;
        match target.shape {
            Shape::Scalar => {
                let mut converted = converted.into_iter();
                let (Some(value), None) = (converted.next(), converted.next()) else {
                    return Err(Error::MaxValuesExceeded(
                        self.path.clone(),
                        Cow::Owned(name.to_string()),
                        Cow::Borrowed("only one value is allowed"),
                    ));
                };
                self.scalar(slot, name, value)
            }
            Shape::Array => {
                let index = self.index(slot);
                let existing = match &self.values[index] {
                    Some(Value::List(existing)) => existing.as_slice(),
                    _ => &[],
                };
                let mut array = Vec::with_capacity(existing.len() + converted.len());
                array.extend_from_slice(existing);
                array.extend(converted);
                debug!(name, count = array.len(), "setting array");
                self.values[index] = Some(Value::List(array));
                self.assigned.insert(slot);
                Ok(())
            }
            Shape::Collection => {
                let index = self.index(slot);
                match &mut self.values[index] {
                    Some(Value::List(items)) => items.extend(converted),
                    value => *value = Some(Value::List(converted)),
                }
                debug!(name, "adding to collection");
                self.assigned.insert(slot);
                Ok(())
            }
            Shape::Map => {
                let index = self.index(slot);
                let mut pairs = match self.values[index].take() {
                    Some(Value::Map(pairs)) => pairs,
                    _ => Vec::new(),
                };
                for pair in converted.into_iter().flat_map(|value| match value {
                    Value::Map(pairs) => pairs,
                    _ => Vec::new(),
                }) {
                    match pairs.iter_mut().find(|(key, _)| *key == pair.0) {
                        Some(existing) => existing.1 = pair.1,
                        None => pairs.push(pair),
                    }
                }
                debug!(name, count = pairs.len(), "putting map entries");
                self.values[index] = Some(Value::Map(pairs));
                self.assigned.insert(slot);
                Ok(())
            }
        }
    }

    fn scalar(&mut self, slot: Slot, name: &str, value: Value) -> Result<(), Error> {
        let index = self.index(slot);
        if !self.assigned.insert(slot) {
            if !self.overwrite {
                return Err(Error::OverwrittenOption(
                    self.path.clone(),
                    Cow::Owned(name.to_string()),
                ));
            }
            warn!(
                name,
                old = ?self.values[index],
                new = ?value,
                "overwriting value"
            );
        } else {
            debug!(name, value = ?value, "setting value");
        }
        self.values[index] = Some(value);
        Ok(())
    }

    /// Consumes the binder and yields the explicitly assigned value of every slot, options first.
    pub fn finish(self) -> Vec<Option<Value>> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::{Kind, Registry},
        range::Range,
    };
    use regex::Regex;

    fn target(shape: Shape, kinds: &[Kind]) -> Target {
        let registry = Registry::default();
        Target {
            key: "key".into(),
            shape,
            kinds: kinds.to_vec(),
            converters: kinds.iter().filter_map(|kind| registry.get(kind)).collect(),
            arity: Range::exact(1),
            split: None,
            label: "key".into(),
            help: Vec::new(),
            default: None,
            hidden: false,
        }
    }

    #[test]
    fn unquotes_one_level() {
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("\"\"a\"\""), "\"a\"");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("a\""), "a\"");
    }

    #[test]
    fn rejects_duplicate_scalars() {
        let path = Path::new();
        let target = target(Shape::Scalar, &[Kind::String]);
        let mut binder = Binder::new(&path, false, 1, 0);
        binder.apply(Slot::Option(0), &target, "--out", &["a"]).unwrap();
        assert_eq!(
            binder.apply(Slot::Option(0), &target, "--out", &["b"]),
            Err(Error::OverwrittenOption(vec![], "--out".into()))
        );
    }

    #[test]
    fn overwrites_when_allowed() {
        let path = Path::new();
        let target = target(Shape::Scalar, &[Kind::Integer]);
        let mut binder = Binder::new(&path, true, 1, 0);
        binder.apply(Slot::Option(0), &target, "-n", &["1"]).unwrap();
        binder.apply(Slot::Option(0), &target, "-n", &["2"]).unwrap();
        assert_eq!(
            binder.current(Slot::Option(0), &target),
            Some(&Value::Integer(2))
        );
    }

    #[test]
    fn arrays_and_collections_preserve_order() {
        let path = Path::new();
        let array = target(Shape::Array, &[Kind::Integer]);
        let collection = target(Shape::Collection, &[Kind::String]);
        let mut binder = Binder::new(&path, false, 2, 0);
        binder.apply(Slot::Option(0), &array, "-a", &["1", "2"]).unwrap();
        binder.apply(Slot::Option(0), &array, "-a", &["3"]).unwrap();
        binder.apply(Slot::Option(1), &collection, "-c", &["x"]).unwrap();
        binder.apply(Slot::Option(1), &collection, "-c", &["y"]).unwrap();
        assert_eq!(
            binder.current(Slot::Option(0), &array),
            Some(&Value::List(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ]))
        );
        assert_eq!(
            binder.current(Slot::Option(1), &collection),
            Some(&Value::List(vec![
                Value::String("x".into()),
                Value::String("y".into())
            ]))
        );
    }

    #[test]
    fn maps_split_entries() {
        let path = Path::new();
        let mut map = target(Shape::Map, &[Kind::String, Kind::Natural]);
        map.split = Regex::new(",").ok();
        let mut binder = Binder::new(&path, false, 1, 0);
        binder.apply(Slot::Option(0), &map, "-D", &["a=1,b=2"]).unwrap();
        binder.apply(Slot::Option(0), &map, "-D", &["a=3"]).unwrap();
        assert_eq!(
            binder.current(Slot::Option(0), &map),
            Some(&Value::Map(vec![
                (Value::String("a".into()), Value::Natural(3)),
                (Value::String("b".into()), Value::Natural(2)),
            ]))
        );
        assert!(matches!(
            binder.apply(Slot::Option(0), &map, "-D", &["oops"]),
            Err(Error::FailedToConvert { .. })
        ));
    }

    #[test]
    fn scalar_split_into_many_exceeds_maximum() {
        let path = Path::new();
        let mut scalar = target(Shape::Scalar, &[Kind::String]);
        scalar.split = Regex::new(",").ok();
        let mut binder = Binder::new(&path, false, 1, 0);
        assert!(matches!(
            binder.apply(Slot::Option(0), &scalar, "-s", &["a,b"]),
            Err(Error::MaxValuesExceeded(..))
        ));
    }

    #[test]
    fn toggles_defaults() {
        let path = Path::new();
        let mut flag = target(Shape::Scalar, &[Kind::Bool]);
        flag.default = Some(Value::Bool(true));
        let mut binder = Binder::new(&path, false, 1, 0);
        binder.toggle(Slot::Option(0), &flag, "-q").unwrap();
        assert_eq!(
            binder.current(Slot::Option(0), &flag),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn conversion_errors_carry_index() {
        let path = vec![Cow::Borrowed("run")];
        let array = target(Shape::Array, &[Kind::Integer]);
        let mut binder = Binder::new(&path, false, 1, 0);
        let Err(Error::FailedToConvert { index, value, .. }) =
            binder.apply(Slot::Option(0), &array, "-a", &["1", "x"])
        else {
            panic!("expected a conversion failure");
        };
        assert_eq!((index, value.as_ref()), (1, "x"));
    }
}
