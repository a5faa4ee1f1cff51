use crate::{
    convert::{Convert, Kind, Value},
    range::Range,
};
use regex::Regex;
use std::{borrow::Cow, sync::Arc};

/// How converted values are stored in their target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    /// Copied and extended on every application.
    Array,
    /// Extended in place.
    Collection,
    /// `KEY=VALUE` pairs.
    Map,
}

/// Marks the built-in options that short-circuit the required-parameter check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Special {
    Help,
    Version,
}

/// Metadata shared by options and positional parameters.
#[derive(Clone)]
pub struct Target {
    pub(crate) key: Cow<'static, str>,
    pub(crate) shape: Shape,
    pub(crate) kinds: Vec<Kind>,
    pub(crate) converters: Vec<Arc<dyn Convert>>,
    pub(crate) arity: Range,
    pub(crate) split: Option<Regex>,
    pub(crate) label: Cow<'static, str>,
    pub(crate) help: Vec<Cow<'static, str>>,
    pub(crate) default: Option<Value>,
    pub(crate) hidden: bool,
}

impl Target {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// One kind for scalars, arrays and collections; the key and value kinds for maps.
    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn arity(&self) -> Range {
        self.arity
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn help(&self) -> &[Cow<'static, str>] {
        &self.help
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_flag(&self) -> bool {
        self.shape == Shape::Scalar && self.kinds.first() == Some(&Kind::Bool)
    }

    pub fn is_many(&self) -> bool {
        self.shape != Shape::Scalar
    }
}

#[derive(Clone)]
pub struct OptionDescriptor {
    pub(crate) names: Vec<Cow<'static, str>>,
    pub(crate) required: bool,
    pub(crate) special: Option<Special>,
    pub(crate) target: Target,
}

impl OptionDescriptor {
    pub fn names(&self) -> &[Cow<'static, str>] {
        &self.names
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn special(&self) -> Option<Special> {
        self.special
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The longest name, used in diagnostics.
    pub fn name(&self) -> &str {
        self.names
            .iter()
            .max_by_key(|name| name.len())
            .map_or("", |name| name.as_ref())
    }
}

#[derive(Clone)]
pub struct PositionDescriptor {
    pub(crate) index: Range,
    pub(crate) target: Target,
}

impl PositionDescriptor {
    pub fn index(&self) -> Range {
        self.index
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// How many values this parameter can hold across all of its positions.
    pub fn capacity(&self) -> Range {
        self.target.arity.capacity(self.index)
    }

    /// The label in angle brackets, used in diagnostics.
    pub fn name(&self) -> String {
        format!("<{}>", self.target.label)
    }
}

/// A reference to one descriptor of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Option(usize),
    Position(usize),
}
