use crate::{
    bind,
    convert::{Convert, Kind, Registry, Value},
    descriptor::{OptionDescriptor, PositionDescriptor, Shape, Special, Target},
    error::{Error, Path},
    help::Section,
    parse::{About, Parser, Settings},
    range::Range,
    style::{Ansi, Scheme},
};
use regex::Regex;
use std::{
    borrow::Cow,
    collections::{hash_map::Entry, HashMap, HashSet},
    default,
    fmt::Display,
    sync::Arc,
};
use tracing::debug;

/// Built-in options that can be added to any command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Options {
    /// `-h, --help`: suppresses the required-parameter check and lets the caller print the help.
    Help,
    /// `-V, --version`: suppresses the required-parameter check and lets the caller print the version.
    Version,
}

/// Declares a command: its options, positional parameters, sub-commands and help texts.
pub struct Builder {
    names: Vec<Cow<'static, str>>,
    about: About,
    settings: Settings,
    converters: Vec<(Kind, Arc<dyn Convert>)>,
    builtins: Vec<Options>,
    options: Vec<OptionBuilder>,
    positions: Vec<PositionBuilder>,
    commands: Vec<Builder>,
}

#[derive(Clone, Default)]
struct TargetBuilder {
    key: Option<Cow<'static, str>>,
    shape: Option<Shape>,
    kinds: Vec<Kind>,
    arity: Option<Cow<'static, str>>,
    split: Option<Cow<'static, str>>,
    label: Option<Cow<'static, str>>,
    help: Vec<Cow<'static, str>>,
    default: Option<Cow<'static, str>>,
    hidden: bool,
}

/// Declares one option.
#[derive(Clone, Default)]
pub struct OptionBuilder {
    names: Vec<Cow<'static, str>>,
    required: bool,
    special: Option<Special>,
    target: TargetBuilder,
}

/// Declares one positional parameter.
#[derive(Clone, Default)]
pub struct PositionBuilder {
    index: Option<Cow<'static, str>>,
    target: TargetBuilder,
}

impl Options {
    fn option(self, settings: &Settings) -> OptionBuilder {
        let (short, long, help, special) = match self {
            Options::Help => ("h", "help", "Show this help message and exit.", Special::Help),
            Options::Version => (
                "V",
                "version",
                "Print version information and exit.",
                Special::Version,
            ),
        };
        OptionBuilder {
            names: vec![
                Cow::Owned(format!("{}{short}", settings.short)),
                Cow::Owned(format!("{}{long}", settings.long)),
            ],
            required: false,
            special: Some(special),
            target: TargetBuilder {
                kinds: vec![Kind::Bool],
                help: vec![Cow::Borrowed(help)],
                ..TargetBuilder::default()
            },
        }
    }
}

impl default::Default for Settings {
    fn default() -> Self {
        Self {
            program: Cow::Borrowed(""),
            short: Cow::Borrowed("-"),
            long: Cow::Borrowed("--"),
            separator: Cow::Borrowed("="),
            allow_unmatched: false,
            allow_overwrite: false,
            resemblance: 90,
            width: 80,
            ansi: Ansi::Auto,
            scheme: Scheme::default(),
            sort_options: true,
            show_defaults: false,
        }
    }
}

impl default::Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            about: About::default(),
            settings: Settings::default(),
            converters: Vec::new(),
            builtins: Vec::new(),
            options: Vec::new(),
            positions: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Adds a name; the first one is the primary name and the others are aliases.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.about.version = Some(version.into());
        self
    }

    /// Adds a line above the synopsis. Lines may contain `@|style text|@` markup.
    pub fn header(mut self, line: impl Into<Cow<'static, str>>) -> Self {
        self.about.header.push(line.into());
        self
    }

    /// Replaces the generated synopsis.
    pub fn synopsis(mut self, synopsis: impl Into<Cow<'static, str>>) -> Self {
        self.about.synopsis = Some(synopsis.into());
        self
    }

    /// Adds a description line. The first line also summarizes this command in its parent's help.
    pub fn description(mut self, line: impl Into<Cow<'static, str>>) -> Self {
        self.about.description.push(line.into());
        self
    }

    pub fn footer(mut self, line: impl Into<Cow<'static, str>>) -> Self {
        self.about.footer.push(line.into());
        self
    }

    /// Sets the heading of a help section.
    pub fn heading(mut self, section: Section, heading: impl Into<Cow<'static, str>>) -> Self {
        self.about.headings.insert(section, heading.into());
        self
    }

    /// Sets the prefix of short option names. Sub-commands inherit the parser settings of the
    /// command they are built from.
    pub fn short(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.settings.short = prefix.into();
        self
    }

    pub fn long(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.settings.long = prefix.into();
        self
    }

    /// Sets the separator between an option name and an attached value.
    pub fn separator(mut self, separator: impl Into<Cow<'static, str>>) -> Self {
        self.settings.separator = separator.into();
        self
    }

    /// Collects unmatched arguments instead of failing on them.
    pub fn allow_unmatched(mut self, allow: bool) -> Self {
        self.settings.allow_unmatched = allow;
        self
    }

    /// Lets a repeated single-value option replace its previous value.
    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.settings.allow_overwrite = allow;
        self
    }

    /// Sets how closely, in percent, a token must resemble the option names to be reported as
    /// unmatched rather than taken as a positional parameter. `0` disables the check.
    pub fn resemblance(mut self, percent: u8) -> Self {
        self.settings.resemblance = percent;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.settings.width = width;
        self
    }

    /// Sets the help width to the width of the terminal, if there is one.
    pub fn terminal_width(mut self) -> Self {
        if let Some((width, _)) = term_size::dimensions() {
            self.settings.width = width;
        }
        self
    }

    pub fn ansi(mut self, ansi: Ansi) -> Self {
        self.settings.ansi = ansi;
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.settings.scheme = scheme;
        self
    }

    pub fn sort_options(mut self, sort: bool) -> Self {
        self.settings.sort_options = sort;
        self
    }

    pub fn show_defaults(mut self, show: bool) -> Self {
        self.settings.show_defaults = show;
        self
    }

    /// Registers a converter for `kind`, replacing any built-in one.
    pub fn register(mut self, kind: Kind, converter: impl Convert + 'static) -> Self {
        self.converters.push((kind, Arc::new(converter)));
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = Options>) -> Self {
        self.builtins.extend(options);
        self
    }

    pub fn option(mut self, build: impl FnOnce(OptionBuilder) -> OptionBuilder) -> Self {
        self.options.push(build(OptionBuilder::new()));
        self
    }

    pub fn position(mut self, build: impl FnOnce(PositionBuilder) -> PositionBuilder) -> Self {
        self.positions.push(build(PositionBuilder::new()));
        self
    }

    pub fn command(mut self, build: impl FnOnce(Builder) -> Builder) -> Self {
        self.commands.push(build(Builder::new()));
        self
    }

    /// Validates the schema and freezes it into a [`Parser`].
    pub fn build(self) -> Result<Parser, Error> {
        let mut settings = self.settings.clone();
        settings.program = self.names.first().cloned().unwrap_or_default();
        self.build_at(Path::new(), settings, &Registry::default())
    }

    fn build_at(
        self,
        path: Path,
        settings: Settings,
        registry: &Registry,
    ) -> Result<Parser, Error> {
        let mut registry = registry.clone();
        for (kind, converter) in self.converters {
            registry.share(kind, converter);
        }

        let mut keys = HashSet::new();
        let mut lookup = HashMap::new();
        let mut shorts = HashMap::new();
        let builtins = self.builtins.iter().map(|builtin| builtin.option(&settings));
        let declared: Vec<OptionBuilder> = self.options.into_iter().chain(builtins).collect();
        let mut options = Vec::with_capacity(declared.len());
        for (index, option) in declared.into_iter().enumerate() {
            if option.names.is_empty() {
                return Err(Error::MissingOptionName);
            }
            let names = option
                .names
                .iter()
                .map(|name| complete(name, &settings))
                .collect::<Result<Vec<_>, _>>()?;
            for name in names.iter() {
                match lookup.entry(name.clone()) {
                    Entry::Occupied(entry) => {
                        return Err(Error::DuplicateName(entry.key().clone()))
                    }
                    Entry::Vacant(entry) => entry.insert(index),
                };
                if let Some(letter) = letter(name, &settings) {
                    shorts.insert(letter, index);
                }
            }

            let key = match &option.target.key {
                Some(key) => key.clone(),
                None => Cow::Owned(strip(longest(&names), &settings).to_string()),
            };
            if !keys.insert(key.clone()) {
                return Err(Error::ConflictingKey(key));
            }
            let target = option.target.build(key, false, &registry)?;
            options.push(OptionDescriptor {
                names,
                required: option.required,
                special: option.special,
                target,
            });
        }

        let mut positions = Vec::with_capacity(self.positions.len());
        for (count, position) in self.positions.into_iter().enumerate() {
            // Without an explicit index, parameters follow each other in declaration order.
            let index = match &position.index {
                Some(index) => index.parse::<Range>(),
                None => match position.target.shape {
                    None | Some(Shape::Scalar) => Ok(Range::exact(count)),
                    Some(_) => Ok(Range::at_least(count)),
                },
            };
            let key = match (&position.target.key, &position.target.label, &index) {
                (Some(key), _, _) | (None, Some(key), _) => key.clone(),
                (None, None, Ok(index)) => Cow::Owned(index.to_string()),
                (None, None, Err(_)) => Cow::Owned(count.to_string()),
            };
            let index = index.map_err(|reason| Error::InvalidIndex(key.clone(), reason))?;
            if !keys.insert(key.clone()) {
                return Err(Error::ConflictingKey(key));
            }
            let target = position.target.build(key, true, &registry)?;
            positions.push(PositionDescriptor { index, target });
        }
        contiguous(&positions)?;

        let mut verbs = HashMap::new();
        let mut commands = Vec::with_capacity(self.commands.len());
        for (index, command) in self.commands.into_iter().enumerate() {
            let Some(name) = command.names.first().cloned() else {
                return Err(Error::MissingCommandName);
            };
            for name in command.names.iter() {
                if verbs.insert(name.clone(), index).is_some() {
                    return Err(Error::DuplicateName(name.clone()));
                }
            }
            let mut path = path.clone();
            path.push(name);
            commands.push(command.build_at(path, settings.clone(), &registry)?);
        }

        debug!(
            command = self.names.first().map_or("", |name| name.as_ref()),
            options = options.len(),
            positions = positions.len(),
            commands = commands.len(),
            "built command"
        );
        Ok(Parser {
            names: self.names,
            path,
            about: self.about,
            settings,
            options,
            positions,
            commands,
            lookup,
            shorts,
            verbs,
        })
    }
}

macro_rules! target {
    ($type: ty) => {
        impl $type {
            /// Sets the key under which the value is stored.
            pub fn key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
                self.target.key = Some(key.into());
                self
            }

            /// Sets the element type.
            pub fn kind(mut self, kind: Kind) -> Self {
                self.target.kinds = vec![kind];
                self
            }

            /// Holds a boolean.
            pub fn flag(self) -> Self {
                self.kind(Kind::Bool)
            }

            /// Holds a list that is extended in place.
            pub fn many(mut self) -> Self {
                self.target.shape = Some(Shape::Collection);
                self
            }

            /// Holds a list that is copied and extended every time it receives values.
            pub fn array(mut self) -> Self {
                self.target.shape = Some(Shape::Array);
                self
            }

            /// Holds `KEY=VALUE` pairs.
            pub fn map(mut self, key: Kind, value: Kind) -> Self {
                self.target.shape = Some(Shape::Map);
                self.target.kinds = vec![key, value];
                self
            }

            /// Sets the number of tokens consumed per occurrence, such as `"1"`, `"0..1"` or `"2..*"`.
            pub fn arity(mut self, arity: impl Into<Cow<'static, str>>) -> Self {
                self.target.arity = Some(arity.into());
                self
            }

            /// Splits every token with a regular expression before conversion.
            pub fn split(mut self, pattern: impl Into<Cow<'static, str>>) -> Self {
                self.target.split = Some(pattern.into());
                self
            }

            pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
                self.target.label = Some(label.into());
                self
            }

            /// Adds a description line; lines may contain `@|style text|@` markup.
            pub fn help(mut self, line: impl Into<Cow<'static, str>>) -> Self {
                self.target.help.push(line.into());
                self
            }

            /// Sets the default value, converted when the parser is built.
            pub fn default<T: Display>(mut self, default: T) -> Self {
                self.target.default = Some(Cow::Owned(default.to_string()));
                self
            }

            pub fn hide(mut self) -> Self {
                self.target.hidden = true;
                self
            }
        }
    };
}

target!(OptionBuilder);
target!(PositionBuilder);

impl OptionBuilder {
    /// An empty option; `default` is taken by the default-value setter.
    pub fn new() -> Self {
        <Self as default::Default>::default()
    }

    /// Adds a name. A name without a prefix gets the short prefix when it is one character long
    /// and the long prefix otherwise.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn require(mut self) -> Self {
        self.required = true;
        self
    }
}

impl PositionBuilder {
    pub fn new() -> Self {
        <Self as default::Default>::default()
    }

    /// Sets the positions this parameter claims, such as `"0"`, `"1..2"` or `"1..*"`.
    pub fn index(mut self, index: impl Into<Cow<'static, str>>) -> Self {
        self.index = Some(index.into());
        self
    }
}

impl TargetBuilder {
    fn build(self, key: Cow<'static, str>, positional: bool, registry: &Registry) -> Result<Target, Error> {
        let shape = self.shape.unwrap_or(Shape::Scalar);
        let mut kinds = self.kinds;
        if kinds.is_empty() {
            kinds.push(Kind::String);
        }
        if shape == Shape::Map && kinds.len() < 2 {
            kinds.push(Kind::String);
        }
        let converters = kinds
            .iter()
            .map(|kind| {
                registry
                    .get(kind)
                    .ok_or_else(|| Error::MissingConverter(key.clone(), Cow::Owned(kind.to_string())))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let flag = shape == Shape::Scalar && kinds[0] == Kind::Bool;
        let arity = match &self.arity {
            Some(arity) => arity
                .parse::<Range>()
                .map_err(|reason| Error::InvalidArity(key.clone(), reason))?,
            None => Range::default_arity(&shape, flag, positional),
        };
        let split = self
            .split
            .map(|pattern| Regex::new(&pattern).map_err(|error| Error::InvalidPattern(key.clone(), error)))
            .transpose()?;

        let mut target = Target {
            label: self.label.unwrap_or_else(|| key.clone()),
            key,
            shape,
            kinds,
            converters,
            arity,
            split,
            help: self.help,
            default: None,
            hidden: self.hidden,
        };
        if let Some(default) = self.default {
            target.default = Some(target.convert_default(&default)?);
        }
        Ok(target)
    }
}

impl Target {
    fn convert_default(&self, default: &str) -> Result<Value, Error> {
        let invalid = |reason: Cow<'static, str>| {
            Error::InvalidDefault(self.key.clone(), Cow::Owned(default.to_string()), reason)
        };
        let values = bind::values(self, &[default], &self.key, &Path::new()).map_err(|error| match error {
            Error::FailedToConvert { reason, .. } => invalid(reason),
            error => invalid(Cow::Owned(error.to_string())),
        })?;
        match self.shape {
            Shape::Scalar => {
                let mut values = values.into_iter();
                match (values.next(), values.next()) {
                    (Some(value), None) => Ok(value),
                    _ => Err(invalid(Cow::Borrowed("only one value is allowed"))),
                }
            }
            Shape::Array | Shape::Collection => Ok(Value::List(values)),
            Shape::Map => Ok(Value::Map(
                values
                    .into_iter()
                    .flat_map(|value| match value {
                        Value::Map(pairs) => pairs,
                        _ => Vec::new(),
                    })
                    .collect(),
            )),
        }
    }
}

/// Adds the missing prefix to an option name and validates it.
fn complete(name: &str, settings: &Settings) -> Result<Cow<'static, str>, Error> {
    let invalid = name.trim().is_empty()
        || name.chars().any(char::is_whitespace)
        || (!settings.separator.is_empty() && name.contains(settings.separator.as_ref()))
        || name == settings.short
        || name == settings.long;
    if invalid {
        return Err(Error::InvalidOptionName(Cow::Owned(name.to_string())));
    }
    if name.starts_with(settings.short.as_ref()) || name.starts_with(settings.long.as_ref()) {
        Ok(Cow::Owned(name.to_string()))
    } else if name.chars().count() == 1 {
        Ok(Cow::Owned(format!("{}{name}", settings.short)))
    } else {
        Ok(Cow::Owned(format!("{}{name}", settings.long)))
    }
}

/// The letter of a short name that can appear in a cluster.
pub(crate) fn letter(name: &str, settings: &Settings) -> Option<char> {
    if settings.long.len() > settings.short.len() && name.starts_with(settings.long.as_ref()) {
        return None;
    }
    let mut letters = name.strip_prefix(settings.short.as_ref())?.chars();
    match (letters.next(), letters.next()) {
        (Some(letter), None) => Some(letter),
        _ => None,
    }
}

fn longest<'a>(names: &'a [Cow<'static, str>]) -> &'a str {
    names
        .iter()
        .fold("", |longest, name| {
            if name.chars().count() > longest.chars().count() {
                name
            } else {
                longest
            }
        })
}

pub(crate) fn strip<'a>(name: &'a str, settings: &Settings) -> &'a str {
    name.strip_prefix(settings.long.as_ref())
        .or_else(|| name.strip_prefix(settings.short.as_ref()))
        .unwrap_or(name)
}

/// Positional indices must cover every position from 0 without holes; overlaps are allowed.
fn contiguous(positions: &[PositionDescriptor]) -> Result<(), Error> {
    let mut indices: Vec<Range> = positions.iter().map(|position| position.index).collect();
    indices.sort_by_key(|index| (index.min(), index.max()));
    let mut next = 0;
    for index in indices {
        if index.min() > next {
            return Err(Error::PositionGap(next));
        }
        if index.is_unbounded() {
            return Ok(());
        }
        next = next.max(index.max() + 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_names_with_prefixes() {
        let settings = Settings::default();
        assert_eq!(complete("v", &settings).unwrap(), "-v");
        assert_eq!(complete("verbose", &settings).unwrap(), "--verbose");
        assert_eq!(complete("-x", &settings).unwrap(), "-x");
        assert_eq!(complete("--long", &settings).unwrap(), "--long");
        assert!(complete("a b", &settings).is_err());
        assert!(complete("a=b", &settings).is_err());
        assert!(complete("", &settings).is_err());
        assert!(complete("--", &settings).is_err());
    }

    #[test]
    fn only_single_letters_cluster() {
        let settings = Settings::default();
        assert_eq!(letter("-v", &settings), Some('v'));
        assert_eq!(letter("--v", &settings), None);
        assert_eq!(letter("-vv", &settings), None);
        let settings = Settings {
            short: "/".into(),
            long: "/".into(),
            ..Settings::default()
        };
        assert_eq!(letter("/v", &settings), Some('v'));
    }

    #[test]
    fn keys_default_to_longest_name() {
        let parser = Builder::new()
            .option(|option| option.name("o").name("output"))
            .option(|option| option.name("x"))
            .build()
            .unwrap();
        assert_eq!(parser.options()[0].target().key(), "output");
        assert_eq!(parser.options()[1].target().key(), "x");
        assert_eq!(parser.options()[0].target().label(), "output");
    }

    #[test]
    fn default_arities() {
        let parser = Builder::new()
            .option(|option| option.name("v").flag())
            .option(|option| option.name("o"))
            .option(|option| option.name("i").many())
            .position(|position| position.key("first").index("0"))
            .position(|position| position.key("rest").index("1..*").many())
            .build()
            .unwrap();
        let arities: Vec<_> = parser
            .options()
            .iter()
            .map(|option| option.target().arity())
            .collect();
        assert_eq!(arities, [Range::exact(0), Range::exact(1), Range::exact(1)]);
        assert_eq!(parser.positions()[0].target().arity(), Range::exact(1));
        assert_eq!(parser.positions()[1].target().arity(), Range::new(0, 1));
    }

    #[test]
    fn positions_default_to_declaration_order() {
        let parser = Builder::new()
            .position(|position| position.key("source"))
            .position(|position| position.key("target"))
            .position(|position| position.key("rest").many())
            .build()
            .unwrap();
        let indices: Vec<_> = parser.positions().iter().map(|position| position.index()).collect();
        assert_eq!(indices, [Range::exact(0), Range::exact(1), Range::at_least(2)]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = Builder::new()
            .option(|option| option.name("v"))
            .option(|option| option.name("-v").key("other"))
            .build();
        assert!(matches!(result, Err(Error::DuplicateName(name)) if name == "-v"));
    }

    #[test]
    fn rejects_conflicting_keys() {
        let result = Builder::new()
            .option(|option| option.name("a").key("same"))
            .position(|position| position.key("same"))
            .build();
        assert!(matches!(result, Err(Error::ConflictingKey(key)) if key == "same"));
    }

    #[test]
    fn rejects_position_gaps() {
        let result = Builder::new()
            .position(|position| position.key("a").index("0"))
            .position(|position| position.key("b").index("2"))
            .build();
        assert!(matches!(result, Err(Error::PositionGap(1))));
        let result = Builder::new()
            .position(|position| position.key("a").index("0..2"))
            .position(|position| position.key("b").index("1..*"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_invalid_schemas() {
        assert!(matches!(
            Builder::new().option(|option| option.key("x")).build(),
            Err(Error::MissingOptionName)
        ));
        assert!(matches!(
            Builder::new().command(|command| command).build(),
            Err(Error::MissingCommandName)
        ));
        assert!(matches!(
            Builder::new().option(|option| option.name("n").arity("x..2")).build(),
            Err(Error::InvalidArity(..))
        ));
        assert!(matches!(
            Builder::new().option(|option| option.name("n").split("(")).build(),
            Err(Error::InvalidPattern(..))
        ));
        assert!(matches!(
            Builder::new()
                .option(|option| option.name("n").kind(Kind::Custom("color".into())))
                .build(),
            Err(Error::MissingConverter(..))
        ));
        assert!(matches!(
            Builder::new()
                .option(|option| option.name("n").kind(Kind::Integer).default("many"))
                .build(),
            Err(Error::InvalidDefault(..))
        ));
        assert!(matches!(
            Builder::new().position(|position| position.key("p").index("one")).build(),
            Err(Error::InvalidIndex(..))
        ));
    }

    #[test]
    fn builders_compose_outside_a_command() {
        let option = OptionBuilder::new().name("n").kind(Kind::Natural).default(2);
        let position = PositionBuilder::new().key("file").default("-");
        let parser = Builder::new()
            .option(|_| option)
            .position(|_| position)
            .build()
            .unwrap();
        assert_eq!(parser.options()[0].target().default(), Some(&Value::Natural(2)));
        assert_eq!(
            parser.positions()[0].target().default(),
            Some(&Value::String("-".into()))
        );
    }

    #[test]
    fn converts_defaults() {
        let parser = Builder::new()
            .option(|option| option.name("n").kind(Kind::Natural).default(3))
            .option(|option| option.name("l").many().split(",").default("a,b"))
            .build()
            .unwrap();
        assert_eq!(parser.options()[0].target().default(), Some(&Value::Natural(3)));
        assert_eq!(
            parser.options()[1].target().default(),
            Some(&Value::List(vec![
                Value::String("a".into()),
                Value::String("b".into())
            ]))
        );
    }

    #[test]
    fn sub_commands_inherit_settings_and_converters() {
        let parser = Builder::new()
            .short("+")
            .register(Kind::Custom("even".into()), |value: &str| {
                match value.parse::<u64>() {
                    Ok(value) if value % 2 == 0 => Ok(Value::Natural(value)),
                    _ => Err("not even"),
                }
            })
            .command(|command| {
                command
                    .name("pick")
                    .option(|option| option.name("n").kind(Kind::Custom("even".into())))
            })
            .build()
            .unwrap();
        let pick = parser.command("pick").unwrap();
        assert_eq!(pick.path(), ["pick"]);
        assert_eq!(pick.options()[0].names(), ["+n"]);
    }
}
