use crate::{
    bind::{unquote, Binder},
    convert::{FromValue, Kind, Value},
    descriptor::{OptionDescriptor, PositionDescriptor, Shape, Slot, Special, Target},
    error::{Error, Path},
    help::{Help, Section},
    range::Range,
    spell::Spell,
    style::{Ansi, Scheme},
};
use core::any::Any;
use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    env,
};
use tracing::{debug, trace};

/// The token that turns every following token into a positional parameter.
pub const END: &str = "--";

/// Parser settings. Sub-commands inherit the settings of their parent.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    /// The root command's name; empty when the root is unnamed.
    pub program: Cow<'static, str>,
    pub short: Cow<'static, str>,
    pub long: Cow<'static, str>,
    pub separator: Cow<'static, str>,
    pub allow_unmatched: bool,
    pub allow_overwrite: bool,
    pub resemblance: u8,
    pub width: usize,
    pub ansi: Ansi,
    pub scheme: Scheme,
    pub sort_options: bool,
    pub show_defaults: bool,
}

/// The texts shown in the usage help of one command.
#[derive(Clone, Debug, Default)]
pub(crate) struct About {
    pub version: Option<Cow<'static, str>>,
    pub header: Vec<Cow<'static, str>>,
    pub synopsis: Option<Cow<'static, str>>,
    pub description: Vec<Cow<'static, str>>,
    pub footer: Vec<Cow<'static, str>>,
    pub headings: HashMap<Section, Cow<'static, str>>,
}

/// A validated command schema. Immutable once built; it can be shared between threads and parse
/// any number of argument lists concurrently.
pub struct Parser {
    pub(crate) names: Vec<Cow<'static, str>>,
    pub(crate) path: Path,
    pub(crate) about: About,
    pub(crate) settings: Settings,
    pub(crate) options: Vec<OptionDescriptor>,
    pub(crate) positions: Vec<PositionDescriptor>,
    pub(crate) commands: Vec<Parser>,
    pub(crate) lookup: HashMap<Cow<'static, str>, usize>,
    pub(crate) shorts: HashMap<char, usize>,
    pub(crate) verbs: HashMap<Cow<'static, str>, usize>,
}

/// The values of one command level.
#[derive(Clone, Debug)]
pub struct Parsed {
    path: Path,
    values: HashMap<Cow<'static, str>, Value>,
    matched: HashSet<Cow<'static, str>>,
    unmatched: Vec<String>,
    help: bool,
    version: bool,
}

/// A cursor over the argument list with a push-back stack. Cloning it is cheap, which allows
/// positional candidates to be tried without touching the real stream.
#[derive(Clone, Debug)]
pub(crate) struct Tokens<'a> {
    arguments: &'a [String],
    next: usize,
    pushed: Vec<Cow<'a, str>>,
}

struct Session<'p> {
    parser: &'p Parser,
    binder: Binder<'p>,
    required: Vec<Slot>,
    present: HashSet<Slot>,
    position: usize,
    unmatched: Vec<String>,
    help: bool,
    version: bool,
}

impl Parser {
    /// Parses the arguments of the current process, skipping the program name.
    pub fn parse(&self) -> Result<Vec<Parsed>, Error> {
        self.parse_with(env::args().skip(1))
    }

    /// Parses `arguments` and returns one [`Parsed`] per command level, the root first.
    pub fn parse_with<I: IntoIterator>(&self, arguments: I) -> Result<Vec<Parsed>, Error>
    where
        I::Item: Into<String>,
    {
        let arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        debug!(command = self.name(), count = arguments.len(), "parsing");
        let mut tokens = Tokens::new(&arguments);
        let mut results = Vec::new();
        Session::new(self).run(&mut tokens, &mut results)?;
        Ok(results)
    }

    /// The primary name of this command; empty for an unnamed root.
    pub fn name(&self) -> &str {
        self.names.first().map_or("", |name| name.as_ref())
    }

    pub fn names(&self) -> &[Cow<'static, str>] {
        &self.names
    }

    /// The sub-command names leading to this command.
    pub fn path(&self) -> &[Cow<'static, str>] {
        &self.path
    }

    pub fn version(&self) -> Option<&str> {
        self.about.version.as_deref()
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn positions(&self) -> &[PositionDescriptor] {
        &self.positions
    }

    pub fn commands(&self) -> &[Parser] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&Parser> {
        self.verbs.get(name).map(|&index| &self.commands[index])
    }

    /// Resolves a sub-command by its path from this command.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&Parser> {
        path.iter()
            .try_fold(self, |parser, name| parser.command(name.as_ref()))
    }

    /// Renders the usage help of this command.
    pub fn help(&self) -> String {
        Help::new(self).render()
    }

    /// Renders the usage help of the command that raised `error`.
    pub fn help_for(&self, error: &Error) -> String {
        self.find(error.path()).unwrap_or(self).help()
    }

    /// Finds the option named by the part of `token` before the separator.
    fn attached<'t>(&self, token: &'t str) -> Option<(usize, &'t str)> {
        let separator = self.settings.separator.as_ref();
        if separator.is_empty() {
            return None;
        }
        let at = token.find(separator).filter(|&at| at > 0)?;
        let index = *self.lookup.get(&token[..at])?;
        Some((index, &token[at + separator.len()..]))
    }

    fn is_cluster(&self, token: &str) -> bool {
        let short = self.settings.short.as_ref();
        token.starts_with(short) && token.chars().count() > short.chars().count() + 1
    }

    /// Whether `token` would be consumed as an option rather than as a value.
    pub(crate) fn is_option(&self, token: &str) -> bool {
        if token == END || self.lookup.contains_key(token) || self.attached(token).is_some() {
            return true;
        }
        self.is_cluster(token)
            && token[self.settings.short.len()..]
                .chars()
                .next()
                .is_some_and(|letter| self.shorts.contains_key(&letter))
    }

    /// Whether `token` looks enough like the declared option names to be reported as unmatched
    /// instead of being taken as a positional parameter.
    pub(crate) fn resembles(&self, token: &str) -> bool {
        let percent = usize::from(self.settings.resemblance);
        if percent == 0 || token.chars().count() <= 1 {
            return false;
        }
        if self.lookup.is_empty() {
            return token.starts_with(self.settings.short.as_ref());
        }
        let count: usize = self
            .lookup
            .keys()
            .map(|name| {
                name.chars()
                    .zip(token.chars())
                    .take_while(|(left, right)| left == right)
                    .count()
            })
            .sum();
        count > 0 && count * 100 >= self.lookup.len() * percent
    }

    fn known(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .flat_map(|option| option.names.iter())
            .chain(self.commands.iter().flat_map(|command| command.names.iter()))
            .map(|name| name.as_ref())
    }
}

impl Parsed {
    /// The sub-command names leading to this level; empty for the root.
    pub fn path(&self) -> &[Cow<'static, str>] {
        &self.path
    }

    /// The value bound to `key`, or its default.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.value(key).and_then(T::from_value)
    }

    /// Downcasts a value produced by a custom converter.
    pub fn custom<T: Any>(&self, key: &str) -> Option<&T> {
        match self.value(key)? {
            Value::Custom(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Whether the descriptor with `key` appeared on the command line.
    pub fn contains(&self, key: &str) -> bool {
        self.matched.contains(key)
    }

    /// The tokens that matched nothing, when unmatched arguments are allowed.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub fn help_requested(&self) -> bool {
        self.help
    }

    pub fn version_requested(&self) -> bool {
        self.version
    }
}

impl<'a> Tokens<'a> {
    pub fn new(arguments: &'a [String]) -> Self {
        Self {
            arguments,
            next: 0,
            pushed: Vec::new(),
        }
    }

    pub fn pop(&mut self) -> Option<Cow<'a, str>> {
        if let Some(token) = self.pushed.pop() {
            return Some(token);
        }
        let token = self.arguments.get(self.next)?;
        self.next += 1;
        Some(Cow::Borrowed(token))
    }

    pub fn peek(&self) -> Option<&str> {
        match self.pushed.last() {
            Some(token) => Some(token),
            None => self.arguments.get(self.next).map(String::as_str),
        }
    }

    pub fn push(&mut self, token: Cow<'a, str>) {
        self.pushed.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.pushed.is_empty() && self.next >= self.arguments.len()
    }
}

impl<'p> Session<'p> {
    fn new(parser: &'p Parser) -> Self {
        let options = parser
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.required)
            .map(|(index, _)| Slot::Option(index));
        let positions = parser
            .positions
            .iter()
            .enumerate()
            .filter(|(_, position)| position.target.arity.min() > 0)
            .map(|(index, _)| Slot::Position(index));
        Self {
            parser,
            binder: Binder::new(
                &parser.path,
                parser.settings.allow_overwrite,
                parser.options.len(),
                parser.positions.len(),
            ),
            required: options.chain(positions).collect(),
            present: HashSet::new(),
            position: 0,
            unmatched: Vec::new(),
            help: false,
            version: false,
        }
    }

    fn run(mut self, tokens: &mut Tokens<'_>, results: &mut Vec<Parsed>) -> Result<(), Error> {
        let parser = self.parser;
        while let Some(token) = tokens.pop() {
            if token == END {
                trace!("end of options");
                while !tokens.is_empty() {
                    self.positional(tokens, true)?;
                }
                break;
            }

            if let Some(command) = parser.command(&token) {
                debug!(command = %token, "descending into sub-command");
                self.check()?;
                results.push(self.finish());
                return Session::new(command).run(tokens, results);
            }

            if let Some(&index) = parser.lookup.get(token.as_ref()) {
                self.option(index, None, tokens)?;
            } else if let Some((index, value)) = parser.attached(&token) {
                let value = Cow::Owned(value.to_string());
                self.option(index, Some(value), tokens)?;
            } else if parser.is_cluster(&token) {
                self.cluster(&token, tokens)?;
            } else {
                self.classify(token, tokens)?;
            }
        }
        self.check()?;
        results.push(self.finish());
        Ok(())
    }

    fn check(&self) -> Result<(), Error> {
        if self.help || self.version || self.required.is_empty() {
            return Ok(());
        }
        let names = self
            .required
            .iter()
            .map(|&slot| match slot {
                Slot::Option(index) => Cow::Owned(self.parser.options[index].name().to_string()),
                Slot::Position(index) => Cow::Owned(self.parser.positions[index].name()),
            })
            .collect();
        Err(Error::MissingParameter(self.parser.path.clone(), names))
    }

    fn matched(&mut self, slot: Slot, special: Option<Special>) {
        self.required.retain(|&required| required != slot);
        self.present.insert(slot);
        match special {
            Some(Special::Help) => self.help = true,
            Some(Special::Version) => self.version = true,
            None => {}
        }
    }

    fn option<'a>(
        &mut self,
        index: usize,
        attached: Option<Cow<'a, str>>,
        tokens: &mut Tokens<'a>,
    ) -> Result<usize, Error> {
        let parser = self.parser;
        let option = &parser.options[index];
        let mut arity = option.target.arity;
        if let Some(value) = attached {
            arity = self.attach(option, &value, option.name(), arity)?;
            tokens.push(value);
        }
        trace!(option = option.name(), %arity, "found option");
        self.matched(Slot::Option(index), option.special);
        self.apply(Slot::Option(index), &option.target, option.name(), arity, tokens)
    }

    /// An attached value demands at least one value.
    fn attach(
        &self,
        option: &OptionDescriptor,
        value: &str,
        name: &str,
        arity: Range,
    ) -> Result<Range, Error> {
        if arity.max() == 0 && !option.target.is_flag() {
            return Err(Error::MaxValuesExceeded(
                self.parser.path.clone(),
                Cow::Owned(name.to_string()),
                Cow::Owned(format!("should be specified without '{value}' parameter")),
            ));
        }
        Ok(arity.with_min(arity.min().max(1)))
    }

    /// Splits a cluster of short options such as `-abc`, `-ofile` or `-o=file`.
    fn cluster<'a>(&mut self, token: &str, tokens: &mut Tokens<'a>) -> Result<(), Error> {
        let parser = self.parser;
        let short = parser.settings.short.as_ref();
        let separator = parser.settings.separator.as_ref();
        let mut cluster = token[short.len()..].to_string();
        loop {
            let Some(letter) = cluster.chars().next() else {
                return Ok(());
            };
            let Some(&index) = parser.shorts.get(&letter) else {
                trace!(rest = %cluster, "cluster is not an option");
                return self.classify(Cow::Owned(format!("{short}{cluster}")), tokens);
            };
            cluster.replace_range(..letter.len_utf8(), "");

            let option = &parser.options[index];
            let slot = Slot::Option(index);
            let name = format!("{short}{letter}");
            let mut arity = option.target.arity;
            let attached = !separator.is_empty() && cluster.starts_with(separator);
            if attached {
                cluster.replace_range(..separator.len(), "");
                arity = self.attach(option, &cluster, &name, arity)?;
            }
            trace!(option = %name, %arity, "found clustered option");
            self.matched(slot, option.special);

            if attached || (!cluster.is_empty() && arity.min() > 0) {
                tokens.push(Cow::Owned(cluster));
                self.apply(slot, &option.target, &name, arity, tokens)?;
                return Ok(());
            }
            if cluster.is_empty() || arity.max() == 0 {
                self.apply(slot, &option.target, &name, arity, tokens)?;
                if cluster.is_empty() {
                    return Ok(());
                }
                continue;
            }

            // The rest is either an optional value or more options.
            tokens.push(Cow::Owned(cluster));
            if self.apply(slot, &option.target, &name, arity, tokens)? > 0 {
                return Ok(());
            }
            cluster = match tokens.pop() {
                Some(rest) => rest.into_owned(),
                None => return Ok(()),
            };
        }
    }

    /// Reports `token` as unmatched if it resembles an option, otherwise offers it to the
    /// positional parameters.
    fn classify<'a>(&mut self, token: Cow<'a, str>, tokens: &mut Tokens<'a>) -> Result<(), Error> {
        if self.parser.resembles(&token) && !self.numeric(&token) {
            debug!(token = %token, "argument resembles an option");
            return self.unmatched(token);
        }
        tokens.push(token);
        self.positional(tokens, false)
    }

    /// Whether a numeric positional parameter at the cursor accepts `token`, as with negative
    /// numbers.
    fn numeric(&self, token: &str) -> bool {
        self.parser
            .positions
            .iter()
            .filter(|position| position.index.contains(self.position))
            .any(|position| {
                let target = &position.target;
                matches!(
                    target.kinds.first(),
                    Some(Kind::Integer | Kind::Natural | Kind::Float)
                ) && target
                    .converters
                    .first()
                    .is_some_and(|converter| converter.convert(unquote(token)).is_ok())
            })
    }

    fn unmatched(&mut self, token: Cow<'_, str>) -> Result<(), Error> {
        if self.parser.settings.allow_unmatched {
            debug!(token = %token, "collecting unmatched argument");
            self.unmatched.push(token.into_owned());
            return Ok(());
        }
        let suggestions = Spell::new()
            .suggest(&token, self.parser.known(), Spell::threshold(&token))
            .into_iter()
            .map(|name| Cow::Owned(name.to_string()))
            .collect();
        Err(Error::UnmatchedArgument(
            self.parser.path.clone(),
            Cow::Owned(token.into_owned()),
            suggestions,
        ))
    }

    /// Offers the next tokens to every positional parameter whose index covers the cursor and
    /// commits the one that consumes the most. Before the end-of-options marker, optional values
    /// stop at the next option or sub-command.
    fn positional<'a>(&mut self, tokens: &mut Tokens<'a>, ended: bool) -> Result<(), Error> {
        let parser = self.parser;
        let mut best: Option<(usize, Vec<Cow<'a, str>>, Tokens<'a>)> = None;
        let mut failure = None;
        for (index, position) in parser.positions.iter().enumerate() {
            if !position.index.contains(self.position) {
                continue;
            }
            let mut attempt = tokens.clone();
            let target = &position.target;
            match self.gather(target, &position.name(), target.arity, !ended, &mut attempt) {
                Ok(raw) if best.as_ref().map_or(true, |best| raw.len() > best.1.len()) => {
                    best = Some((index, raw, attempt))
                }
                Ok(_) => {}
                Err(error) => {
                    failure.get_or_insert(error);
                }
            }
        }

        match (best, failure) {
            (Some((index, raw, attempt)), _) if !raw.is_empty() => {
                let position = &parser.positions[index];
                let name = position.name();
                debug!(parameter = %name, at = self.position, count = raw.len(), "assigning positional parameter");
                self.binder.apply(Slot::Position(index), &position.target, &name, &raw)?;
                self.matched(Slot::Position(index), None);
                self.position += raw.len();
                *tokens = attempt;
                Ok(())
            }
            (None, Some(error)) => Err(error),
            _ => match tokens.pop() {
                Some(token) => self.unmatched(token),
                None => Ok(()),
            },
        }
    }

    /// Binds the tokens one occurrence of a descriptor consumes and returns how many there were.
    fn apply<'a>(
        &mut self,
        slot: Slot,
        target: &Target,
        name: &str,
        arity: Range,
        tokens: &mut Tokens<'a>,
    ) -> Result<usize, Error> {
        if target.is_flag() && arity.min() == 0 {
            let explicit = arity.max() > 0
                && tokens.peek().map(unquote).is_some_and(|token| {
                    token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("false")
                });
            if let Some(token) = explicit.then(|| tokens.pop()).flatten() {
                self.binder.apply(slot, target, name, &[token])?;
                return Ok(1);
            }
            self.binder.toggle(slot, target, name)?;
            return Ok(0);
        }

        let raw = self.gather(target, name, arity, true, tokens)?;
        if raw.is_empty() {
            trace!(name, "no value given");
            return Ok(0);
        }
        self.binder.apply(slot, target, name, &raw)?;
        Ok(raw.len())
    }

    /// Pops the tokens that satisfy `arity`. With `stop`, optional values end at the next option or
    /// sub-command.
    fn gather<'a>(
        &self,
        target: &Target,
        name: &str,
        arity: Range,
        stop: bool,
        tokens: &mut Tokens<'a>,
    ) -> Result<Vec<Cow<'a, str>>, Error> {
        let arity = match target.shape {
            Shape::Scalar => arity.with_max(arity.max().min(arity.min().max(1))),
            _ => arity,
        };
        let mut raw = Vec::new();
        while raw.len() < arity.min() {
            match tokens.pop() {
                Some(token) => raw.push(token),
                None => {
                    return Err(Error::MissingOptionValue(
                        self.parser.path.clone(),
                        Cow::Owned(name.to_string()),
                        arity,
                        raw.len(),
                    ))
                }
            }
        }
        while raw.len() < arity.max() {
            let Some(next) = tokens.peek() else {
                break;
            };
            if stop && (self.parser.command(next).is_some() || self.parser.is_option(next)) {
                trace!(token = next, "stopping at option");
                break;
            }
            match tokens.pop() {
                Some(token) => raw.push(token),
                None => break,
            }
        }
        Ok(raw)
    }

    fn finish(self) -> Parsed {
        let parser = self.parser;
        let targets = parser
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| (Slot::Option(index), &option.target))
            .chain(
                parser
                    .positions
                    .iter()
                    .enumerate()
                    .map(|(index, position)| (Slot::Position(index), &position.target)),
            );
        let mut values = HashMap::new();
        let mut matched = HashSet::new();
        for ((slot, target), value) in targets.zip(self.binder.finish()) {
            if self.present.contains(&slot) {
                matched.insert(target.key.clone());
            }
            let value = value
                .or_else(|| target.default.clone())
                .or_else(|| target.is_flag().then_some(Value::Bool(false)));
            if let Some(value) = value {
                values.insert(target.key.clone(), value);
            }
        }
        Parsed {
            path: parser.path.clone(),
            values,
            matched,
            unmatched: self.unmatched,
            help: self.help,
            version: self.version,
        }
    }
}
