use crate::range::Range;
use core::fmt;
use std::{borrow::Cow, error, mem::replace};

pub type Path = Vec<Cow<'static, str>>;

#[derive(Clone, PartialEq)]
pub enum Error {
    MissingParameter(Path, Vec<Cow<'static, str>>),
    MissingOptionValue(Path, Cow<'static, str>, Range, usize),
    UnmatchedArgument(Path, Cow<'static, str>, Vec<Cow<'static, str>>),
    OverwrittenOption(Path, Cow<'static, str>),
    MaxValuesExceeded(Path, Cow<'static, str>, Cow<'static, str>),
    FailedToConvert {
        path: Path,
        name: Cow<'static, str>,
        index: usize,
        value: Cow<'static, str>,
        type_name: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    DuplicateName(Cow<'static, str>),
    ConflictingKey(Cow<'static, str>),
    PositionGap(usize),
    MissingCommandName,
    MissingOptionName,
    InvalidOptionName(Cow<'static, str>),
    InvalidArity(Cow<'static, str>, String),
    InvalidIndex(Cow<'static, str>, String),
    InvalidPattern(Cow<'static, str>, regex::Error),
    MissingConverter(Cow<'static, str>, Cow<'static, str>),
    InvalidDefault(Cow<'static, str>, Cow<'static, str>, Cow<'static, str>),
}

impl Error {
    /// The command names leading to the level that failed; empty for schema errors.
    pub fn path(&self) -> &[Cow<'static, str>] {
        match self {
            Error::MissingParameter(path, ..)
            | Error::MissingOptionValue(path, ..)
            | Error::UnmatchedArgument(path, ..)
            | Error::OverwrittenOption(path, ..)
            | Error::MaxValuesExceeded(path, ..)
            | Error::FailedToConvert { path, .. } => path,
            _ => &[],
        }
    }

    /// Whether this error was raised while building a schema rather than while parsing.
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName(_)
                | Error::ConflictingKey(_)
                | Error::PositionGap(_)
                | Error::MissingCommandName
                | Error::MissingOptionName
                | Error::InvalidOptionName(_)
                | Error::InvalidArity(..)
                | Error::InvalidIndex(..)
                | Error::InvalidPattern(..)
                | Error::MissingConverter(..)
                | Error::InvalidDefault(..)
        )
    }
}

impl error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingParameter(path, names) => {
                write!(f, "Missing required ")?;
                write!(f, "{}", if names.len() > 1 { "parameters" } else { "parameter" })?;
                write_join(f, " ", "", ", ", names.iter().map(|name| format!("'{name}'")))?;
                write_join(f, " for command '", "'", " ", path)?;
                write!(f, ".")?;
            }
            Error::MissingOptionValue(path, name, arity, found) => {
                write!(f, "Missing value for '{name}'")?;
                write_join(f, " of command '", "'", " ", path)?;
                write!(f, ": expected {arity} but found {found}.")?;
            }
            Error::UnmatchedArgument(path, argument, suggestions) => {
                write!(f, "Unmatched argument '{argument}'")?;
                write_join(f, " for command '", "'", " ", path)?;
                write!(f, ".")?;
                let suggestions = suggestions.iter().map(|suggestion| format!("'{suggestion}'"));
                write_join(f, " Similar matches: ", ".", ", ", suggestions)?;
            }
            Error::OverwrittenOption(path, name) => {
                write!(f, "Option '{name}'")?;
                write_join(f, " of command '", "'", " ", path)?;
                write!(f, " should be specified only once.")?;
            }
            Error::MaxValuesExceeded(path, name, detail) => {
                write!(f, "Too many values for '{name}'")?;
                write_join(f, " of command '", "'", " ", path)?;
                write!(f, ": {detail}.")?;
            }
            Error::FailedToConvert {
                path,
                name,
                index,
                value,
                type_name,
                reason,
            } => {
                write!(f, "Failed to convert value '{value}' at index {index} as type '{type_name}' for '{name}'")?;
                write_join(f, " of command '", "'", " ", path)?;
                write!(f, ": {reason}.")?;
            }
            Error::DuplicateName(name) => write!(f, "Duplicate name '{name}'.")?,
            Error::ConflictingKey(key) => write!(f, "Key '{key}' is declared by more than one option or positional parameter.")?,
            Error::PositionGap(index) => write!(f, "Missing positional parameter for index '{index}'. Positional indices must be contiguous and start at 0.")?,
            Error::MissingCommandName => write!(f, "Missing name for command.")?,
            Error::MissingOptionName => write!(f, "Missing name for option.")?,
            Error::InvalidOptionName(name) => write!(f, "Invalid option name '{name}'. A valid option name is non-empty, contains no whitespace and does not contain the separator.")?,
            Error::InvalidArity(key, reason) => write!(f, "Invalid arity for '{key}': {reason}.")?,
            Error::InvalidIndex(key, reason) => write!(f, "Invalid index for '{key}': {reason}.")?,
            Error::InvalidPattern(key, error) => write!(f, "Invalid split pattern for '{key}': {error}")?,
            Error::MissingConverter(key, type_name) => write!(f, "Missing converter for type '{type_name}' of '{key}'.")?,
            Error::InvalidDefault(key, value, reason) => write!(f, "Invalid default value '{value}' for '{key}': {reason}.")?,
        }
        Ok(())
    }
}

fn write_join(
    formatter: &mut fmt::Formatter,
    prefix: impl fmt::Display,
    suffix: impl fmt::Display,
    separator: impl fmt::Display,
    items: impl IntoIterator<Item = impl fmt::Display>,
) -> Result<(), fmt::Error> {
    let mut has = false;
    for item in items.into_iter() {
        if replace(&mut has, true) {
            write!(formatter, "{separator}")?;
        } else {
            write!(formatter, "{prefix}")?;
        }
        write!(formatter, "{item}")?;
    }
    if has {
        write!(formatter, "{suffix}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_all() {
        let error = Error::MissingParameter(vec![], vec!["--out".into(), "<files>[0..*]".into()]);
        assert_eq!(
            error.to_string(),
            "Missing required parameters '--out', '<files>[0..*]'."
        );
    }

    #[test]
    fn messages_mention_command_path() {
        let error = Error::UnmatchedArgument(
            vec!["remote".into(), "add".into()],
            "--nme".into(),
            vec!["--name".into()],
        );
        assert_eq!(
            error.to_string(),
            "Unmatched argument '--nme' for command 'remote add'. Similar matches: '--name'."
        );
        assert_eq!(error.path().len(), 2);
        assert!(!error.is_schema());
    }

    #[test]
    fn parse_errors_carry_the_path() {
        let path: Path = vec!["run".into()];
        let errors = [
            Error::MissingParameter(path.clone(), vec!["<file>".into()]),
            Error::MissingOptionValue(path.clone(), "-p".into(), Range::exact(2), 1),
            Error::UnmatchedArgument(path.clone(), "x".into(), vec![]),
            Error::OverwrittenOption(path.clone(), "-o".into()),
            Error::MaxValuesExceeded(path.clone(), "<file>".into(), "x".into()),
            Error::FailedToConvert {
                path: path.clone(),
                name: "-n".into(),
                index: 1,
                value: "x".into(),
                type_name: "integer".into(),
                reason: "invalid digit".into(),
            },
        ];
        for error in errors {
            assert_eq!(error.path(), path.as_slice(), "{error}");
            assert!(!error.is_schema(), "{error}");
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn schema_errors_have_no_path() {
        let error = Error::DuplicateName("-v".into());
        assert!(error.path().is_empty());
        assert!(error.is_schema());
    }
}
