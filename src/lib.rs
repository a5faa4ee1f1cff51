mod bind;
mod build;
mod convert;
mod descriptor;
mod error;
mod help;
mod parse;
mod range;
mod spell;
pub mod style;
pub mod table;
pub mod text;

pub use crate::{
    build::{Builder, OptionBuilder, Options, PositionBuilder},
    convert::{custom, Convert, FromValue, Kind, Registry, Value},
    descriptor::{OptionDescriptor, PositionDescriptor, Shape, Special, Target},
    error::{Error, Path},
    help::{Help, Section},
    parse::{Parsed, Parser, END},
    range::Range,
    spell::Spell,
    style::{Ansi, Color, Scheme, Style},
    table::{Column, Overflow, TextTable},
    text::StyledText,
};
