use self::color::*;
use std::{fmt::Write, io::stdout};
use termion::{
    color::{self as term, AnsiValue, Bg, Fg, Rgb},
    is_tty,
    style::{
        Blink, Bold, Faint, Invert, Italic, NoBlink, NoBold, NoFaint, NoInvert, NoItalic,
        NoUnderline, Underline,
    },
};

/// Whether styled text renders escape codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ansi {
    /// Enabled when standard output is a terminal.
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    /// An index into the 256 color palette.
    Palette(u8),
    Rgb(u8, u8, u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Bold,
    Faint,
    Italic,
    Underline,
    Blink,
    Reverse,
    Fg(Color),
    Bg(Color),
}

/// The styles applied to each element of the usage help.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    pub command: Vec<Style>,
    pub option: Vec<Style>,
    pub parameter: Vec<Style>,
    pub heading: Vec<Style>,
}

impl Ansi {
    pub fn enabled(&self) -> bool {
        match self {
            Ansi::Auto => is_tty(&stdout()),
            Ansi::On => true,
            Ansi::Off => false,
        }
    }
}

impl Color {
    /// Parses a color name (`red`), a palette index (`202`) or an `r;g;b` triple.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let color = match text.to_ascii_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            text => match text.split(';').collect::<Vec<_>>()[..] {
                [index] => Color::Palette(index.parse().ok()?),
                [red, green, blue] => Color::Rgb(
                    red.trim().parse().ok()?,
                    green.trim().parse().ok()?,
                    blue.trim().parse().ok()?,
                ),
                _ => return None,
            },
        };
        Some(color)
    }

    fn write(&self, target: &mut String, background: bool) {
        macro_rules! ground {
            ($color: expr) => {
                if background {
                    write!(target, "{}", Bg($color))
                } else {
                    write!(target, "{}", Fg($color))
                }
            };
        }

        // Writing into a `String` cannot fail.
        let _ = match *self {
            Color::Black => ground!(term::Black),
            Color::Red => ground!(term::Red),
            Color::Green => ground!(term::Green),
            Color::Yellow => ground!(term::Yellow),
            Color::Blue => ground!(term::Blue),
            Color::Magenta => ground!(term::Magenta),
            Color::Cyan => ground!(term::Cyan),
            Color::White => ground!(term::White),
            Color::Palette(index) => ground!(AnsiValue(index)),
            Color::Rgb(red, green, blue) => ground!(Rgb(red, green, blue)),
        };
    }
}

impl Style {
    /// Parses one entry of a markup style list such as `bold`, `fg(red)`, `bg(1;2;3)` or `cyan`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let lower = text.to_ascii_lowercase();
        let style = match lower.as_str() {
            "bold" => Style::Bold,
            "faint" => Style::Faint,
            "italic" => Style::Italic,
            "underline" => Style::Underline,
            "blink" => Style::Blink,
            "reverse" => Style::Reverse,
            _ => {
                if let Some(inner) = lower.strip_prefix("fg(").and_then(|text| text.strip_suffix(')')) {
                    Style::Fg(Color::parse(inner)?)
                } else if let Some(inner) =
                    lower.strip_prefix("bg(").and_then(|text| text.strip_suffix(')'))
                {
                    Style::Bg(Color::parse(inner)?)
                } else {
                    Style::Fg(Color::parse(&lower)?)
                }
            }
        };
        Some(style)
    }

    /// Appends the escape code that turns this style on.
    pub fn on(&self, target: &mut String) {
        let _ = match self {
            Style::Bold => write!(target, "{Bold}"),
            Style::Faint => write!(target, "{Faint}"),
            Style::Italic => write!(target, "{Italic}"),
            Style::Underline => write!(target, "{Underline}"),
            Style::Blink => write!(target, "{Blink}"),
            Style::Reverse => write!(target, "{Invert}"),
            Style::Fg(color) => {
                color.write(target, false);
                Ok(())
            }
            Style::Bg(color) => {
                color.write(target, true);
                Ok(())
            }
        };
    }

    /// Appends the escape code that turns this style off.
    pub fn off(&self, target: &mut String) {
        let _ = match self {
            Style::Bold => write!(target, "{NoBold}"),
            Style::Faint => write!(target, "{NoFaint}"),
            Style::Italic => write!(target, "{NoItalic}"),
            Style::Underline => write!(target, "{NoUnderline}"),
            Style::Blink => write!(target, "{NoBlink}"),
            Style::Reverse => write!(target, "{NoInvert}"),
            Style::Fg(_) => write!(target, "{}", Fg(term::Reset)),
            Style::Bg(_) => write!(target, "{}", Bg(term::Reset)),
        };
    }

    /// Parses a comma separated style list; unknown entries are skipped.
    pub fn list(text: &str) -> Vec<Style> {
        text.split(',').filter_map(Style::parse).collect()
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self {
            command: vec![Style::Bold, Style::Fg(TURQUOISE)],
            option: vec![Style::Fg(TURQUOISE)],
            parameter: vec![Style::Italic, Style::Fg(PEACH)],
            heading: vec![Style::Bold, Style::Fg(OCEAN_BLUE)],
        }
    }
}

impl Scheme {
    pub fn plain() -> Self {
        Self {
            command: Vec::new(),
            option: Vec::new(),
            parameter: Vec::new(),
            heading: Vec::new(),
        }
    }
}

pub mod color {
    use super::Color;

    pub const OCEAN_BLUE: Color = Color::Rgb(36, 113, 163);
    pub const TURQUOISE: Color = Color::Rgb(64, 224, 208);
    pub const RUBY_RED: Color = Color::Rgb(220, 20, 60);
    pub const SILVER_GRAY: Color = Color::Rgb(169, 169, 169);
    pub const CORAL_PINK: Color = Color::Rgb(255, 127, 80);
    pub const VIOLET: Color = Color::Rgb(238, 130, 238);
    pub const PEACH: Color = Color::Rgb(255, 218, 185);
    pub const SALMON_PINK: Color = Color::Rgb(255, 145, 164);
    pub const SANDY_BROWN: Color = Color::Rgb(244, 164, 96);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_styles() {
        assert_eq!(Style::parse("bold"), Some(Style::Bold));
        assert_eq!(Style::parse(" Italic "), Some(Style::Italic));
        assert_eq!(Style::parse("red"), Some(Style::Fg(Color::Red)));
        assert_eq!(Style::parse("fg(blue)"), Some(Style::Fg(Color::Blue)));
        assert_eq!(Style::parse("bg(202)"), Some(Style::Bg(Color::Palette(202))));
        assert_eq!(
            Style::parse("fg(1;2;3)"),
            Some(Style::Fg(Color::Rgb(1, 2, 3)))
        );
        assert_eq!(Style::parse("sparkle"), None);
    }

    #[test]
    fn lists_skip_unknown_styles() {
        assert_eq!(
            Style::list("bold,sparkle,underline"),
            [Style::Bold, Style::Underline]
        );
    }

    #[test]
    fn codes_are_escape_sequences() {
        let mut buffer = String::new();
        Style::Bold.on(&mut buffer);
        assert_eq!(buffer, "\x1b[1m");
        buffer.clear();
        Style::Fg(Color::Red).on(&mut buffer);
        assert_eq!(buffer, "\x1b[38;5;1m");
        buffer.clear();
        Style::Fg(Color::Red).off(&mut buffer);
        assert_eq!(buffer, "\x1b[39m");
    }
}
