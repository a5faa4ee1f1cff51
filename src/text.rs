use crate::style::Style;
use core::fmt;

const OPEN: &str = "@|";
const CLOSE: &str = "|@";

/// A run of characters rendered with a list of styles. Offsets count characters, not bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    start: usize,
    length: usize,
    styles: Vec<Style>,
}

/// Text paired with style annotations. Layout works on the plain projection; escape codes are only
/// produced by [`StyledText::render`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledText {
    plain: String,
    width: usize,
    sections: Vec<Section>,
}

impl Section {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    fn on(&self, target: &mut String) {
        for style in self.styles.iter() {
            style.on(target);
        }
    }

    fn off(&self, target: &mut String) {
        for style in self.styles.iter().rev() {
            style.off(target);
        }
    }
}

impl StyledText {
    pub fn new(plain: impl Into<String>) -> Self {
        let plain = plain.into();
        Self {
            width: plain.chars().count(),
            plain,
            sections: Vec::new(),
        }
    }

    pub fn styled(plain: impl Into<String>, styles: &[Style]) -> Self {
        let mut text = Self::new(plain);
        if !styles.is_empty() && text.width > 0 {
            text.sections.push(Section {
                start: 0,
                length: text.width,
                styles: styles.to_vec(),
            });
        }
        text
    }

    /// Parses inline markup of the form `@|bold,red styled text|@`. Text outside of markup spans is
    /// kept as is; a span without a closing delimiter or without a style list stays literal.
    pub fn markup(input: &str) -> Self {
        let mut text = Self::default();
        let mut rest = input;
        while let Some(open) = rest.find(OPEN) {
            text.push_str(&rest[..open]);
            let after = &rest[open + OPEN.len()..];
            let Some(close) = after.find(CLOSE) else {
                text.push_str(&rest[open..]);
                return text;
            };
            let end = open + OPEN.len() + close + CLOSE.len();
            match after[..close].find(' ') {
                Some(space) => {
                    let styles = Style::list(&after[..space]);
                    text.push(&Self::styled(&after[space + 1..close], &styles));
                }
                None => text.push_str(&rest[open..end]),
            }
            rest = &rest[end..];
        }
        text.push_str(rest);
        text
    }

    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// The number of printable characters.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn push_str(&mut self, plain: &str) {
        self.plain.push_str(plain);
        self.width += plain.chars().count();
    }

    pub fn push(&mut self, other: &StyledText) {
        let offset = self.width;
        self.plain.push_str(&other.plain);
        self.width += other.width;
        self.sections
            .extend(other.sections.iter().map(|section| Section {
                start: section.start + offset,
                length: section.length,
                styles: section.styles.clone(),
            }));
    }

    pub fn append(&self, other: &StyledText) -> Self {
        let mut text = self.clone();
        text.push(other);
        text
    }

    /// Pads with spaces up to `width` characters.
    pub fn pad(&mut self, width: usize) {
        for _ in self.width..width {
            self.plain.push(' ');
            self.width += 1;
        }
    }

    /// The characters in `start..end`, with sections clipped and rebased to the new start.
    pub fn substring(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.width);
        let start = start.min(end);
        let from = self.byte(start);
        let to = self.byte(end);
        let sections = self
            .sections
            .iter()
            .filter_map(|section| {
                let low = section.start.max(start);
                let high = section.end().min(end);
                (high > low).then(|| Section {
                    start: low - start,
                    length: high - low,
                    styles: section.styles.clone(),
                })
            })
            .collect();
        Self {
            plain: self.plain[from..to].to_string(),
            width: end - start,
            sections,
        }
    }

    pub fn tail(&self, start: usize) -> Self {
        self.substring(start, self.width)
    }

    /// Splits on line feeds; the line feeds themselves are dropped.
    pub fn lines(&self) -> Vec<Self> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (index, letter) in self.plain.chars().enumerate() {
            if letter == '\n' {
                lines.push(self.substring(start, index));
                start = index + 1;
            }
        }
        lines.push(self.tail(start));
        lines
    }

    pub fn trim_end(&self) -> Self {
        let trailing = self.plain.chars().rev().take_while(|&letter| letter == ' ').count();
        self.substring(0, self.width - trailing)
    }

    /// Renders the plain text, interleaved with escape codes at section boundaries when `ansi` is set.
    pub fn render(&self, ansi: bool) -> String {
        if !ansi || self.sections.is_empty() {
            return self.plain.clone();
        }

        let mut buffer = String::with_capacity(self.plain.len() * 2);
        let mut open: Vec<&Section> = Vec::new();
        for (index, letter) in self.plain.chars().enumerate() {
            close(&mut open, &mut buffer, index);
            for section in self.sections.iter() {
                if section.start == index && section.length > 0 {
                    section.on(&mut buffer);
                    open.push(section);
                }
            }
            buffer.push(letter);
        }
        while let Some(section) = open.pop() {
            section.off(&mut buffer);
        }
        buffer
    }

    fn byte(&self, index: usize) -> usize {
        self.plain
            .char_indices()
            .nth(index)
            .map_or(self.plain.len(), |(byte, _)| byte)
    }
}

fn close(open: &mut Vec<&Section>, buffer: &mut String, index: usize) {
    let mut at = open.len();
    while at > 0 {
        at -= 1;
        if open[at].end() == index {
            open.remove(at).off(buffer);
        }
    }
}

impl From<&str> for StyledText {
    fn from(plain: &str) -> Self {
        Self::new(plain)
    }
}

impl From<String> for StyledText {
    fn from(plain: String) -> Self {
        Self::new(plain)
    }
}

impl fmt::Display for StyledText {
    /// Writes escape codes unless the alternate flag (`{:#}`) is set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(!f.alternate()))
    }
}
