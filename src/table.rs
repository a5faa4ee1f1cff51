use crate::text::StyledText;
use core::fmt;

/// What a column does with a value wider than itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Drop the characters that do not fit.
    Truncate,
    /// Continue into the following columns of the same row, then into a new row.
    Span,
    /// Continue into a new row, breaking between words.
    Wrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub width: usize,
    pub indent: usize,
    pub overflow: Overflow,
}

/// Packs styled values into fixed-width columns.
#[derive(Clone, Debug)]
pub struct TextTable {
    columns: Vec<Column>,
    cells: Vec<StyledText>,
    wrap_indent: usize,
    ansi: bool,
}

impl Column {
    pub const fn new(width: usize, indent: usize, overflow: Overflow) -> Self {
        Self {
            width,
            indent,
            overflow,
        }
    }
}

impl TextTable {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            cells: Vec::new(),
            wrap_indent: 2,
            ansi: false,
        }
    }

    /// Extra indentation of the continuation lines of spanned and wrapped values.
    pub fn wrap_indent(mut self, indent: usize) -> Self {
        self.wrap_indent = indent;
        self
    }

    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> usize {
        match self.columns.len() {
            0 => 0,
            count => self.cells.len() / count,
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&StyledText> {
        if column >= self.columns.len() {
            return None;
        }
        self.cells.get(row * self.columns.len() + column)
    }

    pub fn add_empty_row(&mut self) {
        let count = self.columns.len();
        self.cells.extend((0..count).map(|_| StyledText::default()));
    }

    /// Adds one row of values; a value that overflows its cell may add more rows, in which case
    /// the following values are written to the last row.
    pub fn add_row<T: Into<StyledText>>(&mut self, values: impl IntoIterator<Item = T>) {
        if self.columns.is_empty() {
            return;
        }
        let values: Vec<StyledText> = values
            .into_iter()
            .take(self.columns.len())
            .map(Into::into)
            .collect();
        let last = values.len().saturating_sub(1);
        self.add_empty_row();
        for (column, value) in values.into_iter().enumerate() {
            let row = self.rows() - 1;
            let cell = self.put(row, column, value);
            if cell != (row, column) && column != last {
                self.add_empty_row();
            }
        }
    }

    /// Writes `value` at the given cell, applying the column's overflow policy, and returns the
    /// cell where writing ended.
    pub fn put(&mut self, row: usize, column: usize, value: StyledText) -> (usize, usize) {
        let (mut row, mut column) = (row, column);
        if value.is_empty() || column >= self.columns.len() {
            return (row, column);
        }
        while row >= self.rows() {
            self.add_empty_row();
        }

        let origin = self.columns[column];
        let start = column;
        let last = self.columns.len() - 1;
        let mut value = value;
        let mut indent = origin.indent;
        match origin.overflow {
            Overflow::Truncate => {
                self.write(row, column, &value, indent, false);
            }
            Overflow::Span => loop {
                let written = self.write(row, column, &value, indent, column == last);
                value = value.tail(written);
                indent = 0;
                if value.is_empty() {
                    break;
                }
                column += 1;
                if column > last {
                    self.add_empty_row();
                    row += 1;
                    column = start;
                    indent = origin.indent + self.wrap_indent;
                }
            },
            Overflow::Wrap => loop {
                let written = self.write(row, column, &value, indent, true);
                value = value.tail(written);
                indent = origin.indent + self.wrap_indent;
                if value.is_empty() {
                    break;
                }
                self.add_empty_row();
                row += 1;
            },
        }
        (row, column)
    }

    /// Copies as much of `value` as fits into the cell after `offset` characters of indentation
    /// and returns how many characters of `value` were consumed.
    fn write(
        &mut self,
        row: usize,
        column: usize,
        value: &StyledText,
        offset: usize,
        words: bool,
    ) -> usize {
        let width = self.columns[column].width;
        if width == 0 {
            return value.width();
        }
        let offset = if offset >= width { 0 } else { offset };
        let capacity = width - offset;
        let (copy, consumed) = if words {
            fit_words(value, capacity)
        } else {
            let count = value.width().min(capacity);
            (count, count)
        };

        let index = row * self.columns.len() + column;
        let cell = &mut self.cells[index];
        cell.pad(offset);
        cell.push(&value.substring(0, copy));
        consumed
    }

    pub fn render(&self) -> String {
        let mut buffer = String::new();
        for row in 0..self.rows() {
            let mut line = StyledText::default();
            for (column, cell) in self.columns.iter().zip(&self.cells[row * self.columns.len()..]) {
                let mut cell = cell.clone();
                cell.pad(column.width);
                line.push(&cell);
            }
            buffer.push_str(&line.trim_end().render(self.ansi));
            buffer.push('\n');
        }
        buffer
    }
}

/// Finds how many characters of `value` fit in `capacity` without breaking a word. Break
/// opportunities only follow whitespace, so hyphenated words are never split. Returns the number of
/// characters to copy and the number consumed, which also covers the whitespace skipped at the break.
fn fit_words(value: &StyledText, capacity: usize) -> (usize, usize) {
    let letters: Vec<char> = value.plain().chars().collect();
    let mut done = 0;
    let mut index = 0;
    while index < letters.len() {
        let mut end = index;
        while end < letters.len() && !letters[end].is_whitespace() {
            end += 1;
        }
        if end > capacity {
            break;
        }
        done = end;
        index = end;
        while index < letters.len() && letters[index].is_whitespace() {
            index += 1;
        }
    }

    if done == 0 {
        // A single word wider than the column.
        let count = letters.len().min(capacity);
        return (count, count);
    }
    let mut consumed = done;
    while consumed < letters.len() && letters[consumed].is_whitespace() {
        consumed += 1;
    }
    (done, consumed)
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
