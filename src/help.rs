use crate::{
    build::{letter, strip},
    descriptor::{OptionDescriptor, PositionDescriptor, Target},
    parse::Parser,
    range::Range,
    style::Style,
    table::{Column, Overflow, TextTable},
    text::StyledText,
};
use std::{env, path::Path};

const MARKER: usize = 2;
const SHORT: usize = 2;
const NAMES: usize = 27;
const MINIMUM: usize = 20;

/// The sections of the usage help, in rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Synopsis,
    Description,
    Parameters,
    Options,
    Commands,
    Footer,
}

/// Renders the usage help of one command.
pub struct Help<'a> {
    parser: &'a Parser,
    width: usize,
    ansi: bool,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Header,
        Section::Synopsis,
        Section::Description,
        Section::Parameters,
        Section::Options,
        Section::Commands,
        Section::Footer,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Section::Synopsis => "Usage: ",
            Section::Parameters => "Parameters:\n",
            Section::Options => "Options:\n",
            Section::Commands => "Commands:\n",
            Section::Header | Section::Description | Section::Footer => "",
        }
    }
}

impl<'a> Help<'a> {
    pub fn new(parser: &'a Parser) -> Self {
        Self {
            parser,
            width: parser.settings.width,
            ansi: parser.settings.ansi.enabled(),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Renders every non-empty section, separated by blank lines.
    pub fn render(&self) -> String {
        let sections: Vec<String> = Section::ALL
            .iter()
            .map(|&section| self.section(section))
            .filter(|section| !section.is_empty())
            .collect();
        sections.join("\n")
    }

    /// Renders one section with its heading; empty when the section has no content.
    pub fn section(&self, section: Section) -> String {
        let about = &self.parser.about;
        let body = match section {
            Section::Header => self.lines(&about.header),
            Section::Synopsis => return self.synopsis(),
            Section::Description => self.lines(&about.description),
            Section::Parameters => self.parameters(),
            Section::Options => self.options(),
            Section::Commands => self.commands(),
            Section::Footer => self.lines(&about.footer),
        };
        if body.is_empty() {
            return String::new();
        }
        let mut text = self.heading(section).render(self.ansi);
        text.push_str(&body);
        text
    }

    fn heading(&self, section: Section) -> StyledText {
        let heading = self
            .parser
            .about
            .headings
            .get(&section)
            .map(|heading| heading.as_ref())
            .unwrap_or(section.heading());
        let text = heading.trim_end_matches('\n');
        let mut styled = StyledText::markup(text);
        if styled.sections().is_empty() {
            styled = self.styled(text, &self.parser.settings.scheme.heading);
        }
        styled.push_str(&heading[text.len()..]);
        styled
    }

    fn styled(&self, text: &str, styles: &[Style]) -> StyledText {
        StyledText::styled(text, styles)
    }

    fn lines<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let mut table = TextTable::new([Column::new(self.width, 0, Overflow::Wrap)])
            .wrap_indent(0)
            .ansi(self.ansi);
        for line in lines.iter().flat_map(|line| StyledText::markup(line.as_ref()).lines()) {
            table.add_row([line]);
        }
        table.render()
    }

    /// The root name followed by the command path; an unnamed root falls back to the program name.
    fn name(&self) -> String {
        let parser = self.parser;
        let program = match parser.settings.program.as_ref() {
            "" => env::args()
                .next()
                .and_then(|program| {
                    Path::new(&program)
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "command".to_string()),
            program => program.to_string(),
        };
        if parser.path.is_empty() {
            program
        } else {
            format!("{program} {}", parser.path.join(" "))
        }
    }

    fn synopsis(&self) -> String {
        let parser = self.parser;
        let settings = &parser.settings;
        let mut text = self.heading(Section::Synopsis);
        text.push(&self.styled(&self.name(), &settings.scheme.command));
        let indent = text.width() + 1;
        match &parser.about.synopsis {
            Some(synopsis) => {
                text.push_str(" ");
                text.push(&StyledText::markup(synopsis));
            }
            None => {
                let letters: String = self
                    .visible_options()
                    .filter_map(|option| self.clustered(option))
                    .collect();
                if !letters.is_empty() {
                    text.push_str(" [");
                    let flags = format!("{}{letters}", settings.short);
                    text.push(&self.styled(&flags, &settings.scheme.option));
                    text.push_str("]");
                }
                for option in self.visible_options() {
                    if self.clustered(option).is_some() {
                        continue;
                    }
                    let Some(name) = option.names.iter().min_by_key(|name| name.chars().count())
                    else {
                        continue;
                    };
                    let mut piece = self.styled(name, &settings.scheme.option);
                    piece.push(&self.label(&option.target, option.target.arity, true));
                    text.push_str(" ");
                    if option.required {
                        text.push(&piece);
                    } else {
                        text.push_str("[");
                        text.push(&piece);
                        text.push_str("]");
                    }
                    if option.target.is_many() {
                        text.push_str("...");
                    }
                }
                for position in parser.positions.iter().filter(|position| !position.target.hidden) {
                    text.push_str(" ");
                    text.push(&self.parameter(position));
                }
                if !parser.commands.is_empty() {
                    text.push_str(" [COMMAND]");
                }
            }
        }

        let mut table = TextTable::new([Column::new(self.width, 0, Overflow::Wrap)])
            .wrap_indent(indent)
            .ansi(self.ansi);
        table.add_row([text]);
        table.render()
    }

    /// The short letter of an optional flag, which the synopsis groups into one cluster.
    fn clustered(&self, option: &OptionDescriptor) -> Option<char> {
        if option.required || option.target.arity.max() > 0 {
            return None;
        }
        option
            .names
            .iter()
            .find_map(|name| letter(name, &self.parser.settings))
    }

    fn visible_options(&self) -> impl Iterator<Item = &'a OptionDescriptor> {
        let mut options: Vec<&'a OptionDescriptor> = self
            .parser
            .options
            .iter()
            .filter(|option| !option.target.hidden)
            .collect();
        if self.parser.settings.sort_options {
            let settings = &self.parser.settings;
            options.sort_by_cached_key(|option| {
                let shortest = option
                    .names
                    .iter()
                    .min_by_key(|name| name.chars().count())
                    .map_or("", |name| name.as_ref());
                let stripped = strip(shortest, settings);
                (stripped.to_lowercase(), stripped.to_string())
            });
        }
        options.into_iter()
    }

    /// `=<label>`, `[=<label>]` or nothing, with `...` for variadic values. A positional label has
    /// no separator.
    fn label(&self, target: &Target, arity: Range, option: bool) -> StyledText {
        let mut text = StyledText::default();
        if arity.max() == 0 {
            return text;
        }
        let separator = if option {
            self.parser.settings.separator.as_ref()
        } else {
            ""
        };
        let optional = arity.min() == 0;
        if optional {
            text.push_str("[");
        }
        text.push_str(separator);
        text.push(&self.styled(
            &format!("<{}>", target.label),
            &self.parser.settings.scheme.parameter,
        ));
        if arity.max() > 1 {
            text.push_str("...");
        }
        if optional {
            text.push_str("]");
        }
        text
    }

    fn parameter(&self, position: &PositionDescriptor) -> StyledText {
        self.label(&position.target, position.capacity(), false)
    }

    fn table(&self) -> TextTable {
        TextTable::new([
            Column::new(MARKER, 0, Overflow::Truncate),
            Column::new(NAMES, 0, Overflow::Span),
            Column::new(self.description_width(), 1, Overflow::Wrap),
        ])
        .ansi(self.ansi)
    }

    fn description_width(&self) -> usize {
        self.width.saturating_sub(MARKER + NAMES).max(MINIMUM)
    }

    /// Adds the row of one descriptor, then one row per extra description line.
    fn row(&self, table: &mut TextTable, marker: &str, names: StyledText, target: &Target) {
        let mut lines = target
            .help
            .iter()
            .flat_map(|line| StyledText::markup(line).lines());
        table.add_row([
            StyledText::new(marker),
            names,
            lines.next().unwrap_or_default(),
        ]);
        for line in lines {
            table.add_row([StyledText::default(), StyledText::default(), line]);
        }
        if self.parser.settings.show_defaults {
            if let Some(default) = &target.default {
                let line = StyledText::new(format!("Default: {default}"));
                table.add_row([StyledText::default(), StyledText::default(), line]);
            }
        }
    }

    fn parameters(&self) -> String {
        let mut table = self.table();
        for position in self.parser.positions.iter().filter(|position| !position.target.hidden) {
            let mut names = StyledText::new(" ".repeat(SHORT + 2));
            names.push(&self.parameter(position));
            self.row(&mut table, "", names, &position.target);
        }
        table.render()
    }

    /// Short name first, then the long names and the label: `-o, --out=<file>`.
    fn options(&self) -> String {
        let settings = &self.parser.settings;
        let scheme = &settings.scheme;
        let mut table = self.table();
        for option in self.visible_options() {
            let short = option.names.iter().find(|name| letter(name, settings).is_some());
            let mut names = StyledText::default();
            match short {
                Some(short) => names.push(&self.styled(short, &scheme.option)),
                None => names.push_str(&" ".repeat(SHORT + 2)),
            }
            let longs = option.names.iter().filter(|&name| Some(name) != short);
            for (index, long) in longs.enumerate() {
                names.push_str(if index == 0 && short.is_none() { "" } else { ", " });
                names.push(&self.styled(long, &scheme.option));
            }
            names.push(&self.label(&option.target, option.target.arity, true));
            let marker = if option.required { "*" } else { "" };
            self.row(&mut table, marker, names, &option.target);
        }
        table.render()
    }

    fn commands(&self) -> String {
        let parser = self.parser;
        let names: Vec<String> = parser
            .commands
            .iter()
            .map(|command| command.names.join(", "))
            .collect();
        let longest = names.iter().map(|name| name.chars().count()).max().unwrap_or(0);
        let mut table = TextTable::new([
            Column::new(longest + 2, 2, Overflow::Span),
            Column::new(
                self.width.saturating_sub(longest + 2).max(MINIMUM),
                2,
                Overflow::Wrap,
            ),
        ])
        .ansi(self.ansi);
        for (command, name) in parser.commands.iter().zip(names) {
            let summary = command
                .about
                .description
                .first()
                .and_then(|line| StyledText::markup(line).lines().into_iter().next())
                .unwrap_or_default();
            table.add_row([self.styled(&name, &parser.settings.scheme.command), summary]);
        }
        table.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{style::Ansi, Builder, Kind, Options, Scheme};

    fn help(builder: Builder) -> String {
        let parser = builder.ansi(Ansi::Off).build().unwrap();
        Help::new(&parser).render()
    }

    /// A row whose description starts at the description column.
    fn row(names: &str, description: &str) -> String {
        format!("{names:<30}{description}\n")
    }

    #[test]
    fn renders_all_sections() {
        let text = help(
            Builder::new()
                .name("tool")
                .header("Tool 1.0")
                .description("Does things.")
                .footer("See the manual.")
                .options([Options::Help])
                .option(|option| option.name("v").name("verbose").flag().help("Talk more."))
                .option(|option| option.name("o").name("out").help("Where to write."))
                .position(|position| position.key("files").many().help("Files to read."))
                .command(|command| command.name("run").description("Runs the tool.")),
        );
        let expected = [
            "Tool 1.0\n".to_string(),
            "\n".to_string(),
            "Usage: tool [-hv] [-o=<out>] [<files>...] [COMMAND]\n".to_string(),
            "\n".to_string(),
            "Does things.\n".to_string(),
            "\n".to_string(),
            "Parameters:\n".to_string(),
            row("      [<files>...]", "Files to read."),
            "\n".to_string(),
            "Options:\n".to_string(),
            row("  -h, --help", "Show this help message and exit."),
            row("  -o, --out=<out>", "Where to write."),
            row("  -v, --verbose", "Talk more."),
            "\n".to_string(),
            "Commands:\n".to_string(),
            "  run  Runs the tool.\n".to_string(),
            "\n".to_string(),
            "See the manual.\n".to_string(),
        ]
        .concat();
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let text = help(Builder::new().name("bare"));
        assert_eq!(text, "Usage: bare\n");
    }

    #[test]
    fn long_options_span_into_the_description() {
        let text = help(
            Builder::new()
                .name("tool")
                .option(|option| option.name("a-very-long-option-name").help("Described.")),
        );
        let names = "      --a-very-long-option-name=<a-very-long-option-name>\n";
        assert!(text.contains(&format!("{names}{}", row("", "Described."))));
    }

    #[test]
    fn labels_follow_arity() {
        let text = help(
            Builder::new()
                .name("tool")
                .option(|option| option.name("color").arity("0..1"))
                .option(|option| option.name("x").many().arity("1..*").label("item"))
                .option(|option| option.name("k").require()),
        );
        assert!(text.contains("      --color[=<color>]\n"));
        assert!(text.contains("  -x=<item>...\n"));
        assert!(text.contains("* -k=<k>\n"));
        assert!(text.starts_with("Usage: tool [--color[=<color>]] -k=<k> [-x=<item>...]...\n"));
    }

    #[test]
    fn wraps_descriptions_and_shows_defaults() {
        let text = help(
            Builder::new()
                .name("tool")
                .width(60)
                .show_defaults(true)
                .option(|option| {
                    option
                        .name("n")
                        .kind(Kind::Natural)
                        .default(3)
                        .help("The number of attempts made before giving up.")
                }),
        );
        let expected = [
            row("  -n=<n>", "The number of attempts made"),
            row("", "  before giving up."),
            row("", "Default: 3"),
        ]
        .concat();
        assert!(text.ends_with(&expected));
    }

    #[test]
    fn line_feeds_start_new_rows() {
        let text = help(
            Builder::new()
                .name("tool")
                .description("First paragraph.\nSecond paragraph.")
                .command(|command| command.name("run").description("Runs.\nIn the background."))
                .option(|option| option.name("q").flag().help("first line\nsecond line")),
        );
        assert!(text.contains("First paragraph.\nSecond paragraph.\n"));
        assert!(text.contains(&[row("  -q", "first line"), row("", "second line")].concat()));
        assert!(text.contains("  run  Runs.\n"));
        assert!(!text.contains("In the background."));
    }

    #[test]
    fn wraps_the_synopsis_past_the_command_name() {
        let text = help(
            Builder::new()
                .name("tool")
                .width(40)
                .position(|position| position.key("first-parameter").index("0"))
                .position(|position| position.key("second-parameter").index("1"))
                .position(|position| position.key("third-parameter").index("2")),
        );
        assert!(text.starts_with(
            "Usage: tool <first-parameter>\n            <second-parameter>\n            <third-parameter>\n"
        ));
    }

    #[test]
    fn custom_headings_and_hidden_options() {
        let text = help(
            Builder::new()
                .name("tool")
                .heading(Section::Synopsis, "Syntax: ")
                .heading(Section::Options, "@|bold Flags|@:\n")
                .option(|option| option.name("shown").flag())
                .option(|option| option.name("secret").flag().hide()),
        );
        assert!(text.starts_with("Syntax: tool [--shown]\n"));
        assert!(text.contains("Flags:\n"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn sub_command_synopsis_uses_the_path() {
        let parser = Builder::new()
            .name("git")
            .command(|command| {
                command
                    .name("remote")
                    .command(|command| command.name("add").position(|position| position.key("name")))
            })
            .ansi(Ansi::Off)
            .build()
            .unwrap();
        let add = parser.find(&["remote", "add"]).unwrap();
        assert_eq!(
            Help::new(add).section(Section::Synopsis),
            "Usage: git remote add <name>\n"
        );
    }

    #[test]
    fn styles_when_enabled() {
        let parser = Builder::new()
            .name("tool")
            .scheme(Scheme::plain())
            .option(|option| option.name("v").flag().help("@|bold Loud|@ output."))
            .build()
            .unwrap();
        let text = Help::new(&parser).ansi(true).section(Section::Options);
        assert!(text.contains("\x1b[1mLoud\x1b[21m output."));
    }
}
