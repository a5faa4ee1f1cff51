use clasp::{custom, Builder, Error, Kind, Options, Parser};
use core::fmt;
use std::{path::PathBuf, process::ExitCode, str::FromStr};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Compression::None),
            "z" | "gzip" => Ok(Compression::Gzip),
            "zstd" => Ok(Compression::Zstd),
            _ => Err(format!("unknown compression '{s}'")),
        }
    }
}

fn parser() -> Result<Parser, Error> {
    Builder::new()
        .name("archive")
        .version(env!("CARGO_PKG_VERSION"))
        .header("@|bold archive|@ - bundles files together.")
        .description("Creates, lists or extracts archives. Short options cluster, so")
        .description("`archive -xvf backup.tar` extracts verbosely.")
        .footer("Set RUST_LOG=clasp=trace to follow the parser.")
        .terminal_width()
        .show_defaults(true)
        .register(Kind::Custom("compression".into()), custom::<Compression>())
        .options([Options::Help, Options::Version])
        .option(|option| option.name("c").name("create").flag().help("Create a new archive."))
        .option(|option| option.name("x").name("extract").flag().help("Extract files from an archive."))
        .option(|option| option.name("t").name("list").flag().help("List the contents of an archive."))
        .option(|option| option.name("v").name("verbose").flag().help("Verbosely list the processed files."))
        .option(|option| {
            option
                .name("f")
                .name("file")
                .kind(Kind::Path)
                .label("archive")
                .require()
                .help("Use the given archive file.")
        })
        .option(|option| {
            option
                .name("compression")
                .kind(Kind::Custom("compression".into()))
                .label("method")
                .default(Compression::None)
                .help("One of @|italic none|@, @|italic gzip|@ or @|italic zstd|@.")
        })
        .option(|option| {
            option
                .name("exclude")
                .many()
                .split(",")
                .label("pattern")
                .help("Skip the files matching one of the comma separated patterns.")
        })
        .position(|position| position.key("files").kind(Kind::Path).many().help("The files to add or extract."))
        .build()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let parser = match parser() {
        Ok(parser) => parser,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    let root = match parser.parse() {
        Ok(mut results) => results.remove(0),
        Err(error) => {
            eprintln!("{error}\n\n{}", parser.help_for(&error));
            return ExitCode::from(2);
        }
    };
    if root.help_requested() {
        print!("{}", parser.help());
        return ExitCode::SUCCESS;
    }
    if root.version_requested() {
        println!("archive {}", parser.version().unwrap_or_default());
        return ExitCode::SUCCESS;
    }

    let file = root.get::<PathBuf>("file").unwrap_or_default();
    let compression = root.custom::<Compression>("compression").copied();
    let files = root.get::<Vec<PathBuf>>("files").unwrap_or_default();
    let excluded = root.get::<Vec<String>>("exclude").unwrap_or_default();
    let mode = match (root.get::<bool>("create"), root.get::<bool>("extract")) {
        (Some(true), _) => "create",
        (_, Some(true)) => "extract",
        _ => "list",
    };
    info!(mode, file = %file.display(), ?compression, count = files.len(), "archive");
    for path in files {
        if root.get::<bool>("verbose") == Some(true) {
            println!("{}", path.display());
        }
    }
    if !excluded.is_empty() {
        println!("excluding {}", excluded.join(", "));
    }
    ExitCode::SUCCESS
}
