use clasp::{Builder, Error, Kind, Options, Parser, Section};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn parser() -> Result<Parser, Error> {
    Builder::new()
        .name("status")
        .version(env!("CARGO_PKG_VERSION"))
        .description("Reports on the services of a host.")
        .heading(Section::Commands, "@|bold,underline Services|@:\n")
        .terminal_width()
        .options([Options::Help, Options::Version])
        .option(|option| option.name("H").name("host").kind(Kind::Address).default("127.0.0.1").help("The host to query."))
        .option(|option| option.name("q").name("quiet").flag().help("Only report failures."))
        .option(|option| {
            option
                .name("format")
                .kind(Kind::Choice(vec!["text".into(), "json".into()]))
                .default("text")
                .help("How to print the report.")
        })
        .command(|command| {
            command
                .name("check")
                .description("Checks one or more services.")
                .options([Options::Help])
                .option(|option| option.name("t").name("timeout").kind(Kind::Natural).default(5).help("Seconds to wait per service."))
                .option(|option| option.name("L").name("label").map(Kind::String, Kind::String).help("Only check services with these KEY=VALUE labels."))
                .position(|position| position.key("services").many().arity("1..*").help("The services to check."))
        })
        .command(|command| {
            command
                .name("watch")
                .description("Checks services repeatedly.")
                .options([Options::Help])
                .option(|option| option.name("i").name("interval").kind(Kind::Float).default(1.5))
                .position(|position| position.key("service"))
        })
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
    let results = match parser.parse() {
        Ok(results) => results,
        Err(error) => {
            eprintln!("{error}\n\n{}", parser.help_for(&error));
            return ExitCode::from(2);
        }
    };
    if let Some(level) = results.iter().rev().find(|level| level.help_requested()) {
        let command = parser.find(level.path()).unwrap_or(&parser);
        print!("{}", command.help());
        return ExitCode::SUCCESS;
    }
    if results[0].version_requested() {
        println!("status {}", parser.version().unwrap_or_default());
        return ExitCode::SUCCESS;
    }

    let root = &results[0];
    let host = root.get::<String>("host").unwrap_or_default();
    let format = root.get::<String>("format").unwrap_or_default();
    debug!(%host, %format, levels = results.len(), "parsed");
    match results.get(1) {
        Some(check) if check.path() == ["check"] => {
            let services = check.get::<Vec<String>>("services").unwrap_or_default();
            let timeout = check.get::<u64>("timeout").unwrap_or(5);
            for service in services {
                println!("{host}: checking {service} (timeout {timeout}s)");
            }
        }
        Some(watch) => {
            let service = watch.get::<String>("service").unwrap_or_default();
            let interval = watch.get::<f64>("interval").unwrap_or(1.5);
            println!("{host}: watching {service} every {interval}s");
        }
        None => print!("{}", parser.help()),
    }
    ExitCode::SUCCESS
}
