use clasp::{Ansi, Builder, Kind, Options, Parser};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn parser() -> Parser {
    Builder::new()
        .name("bench")
        .ansi(Ansi::Off)
        .options([Options::Help, Options::Version])
        .option(|option| option.name("v").name("verbose").flag())
        .option(|option| option.name("q").name("quiet").flag())
        .option(|option| option.name("o").name("output"))
        .option(|option| option.name("n").name("count").kind(Kind::Natural).default(1))
        .option(|option| option.name("D").map(Kind::String, Kind::String))
        .position(|position| position.key("files").many())
        .command(|command| {
            command
                .name("run")
                .option(|option| option.name("j").name("jobs").kind(Kind::Natural))
        })
        .build()
        .expect("the schema is valid")
}

fn parse(criterion: &mut Criterion) {
    let parser = parser();
    let arguments = [
        "-vq", "--output=out.txt", "-n", "8", "-Dkey=value", "a.txt", "b.txt", "--", "-c.txt",
    ];
    criterion.bench_function("parse", |bencher| {
        bencher.iter(|| parser.parse_with(black_box(arguments)))
    });
    criterion.bench_function("parse_sub_command", |bencher| {
        bencher.iter(|| parser.parse_with(black_box(["-v", "run", "--jobs", "4"])))
    });
    criterion.bench_function("unmatched_suggestions", |bencher| {
        bencher.iter(|| parser.parse_with(black_box(["--verbse"])))
    });
}

fn help(criterion: &mut Criterion) {
    let parser = parser();
    criterion.bench_function("help", |bencher| bencher.iter(|| black_box(&parser).help()));
}

criterion_group!(benches, parse, help);
criterion_main!(benches);
