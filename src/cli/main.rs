/*!
A command line interface to the library.

# Use

```sh
lutra_cli [--sat-solver NAME] [--dump-models] [--verbose LEVEL] file.smt2
```

The verdict --- `sat`, `unsat`, or `unknown` --- is printed alone on stdout.
Diagnostics go to stderr, error messages with an `error:` prefix. The exit
code is 0 when a verdict was reached and agrees with any `:status`
annotation of the input, and 1 otherwise.

An input annotated `(set-info :status unknown)` is answered `unknown`
without solving, with exit code 1.
*/

use lutra_smt::{
    config::Config,
    driver::Driver,
    parser::{self, Status},
    reports::Report,
};

mod args;

/// Entrypoint to the CLI.
fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let matches = args::command().get_matches();

    let mut config = Config::default();
    if let Some(name) = matches.get_one::<String>("sat_solver") {
        config.sat_backend = name.clone();
    }
    config.dump_models = matches.get_flag("dump_models");
    if let Some(level) = matches.get_one::<u8>("verbose") {
        config.verbosity = *level;
    }

    init_logging(config.verbosity);

    let Some(path) = matches.get_one::<String>("path").cloned() else {
        eprintln!("error: no input file");
        return 1;
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {path}: {e}");
            return 1;
        }
    };

    let script = match parser::parse(&source) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    // An input marked unknown is answered without solving.
    if script.status == Some(Status::Unknown) {
        println!("{}", Report::Unknown);
        return 1;
    }

    let mut driver = match Driver::new(config.clone(), script) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let report = match driver.check_sat() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    println!("{report}");

    if config.dump_models && report == Report::Satisfiable {
        for line in driver.witness_lines() {
            println!("{line}");
        }
    }

    if let Err(e) = driver.confirm(report) {
        eprintln!("error: {e}");
        return 1;
    }

    0
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}
