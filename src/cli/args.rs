use clap::{value_parser, Arg, ArgAction, Command};

use lutra_smt::sat;

/// The argument signature of the CLI.
pub fn command() -> Command {
    Command::new("lutra_cli")
        .about("Decides satisfiability of an SMT-LIB v2 script over QF_LRA")
        .arg(
            Arg::new("sat_solver")
                .short('s')
                .long("sat-solver")
                .value_name("NAME")
                .value_parser(value_parser!(String))
                .num_args(1)
                .default_value(sat::DEFAULT_BACKEND)
                .help(format!(
                    "The SAT backend to use.
Known backends: {}",
                    sat::BACKEND_NAMES.join(", ")
                )),
        )
        .arg(
            Arg::new("dump_models")
                .short('m')
                .long("dump-models")
                .action(ArgAction::SetTrue)
                .help("Print the theory model on a satisfiable verdict."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_name("LEVEL")
                .value_parser(value_parser!(u8))
                .num_args(1)
                .default_value("0")
                .help("Diagnostic verbosity on stderr: 0 silent, 1 info, 2 debug, 3 trace."),
        )
        .arg(
            Arg::new("path")
                .required(true)
                .num_args(1)
                .value_name("FILE")
                .help("The SMT-LIB v2 file to decide."),
        )
}
