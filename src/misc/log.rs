/*!
Miscellaneous items related to [logging](log).

Calls to the log macro are made throughout the library, with targets to help
narrow output to the part of interest.

Note, no log implementation is provided by the library.
The CLI installs [env_logger](https://docs.rs/env_logger/latest/env_logger/)
with a filter derived from `--verbose`.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [refinement loop](crate::driver::refinement).
    pub const REFINEMENT: &str = "refinement";

    /// Logs related to [clausification](crate::abstraction).
    pub const CLAUSIFY: &str = "clausify";

    /// Logs related to the [SAT backends](crate::sat).
    pub const SAT: &str = "sat";

    /// Logs related to the [theory backend](crate::theory).
    pub const THEORY: &str = "theory";

    /// Logs related to [parsing](crate::parser).
    pub const PARSER: &str = "parser";
}
