/*!
Configuration of a solve.

All configuration is contained in a [Config], built by the CLI from its
arguments or programmatically. Verbosity is carried here rather than in
process-wide state; it gates diagnostic output only and has no effect on the
verdict.
*/

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// The name of the SAT backend to use, checked against the registry at
    /// driver construction.
    pub sat_backend: String,

    /// Whether to report a theory model on a satisfiable verdict.
    pub dump_models: bool,

    /// Diagnostic verbosity. Zero is silent.
    pub verbosity: u8,

    /// The bound on clausifier recursion depth.
    ///
    /// Passing the bound is reported as an error rather than risking the
    /// stack on a pathological input.
    pub clausifier_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sat_backend: crate::sat::DEFAULT_BACKEND.to_string(),
            dump_models: false,
            verbosity: 0,
            clausifier_depth: 2048,
        }
    }
}
