/*!
Reports for a solve.
*/

/// High-level reports regarding a solve.
///
/// [Display](std::fmt::Display) renders the SMT-LIB answer tokens, which is
/// what the CLI prints for the final verdict.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Report {
    /// The formula is satisfiable.
    Satisfiable,

    /// The formula is unsatisfiable.
    Unsatisfiable,

    /// Satisfiability of the formula is unknown, for some reason.
    Unknown,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "sat"),
            Self::Unsatisfiable => write!(f, "unsat"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
