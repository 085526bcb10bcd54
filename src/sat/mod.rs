/*!
SAT backends.

A backend is a capability set: add a clause, solve, and read a complete
model. Clauses accumulate across solves --- anything added, including clauses
learnt during earlier queries, takes part in every later query.

Backends are advertised by name and selected at construction through
[backend_named]; a name outside the registry is an
[UnknownBackend](crate::types::err::ErrorKind::UnknownBackend) error.
*/

mod cdcl;
pub use cdcl::{CdclEngine, GenericEngine};

mod dpll;
pub use dpll::DpllEngine;

use crate::{
    structures::{clause::CClause, literal::CLiteral},
    types::err::{BackendError, ErrorKind},
};

/// The default backend name.
pub const DEFAULT_BACKEND: &str = "lutra";

/// The names advertised by the registry.
pub const BACKEND_NAMES: [&str; 2] = ["lutra", "dpll"];

/// The capability set of a SAT backend.
pub trait SatBackend {
    /// The advertised name of the backend.
    fn name(&self) -> &'static str;

    /// Adds a clause. The clause takes part in every later solve.
    ///
    /// A tautological clause is a no-op; an empty clause makes the backend
    /// unsatisfiable.
    fn add_clause(&mut self, clause: CClause);

    /// Decides satisfiability of the clauses added so far.
    fn solve(&mut self) -> Result<bool, BackendError>;

    /// The model of the most recent satisfiable solve: a complete assignment
    /// over atoms `1..=N`, each atom appearing as a literal of its value.
    fn model(&self) -> &[CLiteral];
}

/// A boxed backend by name, or an error for a name outside the registry.
pub fn backend_named(name: &str) -> Result<Box<dyn SatBackend>, ErrorKind> {
    match name {
        "lutra" => Ok(Box::new(CdclEngine::default())),
        "dpll" => Ok(Box::new(DpllEngine::default())),
        _ => Err(ErrorKind::UnknownBackend(name.to_string())),
    }
}
