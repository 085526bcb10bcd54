/*!
The driver --- ownership of the abstraction and both backends, and the
refinement dialogue between them.

A driver is built from a parsed script and a configuration: the script's
assertions conjoin to a single formula, the formula is clausified, and the
clause set is handed to the chosen SAT backend, so every clause is present
before the first query. [check_sat](Driver::check_sat) then alternates SAT
queries with theory checks until a verdict is reached; see [refinement].

Driver state is linear: `Ready → Solving → {Satisfiable, Unsatisfiable,
Error}`, with no transitions out of a terminal state. A second query on a
decided driver returns the recorded verdict without re-solving. A script
annotated `:status unknown` is answered without solving: the first query
returns `Unknown` and the driver moves straight to its error state.
*/

pub mod refinement;

use std::collections::BTreeMap;

use crate::{
    abstraction::Abstraction,
    config::Config,
    formula::{Sort, SymbolId, TermDb},
    misc::log::targets,
    parser::Script,
    reports::Report,
    sat::{self, SatBackend},
    theory::{lra::LraSolver, TheoryModel},
    types::err::ErrorKind,
};

/// The state of a driver. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Ready for a query.
    Ready,

    /// A query is in progress.
    Solving,

    /// The formula was found satisfiable.
    Satisfiable,

    /// The formula was found unsatisfiable.
    Unsatisfiable,

    /// A query failed; the driver will not accept another.
    Error,
}

impl From<DriverState> for Report {
    fn from(state: DriverState) -> Self {
        match state {
            DriverState::Satisfiable => Report::Satisfiable,
            DriverState::Unsatisfiable => Report::Unsatisfiable,
            _ => Report::Unknown,
        }
    }
}

/// Counters over a driver's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    /// Refinement iterations made.
    pub iterations: usize,

    /// Blocking clauses learned from theory conflicts.
    pub conflicts: usize,
}

/// The driver.
pub struct Driver {
    /// The configuration of the driver.
    pub config: Config,

    /// Counters for the driver's queries.
    pub counters: Counters,

    /// The term store of the formula.
    pub terms: TermDb,

    /// The abstraction table and clause set.
    pub abstraction: Abstraction,

    /// The SAT backend, as selected by the configuration.
    pub sat: Box<dyn SatBackend>,

    /// The theory backend.
    pub theory: LraSolver,

    /// The state of the driver.
    pub state: DriverState,

    /// The expectation of a `:status` annotation, if the script carried one.
    expected: Option<Report>,

    /// The theory witness of a satisfiable verdict.
    witness: Option<TheoryModel>,
}

impl Driver {
    /// A driver over a parsed script.
    pub fn new(config: Config, script: Script) -> Result<Driver, ErrorKind> {
        let mut sat = sat::backend_named(&config.sat_backend)?;

        let Script {
            mut terms,
            assertions,
            status,
            ..
        } = script;

        let formula = match assertions.len() {
            0 => terms.bool_const(true),
            1 => assertions[0],
            _ => terms.conj(assertions),
        };

        let abstraction = Abstraction::new(&mut terms, formula, config.clausifier_depth)?;
        for clause in abstraction.clauses() {
            sat.add_clause(clause.clone());
        }
        log::info!(
            target: targets::CLAUSIFY,
            "{} atoms, {} clauses",
            abstraction.atom_count(),
            abstraction.clauses().len(),
        );

        Ok(Driver {
            config,
            counters: Counters::default(),
            terms,
            abstraction,
            sat,
            theory: LraSolver::default(),
            state: DriverState::Ready,
            expected: status.map(Report::from),
            witness: None,
        })
    }

    /// The verdict recorded so far.
    pub fn report(&self) -> Report {
        Report::from(self.state)
    }

    /// The status expectation of the script, if any.
    pub fn expected_status(&self) -> Option<Report> {
        self.expected
    }

    /// The theory witness of a satisfiable verdict.
    pub fn witness(&self) -> Option<&TheoryModel> {
        self.witness.as_ref()
    }

    /// Checks a verdict against the script's `:status` expectation.
    pub fn confirm(&self, found: Report) -> Result<(), ErrorKind> {
        match self.expected {
            Some(expected) if expected != found => {
                Err(ErrorKind::ExpectedMismatch { expected, found })
            }
            _ => Ok(()),
        }
    }

    /// A readable rendering of the witness: one `name := value` line per
    /// declared real symbol, in declaration order.
    pub fn witness_lines(&self) -> Vec<String> {
        let Some(model) = &self.witness else {
            return Vec::new();
        };
        let values: BTreeMap<SymbolId, _> =
            model.iter().map(|(symbol, value)| (*symbol, value)).collect();

        let mut lines = Vec::new();
        for (id, symbol) in self.terms.symbols() {
            if symbol.sort != Sort::Real {
                continue;
            }
            match values.get(&id) {
                Some(value) => lines.push(format!("{} := {}", symbol.name, value)),
                None => lines.push(format!("{} := 0", symbol.name)),
            }
        }
        lines
    }
}
