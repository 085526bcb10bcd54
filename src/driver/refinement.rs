/*!
The refinement loop.

One iteration: query the SAT backend, and on a propositional model assert the
theory literals of the model within a push/pop bracket and check the implied
conjunction. A consistent conjunction settles the query as satisfiable, with
the theory's witness recorded; a conflict yields an unsat core, whose
reverse-mapped literals form a blocking clause appended to both the
abstraction and the SAT backend before the next iteration.

The bracket is closed on every exit path, including errors, so no theory
frame outlives its iteration.

With k theory atoms the loop makes at most 2^k iterations, as each blocking
clause rules out at least one propositional model. An empty blocking clause
rules nothing out and is reported as an error instead of looping.
*/

use std::collections::HashMap;

use crate::{
    misc::log::targets,
    reports::Report,
    structures::literal::{CLiteral, Literal},
    theory::{linear, AssertionId, TheoryBackend},
    types::err::{BackendError, ErrorKind},
};

use super::{Driver, DriverState};

/// What a propositional model came to under the theory.
enum Candidate {
    /// The theory agrees; the witness has been recorded.
    Consistent,

    /// The theory refutes the model; the blocking clause to learn.
    Conflict(Vec<CLiteral>),
}

impl Driver {
    /// Decides the formula of the driver.
    ///
    /// A script annotated `:status unknown` is answered `Unknown` without
    /// any SAT or theory work, and the driver moves to its error state.
    pub fn check_sat(&mut self) -> Result<Report, ErrorKind> {
        match self.state {
            DriverState::Ready => {
                if self.expected == Some(Report::Unknown) {
                    self.state = DriverState::Error;
                    return Ok(Report::Unknown);
                }
                self.state = DriverState::Solving;
            }

            DriverState::Satisfiable | DriverState::Unsatisfiable => {
                return Ok(self.report());
            }

            DriverState::Solving | DriverState::Error => {
                return Err(ErrorKind::Backend(BackendError::Failure(
                    "query already failed or in progress".to_string(),
                )));
            }
        }

        let outcome = self.refine();
        match &outcome {
            Ok(Report::Satisfiable) => self.state = DriverState::Satisfiable,
            Ok(Report::Unsatisfiable) => self.state = DriverState::Unsatisfiable,
            Ok(Report::Unknown) | Err(_) => self.state = DriverState::Error,
        }
        outcome
    }

    fn refine(&mut self) -> Result<Report, ErrorKind> {
        loop {
            self.counters.iterations += 1;
            log::info!(target: targets::REFINEMENT, "Iteration {}", self.counters.iterations);

            if !self.sat.solve().map_err(ErrorKind::Backend)? {
                log::info!(target: targets::REFINEMENT, "Propositionally exhausted");
                return Ok(Report::Unsatisfiable);
            }

            let model = self.sat.model().to_vec();

            // One push/pop bracket per iteration, closed on every exit.
            self.theory.push();
            let examined = self.examine(&model);
            self.theory.pop();

            match examined? {
                Candidate::Consistent => return Ok(Report::Satisfiable),

                Candidate::Conflict(blocking) => {
                    if blocking.is_empty() {
                        return Err(ErrorKind::EmptyLearntClause);
                    }
                    log::debug!(target: targets::REFINEMENT, "Blocking clause: {blocking:?}");
                    self.counters.conflicts += 1;
                    self.abstraction.add_learned_clause(blocking.clone());
                    self.sat.add_clause(blocking);
                }
            }
        }
    }

    /// Asserts the theory literals of a propositional model and checks the
    /// conjunction. Assumes an open theory frame.
    fn examine(&mut self, model: &[CLiteral]) -> Result<Candidate, ErrorKind> {
        let mut origins: HashMap<AssertionId, CLiteral> = HashMap::new();

        for &literal in model {
            let expression = self.abstraction.expression_of(&mut self.terms, literal);
            // Boolean structure --- an input symbol, a Tseitin witness, or a
            // compound node --- holds nothing for the theory.
            let Some(constraint) = linear::convert(&self.terms, expression)? else {
                continue;
            };
            let id = self.theory.assert(constraint);
            origins.insert(id, literal);
        }
        log::debug!(
            target: targets::REFINEMENT,
            "{} theory literals of {} model literals",
            origins.len(),
            model.len(),
        );

        if self.theory.check().map_err(ErrorKind::Backend)? {
            self.witness = self.theory.model().cloned();
            Ok(Candidate::Consistent)
        } else {
            let blocking = self
                .theory
                .unsat_core()
                .iter()
                .filter_map(|id| origins.get(id))
                .map(|literal| literal.negate())
                .collect();
            Ok(Candidate::Conflict(blocking))
        }
    }
}
