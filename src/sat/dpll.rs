/*!
A chronological backtracking engine.

Unit propagation by direct clause scans, decisions in atom order, and
backtracking by flipping the most recent unflipped decision. Slow next to the
conflict-driven engine, though transparent; it earns its registry entry as a
cross-check.
*/

use crate::{
    misc::log::targets,
    structures::{
        atom::Atom,
        clause::{CClause, Clause},
        literal::{CLiteral, Literal},
    },
    types::err::BackendError,
};

use super::SatBackend;

/// The engine.
#[derive(Default)]
pub struct DpllEngine {
    clauses: Vec<CClause>,

    /// The highest atom mentioned by any clause.
    atom_limit: usize,

    /// Set once the clause set is known unsatisfiable.
    unsatisfiable: bool,

    /// The model of the most recent satisfiable solve.
    model: Vec<CLiteral>,
}

impl DpllEngine {
    /// Exhaustive search over assignments, guided by unit propagation.
    fn search(&mut self) -> bool {
        let limit = self.atom_limit;
        let mut values: Vec<Option<bool>> = vec![None; limit + 1];
        // The trail pairs each literal with whether its flip is untried.
        let mut trail: Vec<(CLiteral, bool)> = Vec::new();

        loop {
            match Self::propagate(&self.clauses, &mut values, &mut trail) {
                Ok(()) => {
                    match (1..=limit).find(|&atom| values[atom].is_none()) {
                        Some(atom) => {
                            let literal = CLiteral::new(atom as Atom, false);
                            values[atom] = Some(false);
                            trail.push((literal, true));
                        }
                        None => {
                            self.model = (1..=limit)
                                .map(|atom| {
                                    CLiteral::new(atom as Atom, values[atom].unwrap_or(false))
                                })
                                .collect();
                            return true;
                        }
                    }
                }

                Err(()) => loop {
                    match trail.pop() {
                        None => return false,
                        Some((literal, flippable)) => {
                            values[literal.atom() as usize] = None;
                            if flippable {
                                let flipped = literal.negate();
                                values[flipped.atom() as usize] = Some(flipped.polarity());
                                trail.push((flipped, false));
                                break;
                            }
                        }
                    }
                },
            }
        }
    }

    /// Scans for unit clauses until saturation. `Err` on a falsified clause.
    fn propagate(
        clauses: &[CClause],
        values: &mut [Option<bool>],
        trail: &mut Vec<(CLiteral, bool)>,
    ) -> Result<(), ()> {
        'scan: loop {
            for clause in clauses {
                let mut unassigned = None;
                let mut open = 0;
                let mut satisfied = false;

                for &literal in clause {
                    match values[literal.atom() as usize] {
                        None => {
                            open += 1;
                            if unassigned.is_none() {
                                unassigned = Some(literal);
                            }
                        }
                        Some(value) if value == literal.polarity() => {
                            satisfied = true;
                            break;
                        }
                        Some(_) => {}
                    }
                }

                if satisfied {
                    continue;
                }
                match open {
                    0 => return Err(()),
                    1 => {
                        let Some(literal) = unassigned else { continue };
                        values[literal.atom() as usize] = Some(literal.polarity());
                        trail.push((literal, false));
                        continue 'scan;
                    }
                    _ => {}
                }
            }
            return Ok(());
        }
    }
}

impl SatBackend for DpllEngine {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn add_clause(&mut self, clause: CClause) {
        if clause.tautological() {
            return;
        }
        let mut deduplicated: CClause = Vec::with_capacity(clause.len());
        for literal in clause {
            self.atom_limit = self.atom_limit.max(literal.atom() as usize);
            if !deduplicated.contains(&literal) {
                deduplicated.push(literal);
            }
        }
        if deduplicated.is_empty() {
            self.unsatisfiable = true;
            return;
        }
        self.clauses.push(deduplicated);
    }

    fn solve(&mut self) -> Result<bool, BackendError> {
        if self.unsatisfiable {
            return Ok(false);
        }
        let verdict = self.search();
        log::debug!(target: targets::SAT, "dpll verdict: {verdict}");
        Ok(verdict)
    }

    fn model(&self) -> &[CLiteral] {
        &self.model
    }
}
