/*!
A conflict-driven clause-learning engine.

The engine follows the usual dynamics: propagate the consequences of the
current partial assignment by the two-watched-literal scheme, analyse any
conflict to an asserting clause by resolution back to the first unique
implication point, backjump, and otherwise extend the assignment with a
decision until no atom lacks a value.

Learnt clauses are never forgotten and no restarts are made. The engine
serves a driver which relies on the clause set only ever growing between
queries, and clauses arrive between queries too: each solve re-runs
propagation over the root trail, so clauses added since the last query
settle into the watch scheme before any decision.

The engine is generic over a source of randomness, used only to lean the
polarity of decisions; with the default lean of zero decisions take saved
phases and runs on the same input repeat exactly.
*/

use rand::{Rng, SeedableRng};

use crate::{
    generic::split_mix::SplitMix64,
    misc::log::targets,
    structures::{
        atom::Atom,
        clause::{CClause, Clause},
        literal::{CLiteral, Literal},
    },
    types::err::BackendError,
};

use super::SatBackend;

/// An index into the clause store.
type ClauseIdx = usize;

/// The watch list slot of a literal.
fn watch_index(literal: CLiteral) -> usize {
    let atom = literal.atom() as usize;
    match literal.polarity() {
        true => atom * 2,
        false => atom * 2 + 1,
    }
}

/// A conflict-driven engine, parameterised to a source of randomness.
pub struct GenericEngine<R: Rng> {
    /// Clauses of two or more literals; the watched literals of a clause sit
    /// at positions 0 and 1.
    clauses: Vec<CClause>,

    /// Watch lists, two per atom, indexed by [watch_index].
    watches: Vec<Vec<ClauseIdx>>,

    /// Values of atoms; index zero is unused.
    values: Vec<Option<bool>>,

    /// The decision level at which each atom took its value.
    levels: Vec<u32>,

    /// The clause which forced each atom, if any.
    reasons: Vec<Option<ClauseIdx>>,

    /// Saved polarities, for phase saving.
    phases: Vec<bool>,

    /// The trail of valued literals, in order of valuation.
    trail: Vec<CLiteral>,

    /// Trail length at each decision.
    trail_marks: Vec<usize>,

    /// Head of the propagation queue, an index into the trail.
    queue_head: usize,

    /// Unit clauses awaiting their root valuation.
    pending_units: Vec<CLiteral>,

    /// Set once the clause set is known unsatisfiable.
    unsatisfiable: bool,

    /// The model of the most recent satisfiable solve.
    model: Vec<CLiteral>,

    /// Source of rng for polarity decisions.
    rng: R,

    /// Probability of deciding an atom positively rather than by its saved
    /// phase. Zero keeps decisions deterministic.
    pub polarity_lean: f64,
}

/// The engine over a fixed-seed [SplitMix64].
pub type CdclEngine = GenericEngine<SplitMix64>;

impl Default for CdclEngine {
    fn default() -> Self {
        Self::with_rng(SplitMix64::seed_from_u64(0))
    }
}

impl<R: Rng> GenericEngine<R> {
    /// An engine around the given source of randomness.
    pub fn with_rng(rng: R) -> Self {
        Self {
            clauses: Vec::new(),
            watches: vec![Vec::new(); 2],
            values: vec![None],
            levels: vec![0],
            reasons: vec![None],
            phases: vec![false],
            trail: Vec::new(),
            trail_marks: Vec::new(),
            queue_head: 0,
            pending_units: Vec::new(),
            unsatisfiable: false,
            model: Vec::new(),
            rng,
            polarity_lean: 0.0,
        }
    }

    /// Grows the atom tables to cover the given atom.
    fn ensure_atom(&mut self, atom: Atom) {
        let needed = atom as usize + 1;
        if self.values.len() < needed {
            self.values.resize(needed, None);
            self.levels.resize(needed, 0);
            self.reasons.resize(needed, None);
            self.phases.resize(needed, false);
            self.watches.resize(needed * 2, Vec::new());
        }
    }

    /// One past the highest atom mentioned so far.
    fn atom_limit(&self) -> usize {
        self.values.len()
    }

    fn decision_level(&self) -> u32 {
        self.trail_marks.len() as u32
    }

    /// The value of a literal on the current assignment.
    fn literal_value(&self, literal: CLiteral) -> Option<bool> {
        self.values[literal.atom() as usize].map(|value| value == literal.polarity())
    }

    /// Places a literal on the trail.
    fn assign(&mut self, literal: CLiteral, reason: Option<ClauseIdx>) {
        let atom = literal.atom() as usize;
        debug_assert!(self.values[atom].is_none());
        self.values[atom] = Some(literal.polarity());
        self.levels[atom] = self.decision_level();
        self.reasons[atom] = reason;
        self.phases[atom] = literal.polarity();
        self.trail.push(literal);
    }

    /// Unwinds the trail to the given decision level.
    fn backjump(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let mark = self.trail_marks[level as usize];
        for literal in self.trail.split_off(mark) {
            let atom = literal.atom() as usize;
            self.values[atom] = None;
            self.reasons[atom] = None;
        }
        self.trail_marks.truncate(level as usize);
        self.queue_head = self.trail.len();
    }

    /// Stores a deduplicated, non-tautological clause.
    fn insert_clause(&mut self, clause: CClause) {
        debug_assert_eq!(self.decision_level(), 0);
        match clause.len() {
            0 => self.unsatisfiable = true,
            1 => self.pending_units.push(clause[0]),
            _ => {
                let index = self.clauses.len();
                self.watches[watch_index(clause[0])].push(index);
                self.watches[watch_index(clause[1])].push(index);
                self.clauses.push(clause);
            }
        }
    }

    /// Propagates queued assignments. On conflict, the offending clause.
    fn propagate(&mut self) -> Result<(), ClauseIdx> {
        while self.queue_head < self.trail.len() {
            let literal = self.trail[self.queue_head];
            self.queue_head += 1;
            let false_literal = literal.negate();

            let list_index = watch_index(false_literal);
            let mut list = std::mem::take(&mut self.watches[list_index]);
            let mut kept = 0;
            let mut conflict = None;

            'watch_loop: for position in 0..list.len() {
                let index = list[position];

                if conflict.is_some() {
                    // A conflict ends the scan; the remaining watches stand.
                    list[kept] = index;
                    kept += 1;
                    continue 'watch_loop;
                }

                // Bring the falsified watch to position 1.
                {
                    let clause = &mut self.clauses[index];
                    if clause[0] == false_literal {
                        clause.swap(0, 1);
                    }
                    debug_assert_eq!(clause[1], false_literal);
                }

                let first = self.clauses[index][0];
                if self.literal_value(first) == Some(true) {
                    // Satisfied through the other watch.
                    list[kept] = index;
                    kept += 1;
                    continue 'watch_loop;
                }

                // Look beyond the watches for a replacement.
                let mut replacement = None;
                for slot in 2..self.clauses[index].len() {
                    let candidate = self.clauses[index][slot];
                    if self.literal_value(candidate) != Some(false) {
                        replacement = Some(slot);
                        break;
                    }
                }

                match replacement {
                    Some(slot) => {
                        // The clause moves to the replacement's list.
                        let clause = &mut self.clauses[index];
                        clause.swap(1, slot);
                        let moved = clause[1];
                        self.watches[watch_index(moved)].push(index);
                    }

                    None => {
                        list[kept] = index;
                        kept += 1;
                        match self.literal_value(first) {
                            None => self.assign(first, Some(index)),
                            Some(true) => {}
                            Some(false) => {
                                log::trace!(target: targets::SAT, "Conflict in clause {index}");
                                conflict = Some(index);
                            }
                        }
                    }
                }
            }

            list.truncate(kept);
            // Watches moved during the scan go to lists of non-false
            // literals, never back to this one.
            debug_assert!(self.watches[list_index].is_empty());
            self.watches[list_index] = list;

            if let Some(index) = conflict {
                return Err(index);
            }
        }
        Ok(())
    }

    /// Resolves from a conflict to an asserting clause.
    ///
    /// Returns the clause --- asserting literal first and, when the clause is
    /// long, a literal of the backjump level second --- together with the
    /// backjump level.
    fn analyze(&mut self, conflict: ClauseIdx) -> Result<(CClause, u32), BackendError> {
        let current = self.decision_level();
        let mut seen = vec![false; self.atom_limit()];
        let mut learnt: CClause = vec![0];
        let mut unresolved = 0usize;
        let mut pivot: Option<CLiteral> = None;
        let mut cursor = self.trail.len();
        let mut reason = conflict;

        loop {
            for slot in 0..self.clauses[reason].len() {
                let literal = self.clauses[reason][slot];
                if pivot == Some(literal) {
                    continue;
                }
                let atom = literal.atom() as usize;
                if seen[atom] || self.levels[atom] == 0 {
                    continue;
                }
                seen[atom] = true;
                match self.levels[atom] == current {
                    true => unresolved += 1,
                    false => learnt.push(literal),
                }
            }

            // The next trail literal involved in the conflict.
            loop {
                if cursor == 0 {
                    return Err(BackendError::Failure(
                        "conflict analysis exhausted the trail".to_string(),
                    ));
                }
                cursor -= 1;
                if seen[self.trail[cursor].atom() as usize] {
                    break;
                }
            }

            let literal = self.trail[cursor];
            seen[literal.atom() as usize] = false;
            unresolved -= 1;

            if unresolved == 0 {
                // The first unique implication point.
                learnt[0] = literal.negate();
                break;
            }

            reason = match self.reasons[literal.atom() as usize] {
                Some(index) => index,
                None => {
                    return Err(BackendError::Failure(
                        "conflict analysis resolved past a decision".to_string(),
                    ))
                }
            };
            pivot = Some(literal);
        }

        // A literal of the backjump level takes position 1.
        let mut level = 0;
        if learnt.len() > 1 {
            let mut deepest = 1;
            for slot in 2..learnt.len() {
                if self.levels[learnt[slot].atom() as usize]
                    > self.levels[learnt[deepest].atom() as usize]
                {
                    deepest = slot;
                }
            }
            learnt.swap(1, deepest);
            level = self.levels[learnt[1].atom() as usize];
        }

        Ok((learnt, level))
    }

    /// Stores an asserting clause and values its asserted literal.
    fn learn(&mut self, learnt: CClause) {
        let asserted = learnt[0];
        log::debug!(target: targets::SAT, "Learnt: {learnt:?}");

        match learnt.len() {
            1 => match self.literal_value(asserted) {
                Some(false) => self.unsatisfiable = true,
                Some(true) => {}
                None => self.assign(asserted, None),
            },
            _ => {
                let index = self.clauses.len();
                self.watches[watch_index(learnt[0])].push(index);
                self.watches[watch_index(learnt[1])].push(index);
                self.clauses.push(learnt);
                self.assign(asserted, Some(index));
            }
        }
    }

    /// The next decision, if some atom lacks a value.
    fn decide(&mut self) -> Option<CLiteral> {
        for atom in 1..self.atom_limit() {
            if self.values[atom].is_none() {
                let polarity = match self.polarity_lean > 0.0 {
                    true => self.rng.random_bool(self.polarity_lean),
                    false => self.phases[atom],
                };
                return Some(CLiteral::new(atom as Atom, polarity));
            }
        }
        None
    }

    /// Captures the complete assignment as a model.
    fn snapshot_model(&mut self) {
        self.model.clear();
        for atom in 1..self.atom_limit() {
            let value = self.values[atom].unwrap_or(false);
            self.model.push(CLiteral::new(atom as Atom, value));
        }
    }

    fn solve_internal(&mut self) -> Result<bool, BackendError> {
        if self.unsatisfiable {
            return Ok(false);
        }

        // Value units gathered since the last call, then re-run propagation
        // over the whole root trail so clauses added since settle in.
        for literal in std::mem::take(&mut self.pending_units) {
            match self.literal_value(literal) {
                Some(false) => {
                    self.unsatisfiable = true;
                    return Ok(false);
                }
                Some(true) => {}
                None => self.assign(literal, None),
            }
        }
        self.queue_head = 0;

        loop {
            match self.propagate() {
                Err(conflict) => {
                    if self.decision_level() == 0 {
                        self.unsatisfiable = true;
                        return Ok(false);
                    }
                    let (learnt, level) = self.analyze(conflict)?;
                    self.backjump(level);
                    self.learn(learnt);
                    if self.unsatisfiable {
                        return Ok(false);
                    }
                }

                Ok(()) => match self.decide() {
                    Some(literal) => {
                        log::trace!(target: targets::SAT, "Decision: {literal}");
                        self.trail_marks.push(self.trail.len());
                        self.assign(literal, None);
                    }
                    None => {
                        self.snapshot_model();
                        self.backjump(0);
                        return Ok(true);
                    }
                },
            }
        }
    }
}

impl<R: Rng> SatBackend for GenericEngine<R> {
    fn name(&self) -> &'static str {
        "lutra"
    }

    fn add_clause(&mut self, clause: CClause) {
        if clause.tautological() {
            return;
        }
        let mut deduplicated: CClause = Vec::with_capacity(clause.len());
        for literal in clause {
            self.ensure_atom(literal.atom());
            if !deduplicated.contains(&literal) {
                deduplicated.push(literal);
            }
        }
        self.insert_clause(deduplicated);
    }

    fn solve(&mut self) -> Result<bool, BackendError> {
        self.solve_internal()
    }

    fn model(&self) -> &[CLiteral] {
        &self.model
    }
}
