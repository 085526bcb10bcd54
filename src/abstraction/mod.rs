/*!
The boolean abstraction --- a bijective map between abstract atoms and
formula terms, together with the Tseitin clause set.

[Abstraction::new] pre-registers every atom of the input formula in traversal
order, so atom numbering is independent of the order in which compound
structure is clausified and stable across runs on the same input. It then
clausifies the boolean structure (see [tseitin]) and closes with a unit
clause asserting the formula.

The refinement loop appends blocking clauses through
[Abstraction::add_learned_clause]; the clause sequence only ever grows.

Negation is not materialised in the table: the literal of a term `¬e` is the
negated atom of `e` whenever `e` is registered. A `¬e` over compound `e`
receives an atom of its own only when it turns up as a sub-term in need of
wiring, which the clausifier arranges.
*/

mod tseitin;

use std::collections::HashMap;

use crate::{
    formula::{Term, TermDb, TermId},
    structures::{
        atom::Atom,
        clause::CClause,
        literal::{CLiteral, Literal},
    },
    types::err::ClausifyError,
};

/// The abstraction table and clause set.
#[derive(Debug, Default)]
pub struct Abstraction {
    /// The term of each abstract atom, indexed by atom less one.
    term_of_atom: Vec<TermId>,

    /// The abstract atom of each registered term.
    atom_of_term: HashMap<TermId, Atom>,

    /// Witness symbols standing for ite terms.
    ite_witnesses: HashMap<TermId, TermId>,

    /// The clause sequence: Tseitin clauses, the top-level unit, and any
    /// learned clauses, in order of addition.
    clauses: Vec<CClause>,
}

impl Abstraction {
    /// Builds the abstraction of a formula: registers its atoms, emits the
    /// Tseitin clauses, and asserts the formula with a unit clause.
    pub fn new(
        terms: &mut TermDb,
        formula: TermId,
        depth_bound: usize,
    ) -> Result<Self, ClausifyError> {
        let mut abstraction = Self::default();

        for atom in terms.atoms(formula) {
            abstraction.register(atom);
        }

        let top = abstraction.clausify(terms, formula, depth_bound)?;
        abstraction.clauses.push(vec![top]);

        Ok(abstraction)
    }

    /// Registers a term, or returns its atom if already registered.
    ///
    /// Atoms are handed out in registration order and never renumbered.
    fn register(&mut self, term: TermId) -> Atom {
        if let Some(atom) = self.atom_of_term.get(&term) {
            return *atom;
        }
        self.term_of_atom.push(term);
        let atom = self.term_of_atom.len() as Atom;
        self.atom_of_term.insert(term, atom);
        atom
    }

    /// The literal of a term, if registered: the atom of the term, the
    /// negated atom of `e` for a term `¬e`, or the atom of the witness for
    /// an ite term.
    pub fn literal_of(&self, terms: &TermDb, term: TermId) -> Option<CLiteral> {
        if let Some(atom) = self.atom_of_term.get(&term) {
            return Some(*atom as CLiteral);
        }
        if let Term::Not(inner) = terms.term(term) {
            if let Some(atom) = self.atom_of_term.get(inner) {
                return Some(-(*atom as CLiteral));
            }
        }
        if let Some(witness) = self.ite_witnesses.get(&term) {
            return self.atom_of_term.get(witness).map(|atom| *atom as CLiteral);
        }
        None
    }

    /// The term of a literal. For a negative literal, the negation of the
    /// term of the literal's atom.
    pub fn expression_of(&self, terms: &mut TermDb, literal: CLiteral) -> TermId {
        let term = self.term_of_atom[literal.atom() as usize - 1];
        match literal.polarity() {
            true => term,
            false => terms.negate(term),
        }
    }

    /// The term of an atom.
    pub fn term_of(&self, atom: Atom) -> TermId {
        self.term_of_atom[atom as usize - 1]
    }

    /// The number of abstract atoms.
    pub fn atom_count(&self) -> usize {
        self.term_of_atom.len()
    }

    /// The clause sequence.
    pub fn clauses(&self) -> &[CClause] {
        &self.clauses
    }

    /// Appends a clause over already registered literals.
    pub fn add_learned_clause(&mut self, clause: CClause) {
        debug_assert!(clause
            .iter()
            .all(|literal| (literal.atom() as usize) <= self.term_of_atom.len()));
        self.clauses.push(clause);
    }
}
