//! Clauses, aka. collections of literals interpreted disjunctively.
//!
//! Order within a clause carries no meaning, though it is preserved for
//! deterministic output.

use crate::structures::literal::{CLiteral, Literal};

/// The canonical representation of a clause: a vector of literals.
pub type CClause = Vec<CLiteral>;

/// Clause methods shared by the backends.
pub trait Clause {
    /// The number of literals in the clause.
    fn size(&self) -> usize;

    /// Whether the clause contains some literal together with its negation.
    fn tautological(&self) -> bool;
}

impl Clause for CClause {
    fn size(&self) -> usize {
        self.len()
    }

    fn tautological(&self) -> bool {
        self.iter().any(|literal| self.contains(&literal.negate()))
    }
}
