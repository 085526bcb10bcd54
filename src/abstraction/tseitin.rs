/*!
Tseitin clausification.

Each compound sub-term receives an abstract atom, and clauses making the atom
equivalent to the connective applied to the child literals are emitted as the
recursion returns. A term seen twice reuses its atom and emits nothing, which
keeps the clause set linear in the dag size of the formula.

An `ite` over booleans is encoded through a fresh witness symbol `s`:
clauses gated on the condition make `s` agree with the taken branch ---
`(¬c ∨ ¬t ∨ s)`, `(¬c ∨ t ∨ ¬s)`, `(c ∨ ¬f ∨ s)`, `(c ∨ f ∨ ¬s)` --- while
the untaken branch stays unconstrained, and `s` stands for the ite wherever
it appears. The witness association is kept apart from the main table so
both directions of the table stay injective.

Recursion is bounded by a fuel parameter; running out is reported as
[ClausifyError::DepthExceeded] rather than overrunning the stack.
*/

use crate::{
    formula::{Sort, Term, TermDb, TermId},
    misc::log::targets,
    structures::literal::CLiteral,
    types::err::ClausifyError,
};

use super::Abstraction;

impl Abstraction {
    /// Clausifies a term, returning its literal.
    pub(super) fn clausify(
        &mut self,
        terms: &mut TermDb,
        term: TermId,
        fuel: usize,
    ) -> Result<CLiteral, ClausifyError> {
        if fuel == 0 {
            return Err(ClausifyError::DepthExceeded);
        }

        // A term seen before reuses its literal.
        if let Some(literal) = self.literal_of(terms, term) {
            return Ok(literal);
        }

        match terms.term(term).clone() {
            Term::Symbol(_) if terms.sort_of(term) == Sort::Bool => {
                Ok(self.register(term) as CLiteral)
            }

            // A theory atom abstracts to its own atom; no structure to encode.
            Term::Eq(..) | Term::Le(..) | Term::Lt(..) => {
                Ok(self.register(term) as CLiteral)
            }

            Term::BoolConst(value) => {
                let this = self.register(term) as CLiteral;
                match value {
                    true => self.clauses.push(vec![this]),
                    false => self.clauses.push(vec![-this]),
                }
                Ok(this)
            }

            Term::Not(child) => {
                let this = self.register(term) as CLiteral;
                let literal = self.clausify(terms, child, fuel - 1)?;
                self.clauses.push(vec![-this, -literal]);
                self.clauses.push(vec![literal, this]);
                Ok(this)
            }

            Term::Or(children) => {
                let this = self.register(term) as CLiteral;
                let mut literals = Vec::with_capacity(children.len());
                for child in children {
                    literals.push(self.clausify(terms, child, fuel - 1)?);
                }
                for &literal in &literals {
                    self.clauses.push(vec![-literal, this]);
                }
                let mut closure = Vec::with_capacity(literals.len() + 1);
                closure.push(-this);
                closure.extend(literals);
                self.clauses.push(closure);
                Ok(this)
            }

            Term::And(children) => {
                let this = self.register(term) as CLiteral;
                let mut literals = Vec::with_capacity(children.len());
                for child in children {
                    literals.push(self.clausify(terms, child, fuel - 1)?);
                }
                for &literal in &literals {
                    self.clauses.push(vec![-this, literal]);
                }
                let mut closure: Vec<CLiteral> = literals.iter().map(|literal| -literal).collect();
                closure.push(this);
                self.clauses.push(closure);
                Ok(this)
            }

            Term::Implies(antecedent, consequent) => {
                let this = self.register(term) as CLiteral;
                let premise = self.clausify(terms, antecedent, fuel - 1)?;
                let conclusion = self.clausify(terms, consequent, fuel - 1)?;
                self.clauses.push(vec![-this, -premise, conclusion]);
                self.clauses.push(vec![premise, this]);
                self.clauses.push(vec![-conclusion, this]);
                Ok(this)
            }

            Term::Iff(lhs, rhs) => {
                let this = self.register(term) as CLiteral;
                let left = self.clausify(terms, lhs, fuel - 1)?;
                let right = self.clausify(terms, rhs, fuel - 1)?;
                self.clauses.push(vec![-this, -left, right]);
                self.clauses.push(vec![-this, left, -right]);
                self.clauses.push(vec![-left, -right, this]);
                self.clauses.push(vec![left, right, this]);
                Ok(this)
            }

            Term::Ite(condition, then_branch, else_branch)
                if terms.sort_of(term) == Sort::Bool =>
            {
                let witness = terms.fresh_bool_symbol();
                let witness_atom = self.register(witness);
                self.ite_witnesses.insert(term, witness);
                let this = witness_atom as CLiteral;

                let chooses = self.clausify(terms, condition, fuel - 1)?;
                let taken = self.clausify(terms, then_branch, fuel - 1)?;
                let untaken = self.clausify(terms, else_branch, fuel - 1)?;

                // Under the condition the witness agrees with the then
                // branch, against it with the else branch.
                self.clauses.push(vec![-chooses, -taken, this]);
                self.clauses.push(vec![-chooses, taken, -this]);
                self.clauses.push(vec![chooses, -untaken, this]);
                self.clauses.push(vec![chooses, untaken, -this]);

                log::trace!(target: targets::CLAUSIFY, "ite witnessed by atom {witness_atom}");
                Ok(this)
            }

            node => Err(ClausifyError::UnsupportedNode(node.kind_name())),
        }
    }
}
