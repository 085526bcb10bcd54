/*!
Linear constraints, and the conversion from formula atoms.

A constraint is `Σ cᵢ·xᵢ ⋈ bound` with `⋈` one of ≤, <, =, ≠. The set is
closed under negation: `¬(t ≤ b)` is `−t < −b`, `¬(t < b)` is `−t ≤ −b`, and
`¬(t = b)` is `t ≠ b`. Disequalities thus arise only from negated
equalities.

[convert] maps a model literal's term --- a theory relation, or the negation
of one --- to a constraint; boolean structure maps to `None` and is skipped
by the driver.
*/

use std::collections::BTreeMap;

use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::{
    formula::{SymbolId, Term, TermDb, TermId},
    types::err::LinearError,
};

/// Relations a constraint may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    /// Weak inequality.
    Le,

    /// Strict inequality.
    Lt,

    /// Equality.
    Eq,

    /// Disequality.
    Neq,
}

/// A linear constraint: `Σ coefficient·symbol ⋈ bound`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    /// Coefficients by symbol; zero coefficients are not stored.
    pub terms: BTreeMap<SymbolId, BigRational>,

    /// The relation between the sum and the bound.
    pub relation: Relation,

    /// The bound.
    pub bound: BigRational,
}

impl Constraint {
    /// The negation of the constraint.
    pub fn negated(&self) -> Constraint {
        let flipped = || {
            self.terms
                .iter()
                .map(|(symbol, coefficient)| (*symbol, -coefficient.clone()))
                .collect()
        };
        match self.relation {
            Relation::Le => Constraint {
                terms: flipped(),
                relation: Relation::Lt,
                bound: -self.bound.clone(),
            },
            Relation::Lt => Constraint {
                terms: flipped(),
                relation: Relation::Le,
                bound: -self.bound.clone(),
            },
            Relation::Eq => Constraint {
                terms: self.terms.clone(),
                relation: Relation::Neq,
                bound: self.bound.clone(),
            },
            Relation::Neq => Constraint {
                terms: self.terms.clone(),
                relation: Relation::Eq,
                bound: self.bound.clone(),
            },
        }
    }

    /// Whether an assignment satisfies the constraint; symbols without a
    /// value count as zero.
    pub fn satisfied_by(&self, assignment: &BTreeMap<SymbolId, BigRational>) -> bool {
        let mut total = BigRational::zero();
        for (symbol, coefficient) in &self.terms {
            if let Some(value) = assignment.get(symbol) {
                total += coefficient * value;
            }
        }
        match self.relation {
            Relation::Le => total <= self.bound,
            Relation::Lt => total < self.bound,
            Relation::Eq => total == self.bound,
            Relation::Neq => total != self.bound,
        }
    }
}

/// The linear form of a real term: coefficients plus a constant.
#[derive(Clone, Debug)]
pub(crate) struct LinearForm {
    pub(crate) coefficients: BTreeMap<SymbolId, BigRational>,
    pub(crate) constant: BigRational,
}

impl LinearForm {
    pub(crate) fn zero() -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant: BigRational::zero(),
        }
    }

    fn constant(value: BigRational) -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant: value,
        }
    }

    fn variable(symbol: SymbolId) -> Self {
        let mut coefficients = BTreeMap::new();
        coefficients.insert(symbol, BigRational::one());
        Self {
            coefficients,
            constant: BigRational::zero(),
        }
    }

    /// The sum of two forms. Cancelled symbols are dropped.
    pub(crate) fn add(mut self, other: LinearForm) -> LinearForm {
        for (symbol, coefficient) in other.coefficients {
            let cancelled = {
                let entry = self
                    .coefficients
                    .entry(symbol)
                    .or_insert_with(BigRational::zero);
                *entry += coefficient;
                entry.is_zero()
            };
            if cancelled {
                self.coefficients.remove(&symbol);
            }
        }
        self.constant += other.constant;
        self
    }

    /// The form scaled by a factor.
    pub(crate) fn scale(mut self, factor: &BigRational) -> LinearForm {
        if factor.is_zero() {
            return LinearForm::zero();
        }
        for coefficient in self.coefficients.values_mut() {
            *coefficient *= factor;
        }
        self.constant *= factor;
        self
    }

    /// The form scaled by minus one.
    pub(crate) fn negated(self) -> LinearForm {
        self.scale(&-BigRational::one())
    }

    /// The value of the form under an assignment; symbols without a value
    /// are given zero, and the default is recorded.
    pub(crate) fn evaluate(&self, assignment: &mut BTreeMap<SymbolId, BigRational>) -> BigRational {
        let mut total = self.constant.clone();
        for (symbol, coefficient) in &self.coefficients {
            let value = assignment
                .entry(*symbol)
                .or_insert_with(BigRational::zero);
            total += coefficient * &*value;
        }
        total
    }
}

/// The constraint of a model literal's term, if the term is a theory atom or
/// the negation of one; `None` for boolean structure.
pub fn convert(terms: &TermDb, id: TermId) -> Result<Option<Constraint>, LinearError> {
    match terms.term(id) {
        Term::Not(inner) => match atom_constraint(terms, *inner)? {
            Some(constraint) => Ok(Some(constraint.negated())),
            None => Ok(None),
        },
        _ => atom_constraint(terms, id),
    }
}

fn atom_constraint(terms: &TermDb, id: TermId) -> Result<Option<Constraint>, LinearError> {
    let (relation, lhs, rhs) = match terms.term(id) {
        Term::Eq(lhs, rhs) => (Relation::Eq, *lhs, *rhs),
        Term::Le(lhs, rhs) => (Relation::Le, *lhs, *rhs),
        Term::Lt(lhs, rhs) => (Relation::Lt, *lhs, *rhs),
        _ => return Ok(None),
    };

    let difference = linearize(terms, lhs)?.add(linearize(terms, rhs)?.negated());
    Ok(Some(Constraint {
        terms: difference.coefficients,
        relation,
        bound: -difference.constant,
    }))
}

/// Linearizes a real term, rejecting non-linear structure.
fn linearize(terms: &TermDb, id: TermId) -> Result<LinearForm, LinearError> {
    match terms.term(id) {
        Term::RealConst(value) => Ok(LinearForm::constant(value.clone())),

        Term::Symbol(symbol) => Ok(LinearForm::variable(*symbol)),

        Term::Add(args) => {
            let mut total = LinearForm::zero();
            for &arg in args {
                total = total.add(linearize(terms, arg)?);
            }
            Ok(total)
        }

        Term::Sub(args) => {
            let mut total = linearize(terms, args[0])?;
            for &arg in &args[1..] {
                total = total.add(linearize(terms, arg)?.negated());
            }
            Ok(total)
        }

        Term::Neg(arg) => Ok(linearize(terms, *arg)?.negated()),

        Term::Mul(lhs, rhs) => {
            let left = linearize(terms, *lhs)?;
            let right = linearize(terms, *rhs)?;
            if left.coefficients.is_empty() {
                Ok(right.scale(&left.constant))
            } else if right.coefficients.is_empty() {
                Ok(left.scale(&right.constant))
            } else {
                Err(LinearError::Nonlinear)
            }
        }

        Term::Div(lhs, rhs) => {
            let left = linearize(terms, *lhs)?;
            let right = linearize(terms, *rhs)?;
            if !right.coefficients.is_empty() || right.constant.is_zero() {
                return Err(LinearError::Division);
            }
            Ok(left.scale(&right.constant.recip()))
        }

        _ => Err(LinearError::Nonlinear),
    }
}
