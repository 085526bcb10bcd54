/*!
A decision procedure for conjunctions of linear constraints over the reals.

Equalities are removed by Gaussian elimination, the remaining inequalities by
Fourier–Motzkin elimination with strictness tracking, and disequalities by
splitting into the two strict sides. A satisfiable conjunction yields a
rational witness by walking the eliminations backwards and taking a point of
each surviving interval; an unsatisfiable one yields a core minimised by
deletion filtering, so blocking clauses learnt from it carry no redundant
literals.

Fourier–Motzkin is exponential in the worst case, which is acceptable at the
conjunction sizes a refinement loop produces.
*/

use std::collections::BTreeMap;

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::{formula::SymbolId, misc::log::targets, types::err::BackendError};

use super::{
    linear::{Constraint, LinearForm, Relation},
    AssertionId, TheoryBackend, TheoryModel,
};

/// The outcome of a check.
enum Outcome {
    Satisfiable(TheoryModel),
    Unsatisfiable(Vec<AssertionId>),
}

/// The solver: an assertion stack with frames.
#[derive(Default)]
pub struct LraSolver {
    assertions: Vec<Constraint>,
    frames: Vec<usize>,
    outcome: Option<Outcome>,
}

impl LraSolver {
    /// The number of constraints currently asserted.
    pub fn assertion_count(&self) -> usize {
        self.assertions.len()
    }
}

impl TheoryBackend for LraSolver {
    fn push(&mut self) {
        self.frames.push(self.assertions.len());
    }

    fn pop(&mut self) {
        if let Some(mark) = self.frames.pop() {
            self.assertions.truncate(mark);
        }
        self.outcome = None;
    }

    fn assert(&mut self, constraint: Constraint) -> AssertionId {
        self.assertions.push(constraint);
        self.assertions.len() - 1
    }

    fn check(&mut self) -> Result<bool, BackendError> {
        match solve(&self.assertions) {
            Some(model) => {
                log::debug!(target: targets::THEORY, "Conjunction satisfiable");
                self.outcome = Some(Outcome::Satisfiable(model));
                Ok(true)
            }
            None => {
                let core = minimise(&self.assertions);
                log::debug!(
                    target: targets::THEORY,
                    "Conjunction unsatisfiable, core of {} from {}",
                    core.len(),
                    self.assertions.len(),
                );
                self.outcome = Some(Outcome::Unsatisfiable(core));
                Ok(false)
            }
        }
    }

    fn unsat_core(&self) -> &[AssertionId] {
        match &self.outcome {
            Some(Outcome::Unsatisfiable(core)) => core,
            _ => &[],
        }
    }

    fn model(&self) -> Option<&TheoryModel> {
        match &self.outcome {
            Some(Outcome::Satisfiable(model)) => Some(model),
            _ => None,
        }
    }
}

/// An inequality row: `form ≤ 0`, or `form < 0` when strict.
#[derive(Clone)]
struct Row {
    form: LinearForm,
    strict: bool,
}

impl Row {
    /// The row of a constraint, moving the bound to the left-hand side.
    fn of(constraint: &Constraint) -> Row {
        let form = LinearForm {
            coefficients: constraint.terms.clone(),
            constant: -constraint.bound.clone(),
        };
        Row {
            form,
            strict: constraint.relation == Relation::Lt,
        }
    }

    /// The row with its form negated, strict. Used to split disequalities.
    fn flipped_strict(&self) -> Row {
        Row {
            form: self.form.clone().negated(),
            strict: true,
        }
    }

    /// Feasibility of a row without symbols.
    fn constant_feasible(&self) -> bool {
        debug_assert!(self.form.coefficients.is_empty());
        match self.strict {
            true => self.form.constant.is_negative(),
            false => !self.form.constant.is_positive(),
        }
    }
}

/// A bound on a symbol: the symbol is above (or below) the form, strictly or
/// weakly.
struct Bound {
    form: LinearForm,
    strict: bool,
}

/// Decides a conjunction, producing an assignment on satisfiability.
fn solve(constraints: &[Constraint]) -> Option<TheoryModel> {
    let mut equalities = Vec::new();
    let mut inequalities = Vec::new();
    let mut disequalities = Vec::new();

    for constraint in constraints {
        let row = Row::of(constraint);
        match constraint.relation {
            Relation::Eq => equalities.push(row),
            Relation::Le | Relation::Lt => inequalities.push(row),
            Relation::Neq => disequalities.push(row),
        }
    }

    let mut assignment = split_disequalities(&equalities, inequalities, &disequalities)?;

    // Give every mentioned symbol a value.
    for constraint in constraints {
        for symbol in constraint.terms.keys() {
            assignment.entry(*symbol).or_insert_with(BigRational::zero);
        }
    }
    debug_assert!(constraints
        .iter()
        .all(|constraint| constraint.satisfied_by(&assignment)));

    Some(assignment.into_iter().collect())
}

/// Splits each disequality `t ≠ 0` into `t < 0` or `−t < 0`, searching the
/// sides for a satisfiable system.
fn split_disequalities(
    equalities: &[Row],
    inequalities: Vec<Row>,
    disequalities: &[Row],
) -> Option<BTreeMap<SymbolId, BigRational>> {
    match disequalities.split_first() {
        None => solve_system(equalities.to_vec(), inequalities),

        Some((first, rest)) => {
            let mut below = inequalities.clone();
            below.push(Row {
                form: first.form.clone(),
                strict: true,
            });
            if let Some(assignment) = split_disequalities(equalities, below, rest) {
                return Some(assignment);
            }

            let mut above = inequalities;
            above.push(first.flipped_strict());
            split_disequalities(equalities, above, rest)
        }
    }
}

/// Decides equalities and inequalities, producing an assignment on
/// satisfiability.
fn solve_system(
    equalities: Vec<Row>,
    inequalities: Vec<Row>,
) -> Option<BTreeMap<SymbolId, BigRational>> {
    // Gaussian elimination: express a pivot symbol of each equality as an
    // affine form over the remainder.
    let mut solved: Vec<(SymbolId, LinearForm)> = Vec::new();

    for equality in equalities {
        let mut form = equality.form;
        for (symbol, expression) in &solved {
            substitute(&mut form, *symbol, expression);
        }

        let Some((&pivot, _)) = form.coefficients.iter().next() else {
            match form.constant.is_zero() {
                true => continue,
                false => return None,
            }
        };

        let coefficient = form
            .coefficients
            .remove(&pivot)
            .unwrap_or_else(BigRational::zero);
        // pivot·c + rest = 0, so pivot = rest / (−c).
        let expression = form.scale(&(-coefficient).recip());

        for (_, existing) in solved.iter_mut() {
            substitute(existing, pivot, &expression);
        }
        solved.push((pivot, expression));
    }

    // Substitute the solved symbols into the inequalities.
    let mut rows = Vec::new();
    for mut row in inequalities {
        for (symbol, expression) in &solved {
            substitute(&mut row.form, *symbol, expression);
        }
        match row.form.coefficients.is_empty() {
            true => {
                if !row.constant_feasible() {
                    return None;
                }
            }
            false => rows.push(row),
        }
    }

    // Fourier–Motzkin elimination, recording the bounds on each eliminated
    // symbol for the walk back.
    let mut eliminated: Vec<(SymbolId, Vec<Bound>, Vec<Bound>)> = Vec::new();

    loop {
        let Some(&symbol) = rows
            .iter()
            .flat_map(|row| row.form.coefficients.keys())
            .next()
        else {
            break;
        };

        let mut lowers: Vec<Bound> = Vec::new();
        let mut uppers: Vec<Bound> = Vec::new();
        let mut remainder = Vec::new();

        for mut row in rows {
            match row.form.coefficients.remove(&symbol) {
                None => remainder.push(row),
                Some(coefficient) => {
                    // c·s + rest ⋈ 0, so s ⋈ rest / (−c), with the direction
                    // given by the sign of c.
                    let upper = coefficient.is_positive();
                    let form = row.form.scale(&(-coefficient).recip());
                    let bound = Bound {
                        form,
                        strict: row.strict,
                    };
                    match upper {
                        true => uppers.push(bound),
                        false => lowers.push(bound),
                    }
                }
            }
        }

        // Combine each lower bound with each upper bound.
        rows = remainder;
        for lower in &lowers {
            for upper in &uppers {
                let form = lower.form.clone().add(upper.form.clone().negated());
                let row = Row {
                    form,
                    strict: lower.strict || upper.strict,
                };
                match row.form.coefficients.is_empty() {
                    true => {
                        if !row.constant_feasible() {
                            return None;
                        }
                    }
                    false => rows.push(row),
                }
            }
        }

        eliminated.push((symbol, lowers, uppers));
    }

    // Walk the eliminations backwards, taking a point of each interval.
    let mut assignment: BTreeMap<SymbolId, BigRational> = BTreeMap::new();

    for (symbol, lowers, uppers) in eliminated.into_iter().rev() {
        let mut highest_lower: Option<BigRational> = None;
        for bound in &lowers {
            let value = bound.form.evaluate(&mut assignment);
            if highest_lower.as_ref().is_none_or(|current| value > *current) {
                highest_lower = Some(value);
            }
        }

        let mut lowest_upper: Option<BigRational> = None;
        for bound in &uppers {
            let value = bound.form.evaluate(&mut assignment);
            if lowest_upper.as_ref().is_none_or(|current| value < *current) {
                lowest_upper = Some(value);
            }
        }

        let value = match (highest_lower, lowest_upper) {
            (None, None) => BigRational::zero(),
            (Some(lower), None) => lower + BigRational::one(),
            (None, Some(upper)) => upper - BigRational::one(),
            (Some(lower), Some(upper)) => {
                (lower + upper) / BigRational::from_integer(2.into())
            }
        };
        assignment.insert(symbol, value);
    }

    // Solved symbols take their expressions' values, later pivots first.
    for (symbol, expression) in solved.into_iter().rev() {
        let value = expression.evaluate(&mut assignment);
        assignment.insert(symbol, value);
    }

    Some(assignment)
}

/// Replaces a symbol in a form by an expression.
fn substitute(form: &mut LinearForm, symbol: SymbolId, expression: &LinearForm) {
    if let Some(coefficient) = form.coefficients.remove(&symbol) {
        let scaled = expression.clone().scale(&coefficient);
        let combined = std::mem::replace(form, LinearForm::zero()).add(scaled);
        *form = combined;
    }
}

/// Shrinks an unsatisfiable assertion set to an irreducible core by
/// deletion filtering.
fn minimise(assertions: &[Constraint]) -> Vec<AssertionId> {
    let mut kept: Vec<bool> = vec![true; assertions.len()];

    for candidate in 0..assertions.len() {
        kept[candidate] = false;
        let subset: Vec<Constraint> = assertions
            .iter()
            .enumerate()
            .filter(|(index, _)| kept[*index])
            .map(|(_, constraint)| constraint.clone())
            .collect();
        if solve(&subset).is_some() {
            kept[candidate] = true;
        }
    }

    kept.iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(index, _)| index)
        .collect()
}
