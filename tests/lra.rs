use num_rational::BigRational;
use num_traits::Zero;

use lutra_smt::{
    formula::{Sort, TermDb, TermId},
    theory::{
        linear::{self, Constraint, Relation},
        lra::LraSolver,
        TheoryBackend,
    },
    types::err::LinearError,
};

fn rational(value: i64) -> BigRational {
    BigRational::from_integer(value.into())
}

/// A store with two real symbols.
fn reals() -> (TermDb, TermId, TermId) {
    let mut terms = TermDb::new();
    let x = terms.declare_symbol("x", Sort::Real).unwrap();
    let y = terms.declare_symbol("y", Sort::Real).unwrap();
    (terms, x, y)
}

fn constraint_of(terms: &TermDb, atom: TermId) -> Constraint {
    linear::convert(terms, atom).unwrap().unwrap()
}

mod conversion {
    use super::*;

    #[test]
    fn weak_bound() {
        let (mut terms, x, _) = reals();
        let three = terms.real_const(rational(3));
        let atom = terms.le(x, three).unwrap();

        let constraint = constraint_of(&terms, atom);
        assert_eq!(constraint.relation, Relation::Le);
        assert_eq!(constraint.bound, rational(3));
        assert_eq!(constraint.terms.len(), 1);
    }

    #[test]
    fn negation_flips() {
        let (mut terms, x, _) = reals();
        let one = terms.real_const(rational(1));
        let atom = terms.le(x, one).unwrap();
        let negated = terms.not(atom).unwrap();

        // ¬(x ≤ 1) is −x < −1.
        let constraint = constraint_of(&terms, negated);
        assert_eq!(constraint.relation, Relation::Lt);
        assert_eq!(constraint.bound, rational(-1));
        assert_eq!(constraint.terms.values().next().unwrap(), &rational(-1));
    }

    #[test]
    fn negated_equality_is_disequality() {
        let (mut terms, x, _) = reals();
        let zero = terms.real_const(rational(0));
        let atom = terms.eq(x, zero).unwrap();
        let negated = terms.not(atom).unwrap();

        let constraint = constraint_of(&terms, negated);
        assert_eq!(constraint.relation, Relation::Neq);
    }

    #[test]
    fn coefficients_combine() {
        // 2·x + x − y ≤ 4 carries coefficient 3 on x.
        let (mut terms, x, y) = reals();
        let two = terms.real_const(rational(2));
        let four = terms.real_const(rational(4));
        let scaled = terms.mul(two, x).unwrap();
        let sum = terms.add(vec![scaled, x]).unwrap();
        let difference = terms.sub(vec![sum, y]).unwrap();
        let atom = terms.le(difference, four).unwrap();

        let constraint = constraint_of(&terms, atom);
        let mut values = constraint.terms.values();
        assert_eq!(values.next().unwrap(), &rational(3));
        assert_eq!(values.next().unwrap(), &rational(-1));
    }

    #[test]
    fn division_scales() {
        let (mut terms, x, _) = reals();
        let two = terms.real_const(rational(2));
        let one = terms.real_const(rational(1));
        let halved = terms.div(x, two).unwrap();
        let atom = terms.le(halved, one).unwrap();

        let constraint = constraint_of(&terms, atom);
        assert_eq!(
            constraint.terms.values().next().unwrap(),
            &BigRational::new(1.into(), 2.into())
        );
    }

    #[test]
    fn boolean_structure_is_skipped() {
        let mut terms = TermDb::new();
        let p = terms.declare_symbol("p", Sort::Bool).unwrap();
        assert_eq!(linear::convert(&terms, p), Ok(None));

        let negated = terms.not(p).unwrap();
        assert_eq!(linear::convert(&terms, negated), Ok(None));
    }

    #[test]
    fn nonlinear_is_rejected() {
        let (mut terms, x, y) = reals();
        let zero = terms.real_const(rational(0));
        let product = terms.mul(x, y).unwrap();
        let atom = terms.eq(product, zero).unwrap();

        assert_eq!(linear::convert(&terms, atom), Err(LinearError::Nonlinear));
    }

    #[test]
    fn division_by_zero_is_rejected() {
        let (mut terms, x, _) = reals();
        let zero = terms.real_const(rational(0));
        let quotient = terms.div(x, zero).unwrap();
        let atom = terms.le(quotient, zero).unwrap();

        assert_eq!(linear::convert(&terms, atom), Err(LinearError::Division));
    }
}

mod decisions {
    use super::*;

    /// Asserts each atom of a conjunction and checks it.
    fn check(terms: &TermDb, atoms: &[TermId]) -> (LraSolver, bool) {
        let mut solver = LraSolver::default();
        solver.push();
        for &atom in atoms {
            solver.assert(constraint_of(terms, atom));
        }
        let verdict = solver.check().unwrap();
        (solver, verdict)
    }

    #[test]
    fn window_and_conflict() {
        let (mut terms, x, _) = reals();
        let one = terms.real_const(rational(1));
        let two = terms.real_const(rational(2));
        let low = terms.ge(x, one).unwrap();
        let high = terms.le(x, two).unwrap();
        let tight = terms.ge(x, two).unwrap();
        let cap = terms.le(x, one).unwrap();

        let (_, verdict) = check(&terms, &[low, high]);
        assert!(verdict);

        let (solver, verdict) = check(&terms, &[cap, tight]);
        assert!(!verdict);
        assert_eq!(solver.unsat_core(), &[0, 1]);
    }

    #[test]
    fn strictness_matters() {
        let (mut terms, x, _) = reals();
        let one = terms.real_const(rational(1));
        let strict = terms.lt(x, one).unwrap();
        let weak = terms.ge(x, one).unwrap();

        let (_, verdict) = check(&terms, &[strict, weak]);
        assert!(!verdict);

        let le = terms.le(x, one).unwrap();
        let (_, verdict) = check(&terms, &[le, weak]);
        assert!(verdict);
    }

    #[test]
    fn equalities_substitute() {
        let (mut terms, x, y) = reals();
        let one = terms.real_const(rational(1));
        let two = terms.real_const(rational(2));
        let sum = terms.add(vec![y, one]).unwrap();
        let link = terms.eq(x, sum).unwrap();
        let fixed = terms.eq(y, two).unwrap();

        let (solver, verdict) = check(&terms, &[link, fixed]);
        assert!(verdict);

        let model = solver.model().unwrap();
        assert_eq!(model[0].1, rational(3)); // x
        assert_eq!(model[1].1, rational(2)); // y
    }

    #[test]
    fn disequality_splits() {
        let (mut terms, x, _) = reals();
        let zero = terms.real_const(rational(0));
        let equal = terms.eq(x, zero).unwrap();
        let apart = terms.not(equal).unwrap();

        let (solver, verdict) = check(&terms, &[apart]);
        assert!(verdict);
        assert!(!solver.model().unwrap()[0].1.is_zero());

        let low = terms.ge(x, zero).unwrap();
        let high = terms.le(x, zero).unwrap();
        let (solver, verdict) = check(&terms, &[low, high, apart]);
        assert!(!verdict);
        assert_eq!(solver.unsat_core().len(), 3);
    }

    #[test]
    fn witness_satisfies_the_conjunction() {
        let (mut terms, x, y) = reals();
        let one = terms.real_const(rational(1));
        let ten = terms.real_const(rational(10));
        let low = terms.lt(one, x).unwrap();
        let link = terms.le(x, y).unwrap();
        let high = terms.lt(y, ten).unwrap();
        let atoms = [low, link, high];

        let (solver, verdict) = check(&terms, &atoms);
        assert!(verdict);

        let assignment: std::collections::BTreeMap<_, _> =
            solver.model().unwrap().iter().cloned().collect();
        for atom in atoms {
            assert!(constraint_of(&terms, atom).satisfied_by(&assignment));
        }
    }

    #[test]
    fn frames_pop() {
        let (mut terms, x, _) = reals();
        let one = terms.real_const(rational(1));
        let two = terms.real_const(rational(2));
        let cap = terms.le(x, one).unwrap();
        let floor = terms.ge(x, two).unwrap();

        let mut solver = LraSolver::default();
        solver.push();
        solver.assert(constraint_of(&terms, cap));
        solver.assert(constraint_of(&terms, floor));
        assert_eq!(solver.check(), Ok(false));
        solver.pop();
        assert_eq!(solver.assertion_count(), 0);

        solver.push();
        solver.assert(constraint_of(&terms, floor));
        assert_eq!(solver.check(), Ok(true));
        solver.pop();
    }
}
