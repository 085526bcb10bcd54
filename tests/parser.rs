use lutra_smt::{
    formula::{Sort, Term},
    parser::{parse, Status},
    theory::linear,
    types::err::ParseError,
};

mod commands {
    use super::*;

    #[test]
    fn declarations_and_assertions() {
        let script = parse(
            "(set-logic QF_LRA)
             (declare-const x Real)
             (declare-fun p () Bool)
             (assert (or p (<= x 3)))
             (check-sat)",
        )
        .unwrap();

        assert_eq!(script.logic.as_deref(), Some("QF_LRA"));
        assert_eq!(script.assertions.len(), 1);
        assert_eq!(script.checks, 1);
        assert_eq!(script.status, None);
    }

    #[test]
    fn status_annotations() {
        let script = parse("(set-info :status unsat)").unwrap();
        assert_eq!(script.status, Some(Status::Unsat));

        let script = parse("(set-info :status unknown)").unwrap();
        assert_eq!(script.status, Some(Status::Unknown));

        // Other infos and options are accepted and ignored.
        let script = parse(
            "(set-info :source |hand written|)
             (set-option :produce-models true)
             (set-info :status sat)",
        )
        .unwrap();
        assert_eq!(script.status, Some(Status::Sat));
    }

    #[test]
    fn comments_are_skipped() {
        let script = parse(
            "; a preamble
             (declare-const x Real) ; trailing
             (assert (< x 0))",
        )
        .unwrap();
        assert_eq!(script.assertions.len(), 1);
    }

    #[test]
    fn trailing_commands_are_harmless() {
        let script = parse(
            "(declare-const p Bool)
             (assert p)
             (check-sat)
             (get-model)
             (exit)",
        )
        .unwrap();
        assert_eq!(script.checks, 1);
    }

    #[test]
    fn unsupported_command() {
        assert!(matches!(
            parse("(define-fun f () Bool true)"),
            Err(ParseError::UnsupportedCommand(command)) if command == "define-fun"
        ));
    }

    #[test]
    fn functions_with_arguments_are_rejected() {
        assert!(matches!(
            parse("(declare-fun f (Real) Real)"),
            Err(ParseError::UnsupportedCommand(_))
        ));
    }
}

mod declarations {
    use super::*;

    #[test]
    fn redeclaration() {
        assert!(matches!(
            parse("(declare-const x Real) (declare-const x Bool)"),
            Err(ParseError::Redeclaration(name)) if name == "x"
        ));
    }

    #[test]
    fn unsupported_sort() {
        assert!(matches!(
            parse("(declare-const n Int)"),
            Err(ParseError::UnsupportedSort(sort)) if sort == "Int"
        ));
    }

    #[test]
    fn unknown_symbol() {
        assert!(matches!(
            parse("(assert (<= z 1))"),
            Err(ParseError::UnknownSymbol(name)) if name == "z"
        ));
    }
}

mod terms {
    use super::*;

    #[test]
    fn converse_relations_normalise() {
        let script = parse(
            "(declare-const x Real)
             (assert (> x 0))",
        )
        .unwrap();

        // `>` is `<` with swapped arguments: 0 < x.
        let atom = script.assertions[0];
        let Term::Lt(lhs, rhs) = script.terms.term(atom) else {
            panic!("expected a strict inequality");
        };
        assert!(matches!(script.terms.term(*lhs), Term::RealConst(_)));
        assert!(matches!(script.terms.term(*rhs), Term::Symbol(_)));
    }

    #[test]
    fn equality_of_booleans_is_equivalence() {
        let script = parse(
            "(declare-const p Bool)
             (declare-const q Bool)
             (assert (= p q))",
        )
        .unwrap();
        assert!(matches!(
            script.terms.term(script.assertions[0]),
            Term::Iff(..)
        ));
    }

    #[test]
    fn chained_relations() {
        let script = parse(
            "(declare-const x Real)
             (declare-const y Real)
             (assert (<= 0 x y))",
        )
        .unwrap();
        // (<= 0 x y) is the conjunction of the adjacent pairs.
        assert!(matches!(
            script.terms.term(script.assertions[0]),
            Term::And(links) if links.len() == 2
        ));
    }

    #[test]
    fn implication_folds_right() {
        let script = parse(
            "(declare-const p Bool)
             (declare-const q Bool)
             (declare-const r Bool)
             (assert (=> p q r))",
        )
        .unwrap();
        let Term::Implies(_, nested) = script.terms.term(script.assertions[0]) else {
            panic!("expected an implication");
        };
        assert!(matches!(script.terms.term(*nested), Term::Implies(..)));
    }

    #[test]
    fn let_bindings() {
        let script = parse(
            "(declare-const x Real)
             (assert (let ((y (+ x 1)) (z 2)) (<= y z)))",
        )
        .unwrap();
        assert_eq!(script.assertions.len(), 1);
        assert_eq!(script.terms.sort_of(script.assertions[0]), Sort::Bool);
    }

    #[test]
    fn decimals_are_exact() {
        let script = parse(
            "(declare-const x Real)
             (assert (= x 1.5))",
        )
        .unwrap();
        let constraint = linear::convert(&script.terms, script.assertions[0])
            .unwrap()
            .unwrap();
        assert_eq!(
            constraint.bound,
            num_rational::BigRational::new(3.into(), 2.into())
        );
    }

    #[test]
    fn distinct_expands() {
        let script = parse(
            "(declare-const x Real)
             (declare-const y Real)
             (declare-const z Real)
             (assert (distinct x y z))",
        )
        .unwrap();
        assert!(matches!(
            script.terms.term(script.assertions[0]),
            Term::And(links) if links.len() == 3
        ));
    }

    #[test]
    fn asserting_a_real_term_is_an_error() {
        assert!(matches!(
            parse("(declare-const x Real) (assert (+ x 1))"),
            Err(ParseError::SortMismatch("assert"))
        ));
    }

    #[test]
    fn arity_errors() {
        assert!(matches!(
            parse("(declare-const p Bool) (assert (not))"),
            Err(ParseError::Arity("not"))
        ));
        assert!(matches!(
            parse("(declare-const x Real) (assert (<= x))"),
            Err(ParseError::Arity("<="))
        ));
    }

    #[test]
    fn unbalanced_input() {
        assert!(matches!(
            parse("(assert (and true"),
            Err(ParseError::UnexpectedEnd)
        ));
    }
}
