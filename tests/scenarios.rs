use num_rational::BigRational;

use lutra_smt::{
    config::Config,
    driver::{Driver, DriverState},
    parser::{parse, Status},
    reports::Report,
    sat::BACKEND_NAMES,
    types::err::ErrorKind,
};

fn rational(value: i64) -> BigRational {
    BigRational::from_integer(value.into())
}

/// A driver over the source, using the named SAT backend.
fn driver(source: &str, backend: &str) -> Driver {
    let script = parse(source).unwrap();
    let config = Config {
        sat_backend: backend.to_string(),
        ..Config::default()
    };
    Driver::new(config, script).unwrap()
}

/// Decides the source with every advertised backend, expecting one verdict.
fn decide_with_all(source: &str, expected: Report) {
    for backend in BACKEND_NAMES {
        let mut driver = driver(source, backend);
        assert_eq!(driver.check_sat(), Ok(expected), "backend {backend}");
    }
}

mod verdicts {
    use super::*;

    #[test]
    fn trivially_satisfiable() {
        decide_with_all(
            "(declare-const x Real) (assert (<= x 3)) (check-sat)",
            Report::Satisfiable,
        );
    }

    #[test]
    fn trivially_unsatisfiable() {
        decide_with_all(
            "(declare-const x Real)
             (assert (and (<= x 1) (>= x 2)))
             (check-sat)",
            Report::Unsatisfiable,
        );
    }

    #[test]
    fn no_assertions() {
        decide_with_all("(check-sat)", Report::Satisfiable);
    }

    #[test]
    fn booleans_only() {
        decide_with_all(
            "(declare-const p Bool)
             (declare-const q Bool)
             (assert (or p q))
             (assert (not p))
             (check-sat)",
            Report::Satisfiable,
        );
    }
}

mod refinement {
    use super::*;

    /// A propositional model picks a disjunct, the theory refutes it, and a
    /// blocking clause rules it out; two refutations settle the query.
    #[test]
    fn abstraction_alone_is_insufficient() {
        let source = "(declare-const x Real)
                      (assert (or (< x 0) (> x 0)))
                      (assert (= x 0))
                      (check-sat)";

        for backend in BACKEND_NAMES {
            let mut driver = driver(source, backend);
            let clauses_before = driver.abstraction.clauses().len();

            assert_eq!(driver.check_sat(), Ok(Report::Unsatisfiable), "backend {backend}");

            let conflicts = driver.counters.conflicts;
            assert!((1..=3).contains(&conflicts), "{conflicts} conflicts");
            assert_eq!(driver.counters.iterations, conflicts + 1);

            // Each conflict appended one blocking clause; nothing was removed.
            assert_eq!(
                driver.abstraction.clauses().len(),
                clauses_before + conflicts,
            );
        }
    }

    #[test]
    fn blocking_clauses_generalise() {
        // Adjusting either strict disjunct keeps x = 1/2 available.
        decide_with_all(
            "(declare-const x Real)
             (assert (or (< x 0) (> x 0)))
             (assert (= x 0.5))
             (check-sat)",
            Report::Satisfiable,
        );
    }

    #[test]
    fn negated_atoms_reach_the_theory() {
        // With (<= x 3) forced false, x exceeds 3 and the cap at 2 fails.
        decide_with_all(
            "(declare-const x Real)
             (assert (not (<= x 3)))
             (assert (<= x 2))
             (check-sat)",
            Report::Unsatisfiable,
        );
    }

    #[test]
    fn verdict_is_recorded() {
        let mut driver = driver(
            "(declare-const x Real) (assert (<= x 3)) (check-sat)",
            "lutra",
        );
        assert_eq!(driver.check_sat(), Ok(Report::Satisfiable));
        assert_eq!(driver.state, DriverState::Satisfiable);

        // A second query returns the verdict without further iterations.
        let iterations = driver.counters.iterations;
        assert_eq!(driver.check_sat(), Ok(Report::Satisfiable));
        assert_eq!(driver.counters.iterations, iterations);
    }
}

mod ite {
    use super::*;

    #[test]
    fn ite_normalisation_unsatisfiable() {
        decide_with_all(
            "(declare-const x Real)
             (declare-const y Real)
             (assert (= y (ite (<= x 0) 1 2)))
             (assert (= x 5))
             (assert (= y 1))
             (check-sat)",
            Report::Unsatisfiable,
        );
    }

    #[test]
    fn ite_normalisation_satisfiable() {
        let source = "(declare-const x Real)
                      (declare-const y Real)
                      (assert (= y (ite (<= x 0) 1 2)))
                      (assert (= x (- 1)))
                      (check-sat)";

        for backend in BACKEND_NAMES {
            let mut driver = driver(source, backend);
            assert_eq!(driver.check_sat(), Ok(Report::Satisfiable), "backend {backend}");

            // The taken branch pins y to 1.
            let witness = driver.witness().unwrap();
            let y = witness
                .iter()
                .find(|(symbol, _)| driver.terms.symbol(*symbol).name == "y")
                .map(|(_, value)| value.clone());
            assert_eq!(y, Some(rational(1)));
        }
    }

    #[test]
    fn boolean_ite() {
        decide_with_all(
            "(declare-const c Bool)
             (declare-const t Bool)
             (assert (ite c t false))
             (assert c)
             (assert (not t))
             (check-sat)",
            Report::Unsatisfiable,
        );
    }

    #[test]
    fn untaken_branch_stays_free() {
        // With p false the ite reduces to q; the then branch binds nothing.
        decide_with_all(
            "(declare-const p Bool)
             (declare-const q Bool)
             (assert (ite p true q))
             (assert (not p))
             (assert q)
             (check-sat)",
            Report::Satisfiable,
        );
    }

    #[test]
    fn both_branches_nonconstant() {
        // p false takes the else branch r; q is free to hold regardless.
        decide_with_all(
            "(declare-const p Bool)
             (declare-const q Bool)
             (declare-const r Bool)
             (assert (ite p q r))
             (assert (not p))
             (assert q)
             (assert r)
             (check-sat)",
            Report::Satisfiable,
        );
    }
}

mod expectations {
    use super::*;

    #[test]
    fn agreement_passes() {
        let mut driver = driver(
            "(set-info :status sat)
             (declare-const x Real)
             (assert (<= x 3))
             (check-sat)",
            "lutra",
        );
        let report = driver.check_sat().unwrap();
        assert_eq!(driver.confirm(report), Ok(()));
    }

    #[test]
    fn disagreement_is_reported_after_the_verdict() {
        let mut driver = driver(
            "(set-info :status sat)
             (declare-const x Real)
             (assert (and (<= x 1) (>= x 2)))
             (check-sat)",
            "lutra",
        );

        // The verdict is still produced; confirmation fails afterwards.
        let report = driver.check_sat().unwrap();
        assert_eq!(report, Report::Unsatisfiable);

        let mismatch = driver.confirm(report).unwrap_err();
        assert_eq!(
            mismatch,
            ErrorKind::ExpectedMismatch {
                expected: Report::Satisfiable,
                found: Report::Unsatisfiable,
            }
        );
        assert_eq!(mismatch.to_string(), "expected result was sat");
    }

    #[test]
    fn unknown_status_short_circuits() {
        let source = "(set-info :status unknown)
                      (declare-const x Real)
                      (assert (<= x 3))
                      (check-sat)";
        assert_eq!(parse(source).unwrap().status, Some(Status::Unknown));

        for backend in BACKEND_NAMES {
            let mut driver = driver(source, backend);
            assert_eq!(driver.check_sat(), Ok(Report::Unknown), "backend {backend}");
            assert_eq!(driver.state, DriverState::Error);

            // No solving happened: no iterations, nothing asserted.
            assert_eq!(driver.counters.iterations, 0);
            assert_eq!(driver.theory.assertion_count(), 0);

            // The error state is terminal.
            assert!(driver.check_sat().is_err());
        }
        assert_eq!(Report::Unknown.to_string(), "unknown");
    }
}

mod witnesses {
    use super::*;

    #[test]
    fn witness_respects_the_formula() {
        let mut driver = driver(
            "(declare-const x Real)
             (declare-const y Real)
             (assert (<= x 3))
             (assert (= y (+ x 1)))
             (check-sat)",
            "lutra",
        );
        assert_eq!(driver.check_sat(), Ok(Report::Satisfiable));

        let witness: Vec<(String, BigRational)> = driver
            .witness()
            .unwrap()
            .iter()
            .map(|(symbol, value)| (driver.terms.symbol(*symbol).name.clone(), value.clone()))
            .collect();

        let x = &witness.iter().find(|(name, _)| name == "x").unwrap().1;
        let y = &witness.iter().find(|(name, _)| name == "y").unwrap().1;
        assert!(*x <= rational(3));
        assert_eq!(*y, x + rational(1));
    }

    #[test]
    fn witness_lines_cover_declared_reals() {
        let mut driver = driver(
            "(declare-const x Real)
             (declare-const p Bool)
             (assert (<= x 3))
             (assert p)
             (check-sat)",
            "lutra",
        );
        assert_eq!(driver.check_sat(), Ok(Report::Satisfiable));

        let lines = driver.witness_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("x := "));
    }

    #[test]
    fn verdict_tokens() {
        assert_eq!(Report::Satisfiable.to_string(), "sat");
        assert_eq!(Report::Unsatisfiable.to_string(), "unsat");
    }
}
