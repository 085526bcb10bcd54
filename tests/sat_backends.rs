use lutra_smt::{
    sat::{backend_named, SatBackend, BACKEND_NAMES, DEFAULT_BACKEND},
    structures::literal::{CLiteral, Literal},
    types::err::ErrorKind,
};

fn engines() -> Vec<Box<dyn SatBackend>> {
    BACKEND_NAMES
        .iter()
        .map(|name| backend_named(name).unwrap())
        .collect()
}

mod registry {
    use super::*;

    #[test]
    fn advertised_names_resolve() {
        for name in BACKEND_NAMES {
            assert_eq!(backend_named(name).unwrap().name(), name);
        }
        assert!(BACKEND_NAMES.contains(&DEFAULT_BACKEND));
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            backend_named("minisat22"),
            Err(ErrorKind::UnknownBackend(name)) if name == "minisat22"
        ));
    }
}

mod basic {
    use super::*;

    #[test]
    fn one_literal() {
        for mut engine in engines() {
            engine.add_clause(vec![1]);
            assert_eq!(engine.solve(), Ok(true));
            assert_eq!(engine.model(), &[1]);
        }
    }

    #[test]
    fn conflict() {
        for mut engine in engines() {
            engine.add_clause(vec![1, 2]);
            engine.add_clause(vec![-1, -2]);
            engine.add_clause(vec![1, -2]);
            engine.add_clause(vec![-1, 2]);
            assert_eq!(engine.solve(), Ok(false));
        }
    }

    #[test]
    fn unit_chain() {
        for mut engine in engines() {
            engine.add_clause(vec![1]);
            engine.add_clause(vec![-1, 2]);
            engine.add_clause(vec![-2, 3]);
            engine.add_clause(vec![-3, -4]);
            assert_eq!(engine.solve(), Ok(true));
            assert_eq!(engine.model(), &[1, 2, 3, -4]);
        }
    }

    #[test]
    fn model_is_complete() {
        for mut engine in engines() {
            engine.add_clause(vec![1, 4]);
            assert_eq!(engine.solve(), Ok(true));
            // Atoms 2 and 3 carry values too.
            assert_eq!(engine.model().len(), 4);
        }
    }

    #[test]
    fn empty_clause() {
        for mut engine in engines() {
            engine.add_clause(vec![]);
            engine.add_clause(vec![1]);
            assert_eq!(engine.solve(), Ok(false));
        }
    }

    #[test]
    fn tautology_is_skipped() {
        for mut engine in engines() {
            engine.add_clause(vec![1, -1]);
            engine.add_clause(vec![2]);
            assert_eq!(engine.solve(), Ok(true));
        }
    }
}

mod incremental {
    use super::*;

    /// Counts models by repeatedly excluding the last one found, as the
    /// driver excludes theory-refuted models.
    fn model_count(engine: &mut Box<dyn SatBackend>) -> usize {
        let mut count = 0;
        while engine.solve().unwrap() {
            count += 1;
            assert!(count <= 32, "model enumeration failed to converge");
            let exclusion: Vec<CLiteral> =
                engine.model().iter().map(|literal| literal.negate()).collect();
            engine.add_clause(exclusion);
        }
        count
    }

    #[test]
    fn clauses_persist_between_solves() {
        for mut engine in engines() {
            engine.add_clause(vec![1, 2]);
            engine.add_clause(vec![-1, -2]);
            assert_eq!(model_count(&mut engine), 2);
        }
    }

    #[test]
    fn free_square() {
        // Atoms 1 and 2 are mentioned yet unconstrained.
        for mut engine in engines() {
            engine.add_clause(vec![3]);
            engine.add_clause(vec![1, 2, 3]);
            assert_eq!(model_count(&mut engine), 4);
        }
    }
}

mod search {
    use super::*;

    /// Three pigeons into two holes.
    #[test]
    fn pigeonhole() {
        let hole = |pigeon: i32, slot: i32| (pigeon - 1) * 2 + slot;
        for mut engine in engines() {
            for pigeon in 1..=3 {
                engine.add_clause(vec![hole(pigeon, 1), hole(pigeon, 2)]);
            }
            for slot in 1..=2 {
                for first in 1..=3 {
                    for second in (first + 1)..=3 {
                        engine.add_clause(vec![-hole(first, slot), -hole(second, slot)]);
                    }
                }
            }
            assert_eq!(engine.solve(), Ok(false));
        }
    }

    /// A satisfiable formula needing several decisions and conflicts.
    #[test]
    fn chained_exclusions() {
        for mut engine in engines() {
            for atom in 1..=4 {
                engine.add_clause(vec![atom, atom + 4]);
            }
            engine.add_clause(vec![-1, -2, -3, -4]);
            engine.add_clause(vec![-5, -6, -7, -8]);
            assert_eq!(engine.solve(), Ok(true));

            // The model satisfies every clause.
            let model = engine.model().to_vec();
            for atom in 1..=4usize {
                let paired = model[atom - 1].is_positive() || model[atom + 3].is_positive();
                assert!(paired, "atom {atom} left unpaired");
            }
        }
    }
}
