/*!
A lazy CDCL(T) solver for quantifier-free linear real arithmetic.

lutra_smt decides SMT-LIB v2 scripts by a dialogue between two decision
procedures: an incremental SAT engine over a boolean abstraction of the
input, and a solver for conjunctions of linear constraints over the reals.

At a high level a solve is viewed in terms of a handful of cooperating parts:

- A script is read into a hash-consed term store ([parser], [formula]).
- The boolean structure over theory atoms is clausified ([abstraction]):
  every atom and compound sub-term receives an abstract atom, Tseitin clauses
  tie them together, and a unit clause asserts the formula.
- A driver ([driver]) alternates SAT queries over the clause set with theory
  checks of the conjunction of atoms the propositional model implies. A
  theory conflict returns to the SAT engine as a blocking clause built from
  the unsat core; a theory agreement settles the query.

Useful starting points:

- The [refinement loop](driver::refinement) for the dynamics of a solve.
- The [abstraction] for the encoding of boolean structure.
- The [sat] and [theory] modules for the capability seams the driver drives.

# Example

```rust
use lutra_smt::{config::Config, driver::Driver, parser, reports::Report};

let script = parser::parse(
    "(declare-const x Real)
     (assert (or (< x 0) (> x 0)))
     (assert (= x 0))
     (check-sat)",
)
.unwrap();

let mut driver = Driver::new(Config::default(), script).unwrap();
assert_eq!(driver.check_sat(), Ok(Report::Unsatisfiable));
```

# Logs

Diagnostics use the [log] facade with the targets listed in
[misc::log::targets]; no implementation is installed by the library.
*/

pub mod abstraction;
pub mod config;
pub mod driver;
pub mod formula;
pub mod generic;
pub mod misc;
pub mod parser;
pub mod reports;
pub mod sat;
pub mod structures;
pub mod theory;
pub mod types;
