/*!
The formula store --- hash-consed terms over the Bool and Real sorts.

Terms are interned in a [TermDb]: structurally identical terms receive the
same [TermId], so equality of ids is structural equality and sharing is free.
Constructors sort-check their arguments and apply the normalisations the rest
of the library relies on:

- `>=` and `>` are expressed through `<=` and `<` with swapped arguments, so
  only three relation kinds survive construction.
- Equality of booleans is expressed through [Term::Iff].
- Double negation collapses.
- A real-sorted `ite` is lifted out of any relation it appears under, so an
  atom handed to the theory layer is always a plain linear relation over
  symbols and constants.

An *atom* is a leaf of boolean structure: a boolean-sorted symbol or a theory
relation. [TermDb::atoms] collects the atoms of a formula in a fixed
traversal order, which the abstraction uses for stable numbering.
*/

use std::collections::{HashMap, HashSet};

use num_rational::BigRational;

use crate::types::err::ParseError;

/// An index to a term in a [TermDb].
pub type TermId = u32;

/// An index to a declared symbol in a [TermDb].
pub type SymbolId = u32;

/// Sorts of terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    /// The booleans.
    Bool,

    /// The reals.
    Real,
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Real => write!(f, "Real"),
        }
    }
}

/// A term, with sub-terms referenced by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// A declared (or fresh) symbol.
    Symbol(SymbolId),

    /// A boolean constant.
    BoolConst(bool),

    /// A rational constant.
    RealConst(BigRational),

    /// Negation.
    Not(TermId),

    /// N-ary conjunction.
    And(Vec<TermId>),

    /// N-ary disjunction.
    Or(Vec<TermId>),

    /// Binary implication. SMT-LIB's n-ary `=>` folds right-associatively to
    /// nested binary nodes at parse time.
    Implies(TermId, TermId),

    /// Boolean equivalence.
    Iff(TermId, TermId),

    /// If-then-else, of either sort; the sort is the sort of the branches.
    Ite(TermId, TermId, TermId),

    /// Real equality.
    Eq(TermId, TermId),

    /// Weak inequality.
    Le(TermId, TermId),

    /// Strict inequality.
    Lt(TermId, TermId),

    /// N-ary sum.
    Add(Vec<TermId>),

    /// Subtraction: the first argument less the sum of the rest.
    Sub(Vec<TermId>),

    /// Arithmetic negation.
    Neg(TermId),

    /// Binary product.
    Mul(TermId, TermId),

    /// Binary quotient.
    Div(TermId, TermId),
}

impl Term {
    /// The name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Symbol(_) => "symbol",
            Term::BoolConst(_) => "bool constant",
            Term::RealConst(_) => "real constant",
            Term::Not(_) => "not",
            Term::And(_) => "and",
            Term::Or(_) => "or",
            Term::Implies(..) => "=>",
            Term::Iff(..) => "iff",
            Term::Ite(..) => "ite",
            Term::Eq(..) => "=",
            Term::Le(..) => "<=",
            Term::Lt(..) => "<",
            Term::Add(_) => "+",
            Term::Sub(_) => "-",
            Term::Neg(_) => "-",
            Term::Mul(..) => "*",
            Term::Div(..) => "/",
        }
    }
}

/// A declared symbol: a name paired with a sort.
#[derive(Clone, Debug)]
pub struct Symbol {
    /// The concrete name.
    pub name: String,

    /// The sort of the symbol.
    pub sort: Sort,
}

/// Relation kinds a theory atom may carry after normalisation.
#[derive(Clone, Copy)]
enum RelKind {
    Eq,
    Le,
    Lt,
}

/// The term store.
#[derive(Debug, Default)]
pub struct TermDb {
    terms: Vec<Term>,
    sorts: Vec<Sort>,
    ids: HashMap<Term, TermId>,
    symbols: Vec<Symbol>,
    symbol_ids: HashMap<String, SymbolId>,
    fresh_count: u32,
}

impl TermDb {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, term: Term, sort: Sort) -> TermId {
        if let Some(id) = self.ids.get(&term) {
            return *id;
        }
        let id = self.terms.len() as TermId;
        self.ids.insert(term.clone(), id);
        self.terms.push(term);
        self.sorts.push(sort);
        id
    }

    /// The term behind an id.
    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id as usize]
    }

    /// The sort of a term.
    pub fn sort_of(&self, id: TermId) -> Sort {
        self.sorts[id as usize]
    }

    /// The declared symbol behind a symbol id.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id as usize]
    }

    /// The declared symbols, in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (index as SymbolId, symbol))
    }

    /// Declares a symbol, unless the name is taken.
    pub fn declare_symbol(&mut self, name: &str, sort: Sort) -> Result<TermId, ParseError> {
        if self.symbol_ids.contains_key(name) {
            return Err(ParseError::Redeclaration(name.to_string()));
        }
        Ok(self.intern_symbol(name.to_string(), sort))
    }

    fn intern_symbol(&mut self, name: String, sort: Sort) -> TermId {
        let id = self.symbols.len() as SymbolId;
        self.symbol_ids.insert(name.clone(), id);
        self.symbols.push(Symbol { name, sort });
        self.intern(Term::Symbol(id), sort)
    }

    /// A fresh boolean symbol, drawn from the `ite!N` namespace and skipping
    /// any colliding declaration.
    pub fn fresh_bool_symbol(&mut self) -> TermId {
        loop {
            let name = format!("ite!{}", self.fresh_count);
            self.fresh_count += 1;
            if !self.symbol_ids.contains_key(&name) {
                return self.intern_symbol(name, Sort::Bool);
            }
        }
    }

    /// The term declared under a name, if any.
    pub fn named(&self, name: &str) -> Option<TermId> {
        let id = *self.symbol_ids.get(name)?;
        self.ids.get(&Term::Symbol(id)).copied()
    }

    fn expect_sort(&self, id: TermId, sort: Sort, operator: &'static str) -> Result<(), ParseError> {
        match self.sort_of(id) == sort {
            true => Ok(()),
            false => Err(ParseError::SortMismatch(operator)),
        }
    }

    /// A boolean constant.
    pub fn bool_const(&mut self, value: bool) -> TermId {
        self.intern(Term::BoolConst(value), Sort::Bool)
    }

    /// A rational constant.
    pub fn real_const(&mut self, value: BigRational) -> TermId {
        self.intern(Term::RealConst(value), Sort::Real)
    }

    /// Negation. A doubly negated term collapses to the term.
    pub fn not(&mut self, child: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(child, Sort::Bool, "not")?;
        Ok(self.negate(child))
    }

    /// As [not](Self::not), for callers which guarantee a boolean argument.
    pub(crate) fn negate(&mut self, child: TermId) -> TermId {
        debug_assert_eq!(self.sort_of(child), Sort::Bool);
        if let Term::Not(inner) = *self.term(child) {
            return inner;
        }
        self.intern(Term::Not(child), Sort::Bool)
    }

    /// N-ary conjunction. A single conjunct stands alone.
    pub fn and(&mut self, children: Vec<TermId>) -> Result<TermId, ParseError> {
        for &child in &children {
            self.expect_sort(child, Sort::Bool, "and")?;
        }
        match children.len() {
            0 => Err(ParseError::Arity("and")),
            1 => Ok(children[0]),
            _ => Ok(self.intern(Term::And(children), Sort::Bool)),
        }
    }

    /// As [and](Self::and), for callers which guarantee boolean arguments.
    pub(crate) fn conj(&mut self, children: Vec<TermId>) -> TermId {
        debug_assert!(children.len() >= 2);
        self.intern(Term::And(children), Sort::Bool)
    }

    /// N-ary disjunction. A single disjunct stands alone.
    pub fn or(&mut self, children: Vec<TermId>) -> Result<TermId, ParseError> {
        for &child in &children {
            self.expect_sort(child, Sort::Bool, "or")?;
        }
        match children.len() {
            0 => Err(ParseError::Arity("or")),
            1 => Ok(children[0]),
            _ => Ok(self.intern(Term::Or(children), Sort::Bool)),
        }
    }

    /// Binary implication.
    pub fn implies(&mut self, antecedent: TermId, consequent: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(antecedent, Sort::Bool, "=>")?;
        self.expect_sort(consequent, Sort::Bool, "=>")?;
        Ok(self.intern(Term::Implies(antecedent, consequent), Sort::Bool))
    }

    /// Boolean equivalence.
    pub fn iff(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(lhs, Sort::Bool, "iff")?;
        self.expect_sort(rhs, Sort::Bool, "iff")?;
        Ok(self.intern(Term::Iff(lhs, rhs), Sort::Bool))
    }

    /// If-then-else over a boolean condition; branches of a common sort.
    pub fn ite(
        &mut self,
        condition: TermId,
        then_branch: TermId,
        else_branch: TermId,
    ) -> Result<TermId, ParseError> {
        self.expect_sort(condition, Sort::Bool, "ite")?;
        let sort = self.sort_of(then_branch);
        if self.sort_of(else_branch) != sort {
            return Err(ParseError::SortMismatch("ite"));
        }
        Ok(self.intern(Term::Ite(condition, then_branch, else_branch), sort))
    }

    /// Equality. Boolean arguments reduce to equivalence; real arguments form
    /// a theory atom.
    pub fn eq(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        match (self.sort_of(lhs), self.sort_of(rhs)) {
            (Sort::Bool, Sort::Bool) => self.iff(lhs, rhs),
            (Sort::Real, Sort::Real) => Ok(self.relation(RelKind::Eq, lhs, rhs)),
            _ => Err(ParseError::SortMismatch("=")),
        }
    }

    /// Weak inequality.
    pub fn le(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(lhs, Sort::Real, "<=")?;
        self.expect_sort(rhs, Sort::Real, "<=")?;
        Ok(self.relation(RelKind::Le, lhs, rhs))
    }

    /// Strict inequality.
    pub fn lt(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(lhs, Sort::Real, "<")?;
        self.expect_sort(rhs, Sort::Real, "<")?;
        Ok(self.relation(RelKind::Lt, lhs, rhs))
    }

    /// `lhs >= rhs`, expressed as `rhs <= lhs`.
    pub fn ge(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.le(rhs, lhs)
    }

    /// `lhs > rhs`, expressed as `rhs < lhs`.
    pub fn gt(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.lt(rhs, lhs)
    }

    /// N-ary sum.
    pub fn add(&mut self, args: Vec<TermId>) -> Result<TermId, ParseError> {
        for &arg in &args {
            self.expect_sort(arg, Sort::Real, "+")?;
        }
        match args.len() {
            0 => Err(ParseError::Arity("+")),
            1 => Ok(args[0]),
            _ => Ok(self.intern(Term::Add(args), Sort::Real)),
        }
    }

    /// Subtraction. A single argument is arithmetic negation, as in SMT-LIB.
    pub fn sub(&mut self, args: Vec<TermId>) -> Result<TermId, ParseError> {
        for &arg in &args {
            self.expect_sort(arg, Sort::Real, "-")?;
        }
        match args.len() {
            0 => Err(ParseError::Arity("-")),
            1 => Ok(self.intern(Term::Neg(args[0]), Sort::Real)),
            _ => Ok(self.intern(Term::Sub(args), Sort::Real)),
        }
    }

    /// Binary product.
    pub fn mul(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(lhs, Sort::Real, "*")?;
        self.expect_sort(rhs, Sort::Real, "*")?;
        Ok(self.intern(Term::Mul(lhs, rhs), Sort::Real))
    }

    /// Binary quotient.
    pub fn div(&mut self, lhs: TermId, rhs: TermId) -> Result<TermId, ParseError> {
        self.expect_sort(lhs, Sort::Real, "/")?;
        self.expect_sort(rhs, Sort::Real, "/")?;
        Ok(self.intern(Term::Div(lhs, rhs), Sort::Real))
    }

    /// Forms a relation, lifting any real ite out of either side first.
    fn relation(&mut self, kind: RelKind, lhs: TermId, rhs: TermId) -> TermId {
        if let Some((condition, then_side, else_side)) = self.split_ite(lhs) {
            let then_relation = self.relation(kind, then_side, rhs);
            let else_relation = self.relation(kind, else_side, rhs);
            return self.intern(Term::Ite(condition, then_relation, else_relation), Sort::Bool);
        }
        if let Some((condition, then_side, else_side)) = self.split_ite(rhs) {
            let then_relation = self.relation(kind, lhs, then_side);
            let else_relation = self.relation(kind, lhs, else_side);
            return self.intern(Term::Ite(condition, then_relation, else_relation), Sort::Bool);
        }
        let term = match kind {
            RelKind::Eq => Term::Eq(lhs, rhs),
            RelKind::Le => Term::Le(lhs, rhs),
            RelKind::Lt => Term::Lt(lhs, rhs),
        };
        self.intern(term, Sort::Bool)
    }

    /// Splits a real term at its first ite sub-term: the condition, together
    /// with copies of the term taking the then and the else branch.
    fn split_ite(&mut self, id: TermId) -> Option<(TermId, TermId, TermId)> {
        match self.term(id).clone() {
            Term::Ite(condition, then_branch, else_branch) => {
                Some((condition, then_branch, else_branch))
            }

            Term::Add(args) => {
                let (condition, then_args, else_args) = self.split_ite_in(&args)?;
                Some((
                    condition,
                    self.intern(Term::Add(then_args), Sort::Real),
                    self.intern(Term::Add(else_args), Sort::Real),
                ))
            }

            Term::Sub(args) => {
                let (condition, then_args, else_args) = self.split_ite_in(&args)?;
                Some((
                    condition,
                    self.intern(Term::Sub(then_args), Sort::Real),
                    self.intern(Term::Sub(else_args), Sort::Real),
                ))
            }

            Term::Neg(arg) => {
                let (condition, then_arg, else_arg) = self.split_ite(arg)?;
                Some((
                    condition,
                    self.intern(Term::Neg(then_arg), Sort::Real),
                    self.intern(Term::Neg(else_arg), Sort::Real),
                ))
            }

            Term::Mul(lhs, rhs) => {
                if let Some((condition, then_side, else_side)) = self.split_ite(lhs) {
                    return Some((
                        condition,
                        self.intern(Term::Mul(then_side, rhs), Sort::Real),
                        self.intern(Term::Mul(else_side, rhs), Sort::Real),
                    ));
                }
                let (condition, then_side, else_side) = self.split_ite(rhs)?;
                Some((
                    condition,
                    self.intern(Term::Mul(lhs, then_side), Sort::Real),
                    self.intern(Term::Mul(lhs, else_side), Sort::Real),
                ))
            }

            Term::Div(lhs, rhs) => {
                if let Some((condition, then_side, else_side)) = self.split_ite(lhs) {
                    return Some((
                        condition,
                        self.intern(Term::Div(then_side, rhs), Sort::Real),
                        self.intern(Term::Div(else_side, rhs), Sort::Real),
                    ));
                }
                let (condition, then_side, else_side) = self.split_ite(rhs)?;
                Some((
                    condition,
                    self.intern(Term::Div(lhs, then_side), Sort::Real),
                    self.intern(Term::Div(lhs, else_side), Sort::Real),
                ))
            }

            _ => None,
        }
    }

    fn split_ite_in(&mut self, args: &[TermId]) -> Option<(TermId, Vec<TermId>, Vec<TermId>)> {
        for (index, &arg) in args.iter().enumerate() {
            if let Some((condition, then_arg, else_arg)) = self.split_ite(arg) {
                let mut then_args = args.to_vec();
                then_args[index] = then_arg;
                let mut else_args = args.to_vec();
                else_args[index] = else_arg;
                return Some((condition, then_args, else_args));
            }
        }
        None
    }

    /// Whether the term is an atom: a boolean symbol or a theory relation.
    pub fn is_atom(&self, id: TermId) -> bool {
        match self.term(id) {
            Term::Symbol(_) => self.sort_of(id) == Sort::Bool,
            Term::Eq(..) | Term::Le(..) | Term::Lt(..) => true,
            _ => false,
        }
    }

    /// Whether the term is a theory relation.
    pub fn is_theory_atom(&self, id: TermId) -> bool {
        matches!(self.term(id), Term::Eq(..) | Term::Le(..) | Term::Lt(..))
    }

    /// The atoms of a formula, each once, in first-visit preorder.
    pub fn atoms(&self, root: TermId) -> Vec<TermId> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if self.is_atom(id) {
                found.push(id);
                continue;
            }
            match self.term(id) {
                Term::Not(child) => stack.push(*child),

                Term::And(children) | Term::Or(children) => {
                    stack.extend(children.iter().rev().copied());
                }

                Term::Implies(lhs, rhs) | Term::Iff(lhs, rhs) => {
                    stack.push(*rhs);
                    stack.push(*lhs);
                }

                Term::Ite(condition, then_branch, else_branch) => {
                    stack.push(*else_branch);
                    stack.push(*then_branch);
                    stack.push(*condition);
                }

                // Constants hold no atoms; real structure under an atom was
                // already skipped by the atom check above.
                _ => {}
            }
        }
        found
    }

    /// Evaluates the boolean structure of a formula under an assignment to
    /// its atoms. `None` if an atom lacks a value or a node lies outside the
    /// boolean vocabulary.
    pub fn eval_boolean(
        &self,
        root: TermId,
        atom_values: &HashMap<TermId, bool>,
    ) -> Option<bool> {
        if self.is_atom(root) {
            return atom_values.get(&root).copied();
        }
        match self.term(root) {
            Term::BoolConst(value) => Some(*value),

            Term::Not(child) => Some(!self.eval_boolean(*child, atom_values)?),

            Term::And(children) => {
                let mut value = true;
                for &child in children {
                    value &= self.eval_boolean(child, atom_values)?;
                }
                Some(value)
            }

            Term::Or(children) => {
                let mut value = false;
                for &child in children {
                    value |= self.eval_boolean(child, atom_values)?;
                }
                Some(value)
            }

            Term::Implies(lhs, rhs) => {
                Some(!self.eval_boolean(*lhs, atom_values)? || self.eval_boolean(*rhs, atom_values)?)
            }

            Term::Iff(lhs, rhs) => {
                Some(self.eval_boolean(*lhs, atom_values)? == self.eval_boolean(*rhs, atom_values)?)
            }

            Term::Ite(condition, then_branch, else_branch) => {
                match self.eval_boolean(*condition, atom_values)? {
                    true => self.eval_boolean(*then_branch, atom_values),
                    false => self.eval_boolean(*else_branch, atom_values),
                }
            }

            _ => None,
        }
    }
}
