/*!
A reader for the SMT-LIB v2 surface language, restricted to what a QF_LRA
solve consumes.

Commands: `set-logic` and `set-info` are recorded (`:status` in particular),
`set-option` is accepted and ignored, `declare-const` and nullary
`declare-fun` declare symbols, `assert` collects a boolean term, and
`check-sat`, `get-model`, `exit` are accepted --- the driver consumes the
conjunction of the asserted terms, and model output is governed by the CLI.
Anything else is a parse error.

Terms cover the boolean connectives, `let` bindings with shadowing,
the QF_LRA relations (chainable, as in the standard), `distinct`, and linear
arithmetic with numerals and decimals. `=>` folds right-associatively to
binary nodes; `>=` and `>` normalise through their converses at term
construction.
*/

mod lexer;

use lexer::{tokenize, Token};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use crate::{
    formula::{Sort, TermDb, TermId},
    misc::log::targets,
    reports::Report,
    types::err::ParseError,
};

/// A `:status` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `(set-info :status sat)`.
    Sat,

    /// `(set-info :status unsat)`.
    Unsat,

    /// `(set-info :status unknown)`.
    Unknown,
}

impl From<Status> for Report {
    fn from(status: Status) -> Report {
        match status {
            Status::Sat => Report::Satisfiable,
            Status::Unsat => Report::Unsatisfiable,
            Status::Unknown => Report::Unknown,
        }
    }
}

/// A parsed script: the term store, the asserted terms, and annotations.
#[derive(Debug, Default)]
pub struct Script {
    /// The term store the script built.
    pub terms: TermDb,

    /// The asserted terms, in script order.
    pub assertions: Vec<TermId>,

    /// The `:status` annotation, if any.
    pub status: Option<Status>,

    /// The declared logic, if any.
    pub logic: Option<String>,

    /// Count of `check-sat` commands seen.
    pub checks: usize,
}

/// Parses a script from source text.
pub fn parse(source: &str) -> Result<Script, ParseError> {
    let tokens = tokenize(source)?;
    let mut reader = Reader {
        tokens: &tokens,
        position: 0,
    };
    let mut script = Script::default();

    while !reader.finished() {
        reader.expect_left()?;
        let (command, _) = reader.symbol()?;

        match command.as_str() {
            "set-logic" => {
                let (logic, _) = reader.symbol()?;
                log::debug!(target: targets::PARSER, "Logic: {logic}");
                script.logic = Some(logic);
                reader.expect_right()?;
            }

            "set-info" => {
                let (keyword, _) = reader.keyword()?;
                if keyword == "status" {
                    let (value, line) = reader.symbol()?;
                    script.status = Some(match value.as_str() {
                        "sat" => Status::Sat,
                        "unsat" => Status::Unsat,
                        "unknown" => Status::Unknown,
                        _ => return Err(ParseError::UnexpectedToken(line)),
                    });
                    reader.expect_right()?;
                } else {
                    reader.skip_form()?;
                }
            }

            "set-option" => reader.skip_form()?,

            "declare-const" => {
                let (name, _) = reader.symbol()?;
                let sort = reader.sort()?;
                script.terms.declare_symbol(&name, sort)?;
                reader.expect_right()?;
            }

            "declare-fun" => {
                let (name, line) = reader.symbol()?;
                reader.expect_left()?;
                match reader.peek() {
                    Some((Token::RightParen, _)) => {
                        reader.next()?;
                    }
                    _ => {
                        log::info!(target: targets::PARSER, "Function with arguments on line {line}");
                        return Err(ParseError::UnsupportedCommand(
                            "declare-fun with arguments".to_string(),
                        ));
                    }
                }
                let sort = reader.sort()?;
                script.terms.declare_symbol(&name, sort)?;
                reader.expect_right()?;
            }

            "assert" => {
                let mut bindings = Vec::new();
                let term = parse_term(&mut reader, &mut script.terms, &mut bindings)?;
                if script.terms.sort_of(term) != Sort::Bool {
                    return Err(ParseError::SortMismatch("assert"));
                }
                script.assertions.push(term);
                reader.expect_right()?;
            }

            "check-sat" => {
                script.checks += 1;
                reader.expect_right()?;
            }

            "get-model" | "exit" => reader.expect_right()?,

            _ => return Err(ParseError::UnsupportedCommand(command)),
        }
    }

    log::info!(
        target: targets::PARSER,
        "{} assertions over {} symbols",
        script.assertions.len(),
        script.terms.symbols().count(),
    );
    Ok(script)
}

struct Reader<'a> {
    tokens: &'a [(Token, usize)],
    position: usize,
}

impl Reader<'_> {
    fn finished(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn next(&mut self) -> Result<&(Token, usize), ParseError> {
        let pair = self
            .tokens
            .get(self.position)
            .ok_or(ParseError::UnexpectedEnd)?;
        self.position += 1;
        Ok(pair)
    }

    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.position)
    }

    fn expect_left(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            (Token::LeftParen, _) => Ok(()),
            (_, line) => Err(ParseError::UnexpectedToken(*line)),
        }
    }

    fn expect_right(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            (Token::RightParen, _) => Ok(()),
            (_, line) => Err(ParseError::UnexpectedToken(*line)),
        }
    }

    fn symbol(&mut self) -> Result<(String, usize), ParseError> {
        match self.next()? {
            (Token::Symbol(name), line) => Ok((name.clone(), *line)),
            (_, line) => Err(ParseError::UnexpectedToken(*line)),
        }
    }

    fn keyword(&mut self) -> Result<(String, usize), ParseError> {
        match self.next()? {
            (Token::Keyword(name), line) => Ok((name.clone(), *line)),
            (_, line) => Err(ParseError::UnexpectedToken(*line)),
        }
    }

    fn sort(&mut self) -> Result<Sort, ParseError> {
        let (name, _) = self.symbol()?;
        match name.as_str() {
            "Bool" => Ok(Sort::Bool),
            "Real" => Ok(Sort::Real),
            _ => Err(ParseError::UnsupportedSort(name)),
        }
    }

    /// Skips the remainder of the current form, closing paren included.
    fn skip_form(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                (Token::LeftParen, _) => depth += 1,
                (Token::RightParen, _) => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_term(
    reader: &mut Reader,
    terms: &mut TermDb,
    bindings: &mut Vec<(String, TermId)>,
) -> Result<TermId, ParseError> {
    let (token, line) = {
        let pair = reader.next()?;
        (pair.0.clone(), pair.1)
    };

    match token {
        Token::Numeral(digits) => Ok(terms.real_const(rational_of(&digits, None, line)?)),

        Token::Decimal(text) => {
            let (whole, fraction) = text.split_once('.').ok_or(ParseError::Numeral(line))?;
            Ok(terms.real_const(rational_of(whole, Some(fraction), line)?))
        }

        Token::Symbol(name) => resolve_symbol(&name, terms, bindings),

        Token::LeftParen => {
            let (operator, _) = reader.symbol()?;

            if operator == "let" {
                reader.expect_left()?;
                // Bindings of one let are parallel: values read the outer scope.
                let mut pending = Vec::new();
                loop {
                    if let Some((Token::RightParen, _)) = reader.peek() {
                        reader.next()?;
                        break;
                    }
                    reader.expect_left()?;
                    let (name, _) = reader.symbol()?;
                    let value = parse_term(reader, terms, bindings)?;
                    reader.expect_right()?;
                    pending.push((name, value));
                }
                let introduced = pending.len();
                bindings.extend(pending);
                let body = parse_term(reader, terms, bindings)?;
                bindings.truncate(bindings.len() - introduced);
                reader.expect_right()?;
                return Ok(body);
            }

            let mut args = Vec::new();
            loop {
                if let Some((Token::RightParen, _)) = reader.peek() {
                    reader.next()?;
                    break;
                }
                args.push(parse_term(reader, terms, bindings)?);
            }
            apply(&operator, args, terms)
        }

        _ => Err(ParseError::UnexpectedToken(line)),
    }
}

fn resolve_symbol(
    name: &str,
    terms: &mut TermDb,
    bindings: &[(String, TermId)],
) -> Result<TermId, ParseError> {
    for (bound, value) in bindings.iter().rev() {
        if bound == name {
            return Ok(*value);
        }
    }
    match name {
        "true" => Ok(terms.bool_const(true)),
        "false" => Ok(terms.bool_const(false)),
        _ => terms
            .named(name)
            .ok_or_else(|| ParseError::UnknownSymbol(name.to_string())),
    }
}

/// Applies an operator to parsed arguments.
fn apply(operator: &str, args: Vec<TermId>, terms: &mut TermDb) -> Result<TermId, ParseError> {
    match operator {
        "not" => match args.len() {
            1 => terms.not(args[0]),
            _ => Err(ParseError::Arity("not")),
        },

        "and" => terms.and(args),

        "or" => terms.or(args),

        "=>" => {
            if args.len() < 2 {
                return Err(ParseError::Arity("=>"));
            }
            // Right-associative fold to binary nodes.
            let mut result = args[args.len() - 1];
            for &antecedent in args[..args.len() - 1].iter().rev() {
                result = terms.implies(antecedent, result)?;
            }
            Ok(result)
        }

        "=" => chain(args, terms, |terms, lhs, rhs| terms.eq(lhs, rhs), "="),

        "<=" => chain(args, terms, |terms, lhs, rhs| terms.le(lhs, rhs), "<="),
        "<" => chain(args, terms, |terms, lhs, rhs| terms.lt(lhs, rhs), "<"),
        ">=" => chain(args, terms, |terms, lhs, rhs| terms.ge(lhs, rhs), ">="),
        ">" => chain(args, terms, |terms, lhs, rhs| terms.gt(lhs, rhs), ">"),

        "distinct" => {
            if args.len() < 2 {
                return Err(ParseError::Arity("distinct"));
            }
            let mut links = Vec::new();
            for (index, &lhs) in args.iter().enumerate() {
                for &rhs in &args[index + 1..] {
                    let equal = terms.eq(lhs, rhs)?;
                    links.push(terms.not(equal)?);
                }
            }
            terms.and(links)
        }

        "ite" => match args.len() {
            3 => terms.ite(args[0], args[1], args[2]),
            _ => Err(ParseError::Arity("ite")),
        },

        "+" => terms.add(args),

        "-" => terms.sub(args),

        "*" => fold_left(args, terms, |terms, lhs, rhs| terms.mul(lhs, rhs), "*"),

        "/" => fold_left(args, terms, |terms, lhs, rhs| terms.div(lhs, rhs), "/"),

        _ => Err(ParseError::UnknownSymbol(operator.to_string())),
    }
}

/// A chainable relation: `(R a b c)` is `(and (R a b) (R b c))`.
fn chain(
    args: Vec<TermId>,
    terms: &mut TermDb,
    mut relation: impl FnMut(&mut TermDb, TermId, TermId) -> Result<TermId, ParseError>,
    operator: &'static str,
) -> Result<TermId, ParseError> {
    if args.len() < 2 {
        return Err(ParseError::Arity(operator));
    }
    let mut links = Vec::new();
    for pair in args.windows(2) {
        links.push(relation(terms, pair[0], pair[1])?);
    }
    terms.and(links)
}

/// A left fold of a binary operator over at least two arguments.
fn fold_left(
    args: Vec<TermId>,
    terms: &mut TermDb,
    mut operator: impl FnMut(&mut TermDb, TermId, TermId) -> Result<TermId, ParseError>,
    name: &'static str,
) -> Result<TermId, ParseError> {
    if args.len() < 2 {
        return Err(ParseError::Arity(name));
    }
    let mut result = args[0];
    for &arg in &args[1..] {
        result = operator(terms, result, arg)?;
    }
    Ok(result)
}

fn rational_of(
    whole: &str,
    fraction: Option<&str>,
    line: usize,
) -> Result<BigRational, ParseError> {
    let whole = BigInt::parse_bytes(whole.as_bytes(), 10).ok_or(ParseError::Numeral(line))?;
    match fraction {
        None => Ok(BigRational::from_integer(whole)),
        Some(digits) => {
            let fractional =
                BigInt::parse_bytes(digits.as_bytes(), 10).ok_or(ParseError::Numeral(line))?;
            let mut scale = BigInt::one();
            for _ in 0..digits.len() {
                scale *= 10;
            }
            Ok(BigRational::new(whole * &scale + fractional, scale))
        }
    }
}
