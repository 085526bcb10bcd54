/*!
Tokenisation of SMT-LIB input.

Comments run from `;` to the end of the line. Symbols are either simple or
`|`-quoted; keywords carry their leading `:` in the source though not in the
token. Each token is tagged with the line it began on, for error reports.
*/

use crate::types::err::ParseError;

/// A token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token {
    LeftParen,
    RightParen,

    /// A simple or quoted symbol.
    Symbol(String),

    /// A keyword, without the leading colon.
    Keyword(String),

    /// An unsigned numeral.
    Numeral(String),

    /// An unsigned decimal, dot included.
    Decimal(String),

    /// A string literal, without quotes.
    StringLiteral(String),
}

fn is_simple_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "~!@$%^&*_-+=<>.?/".contains(c)
}

/// Tokenises a source text, pairing each token with its line.
pub(super) fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }

            _ if c.is_whitespace() => {
                chars.next();
            }

            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }

            '(' => {
                tokens.push((Token::LeftParen, line));
                chars.next();
            }

            ')' => {
                tokens.push((Token::RightParen, line));
                chars.next();
            }

            ':' => {
                chars.next();
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_simple_symbol_char(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word.is_empty() {
                    return Err(ParseError::Lex(line));
                }
                tokens.push((Token::Keyword(word), line));
            }

            '|' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ParseError::Lex(line)),
                        Some('|') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            word.push(c);
                        }
                    }
                }
                tokens.push((Token::Symbol(word), line));
            }

            '"' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ParseError::Lex(line)),
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            word.push(c);
                        }
                    }
                }
                tokens.push((Token::StringLiteral(word), line));
            }

            _ if c.is_ascii_digit() => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if chars.peek() == Some(&'.') {
                    word.push('.');
                    chars.next();
                    let mut fraction = false;
                    while let Some(&c) = chars.peek() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        fraction = true;
                        word.push(c);
                        chars.next();
                    }
                    if !fraction {
                        return Err(ParseError::Numeral(line));
                    }
                    tokens.push((Token::Decimal(word), line));
                } else {
                    tokens.push((Token::Numeral(word), line));
                }
            }

            _ if is_simple_symbol_char(c) => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_simple_symbol_char(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push((Token::Symbol(word), line));
            }

            _ => return Err(ParseError::Lex(line)),
        }
    }

    Ok(tokens)
}
