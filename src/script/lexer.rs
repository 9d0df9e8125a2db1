//! Tokenizer for the restricted script dialect.
//!
//! Handles the lexical surface of the fragments collection authors embed in
//! test scripts: identifiers, string/number literals, the punctuation of
//! object and array literals, assignment, and the strict (in)equality
//! operators. Line and block comments are skipped, as are all forms of
//! whitespace.

use super::ScriptError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or keyword (keywords are resolved by the parser).
    Ident(String),
    /// String literal, quotes and escapes already resolved.
    Str(String),
    /// Numeric literal.
    Number(f64),

    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semi,
    /// `.`
    Dot,
    /// `=`
    Assign,
    /// `==` or `===`
    Eq,
    /// `!=` or `!==`
    NotEq,
    /// `!`
    Bang,
}

/// A token paired with the 1-based source line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Tokenizes fragment source into a token stream.
///
/// # Arguments
///
/// * `source` - Raw fragment text
///
/// # Returns
///
/// The token stream, or a [`ScriptError::Lex`] naming the offending line.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ScriptError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        // Line comment
        if ch == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if ch == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            loop {
                if i + 1 >= chars.len() {
                    return Err(ScriptError::Lex {
                        message: "unterminated block comment".to_string(),
                        line,
                    });
                }
                if chars[i] == '*' && chars[i + 1] == '/' {
                    i += 2;
                    break;
                }
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            continue;
        }

        if ch == '\'' || ch == '"' {
            let (literal, consumed, lines) = read_string(&chars[i..], ch, line)?;
            tokens.push(SpannedToken {
                token: Token::Str(literal),
                line,
            });
            line += lines;
            i += consumed;
            continue;
        }

        if ch.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let number = text.parse::<f64>().map_err(|_| ScriptError::Lex {
                message: format!("invalid number literal '{}'", text),
                line,
            })?;
            tokens.push(SpannedToken {
                token: Token::Number(number),
                line,
            });
            continue;
        }

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(SpannedToken {
                token: Token::Ident(chars[start..i].iter().collect()),
                line,
            });
            continue;
        }

        let token = match ch {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semi,
            '.' => Token::Dot,
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    // == or ===; both lex to the same strict token.
                    i += if chars.get(i + 2) == Some(&'=') { 2 } else { 1 };
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    i += if chars.get(i + 2) == Some(&'=') { 2 } else { 1 };
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            other => {
                return Err(ScriptError::Lex {
                    message: format!("unexpected character '{}'", other),
                    line,
                });
            }
        };
        tokens.push(SpannedToken { token, line });
        i += 1;
    }

    Ok(tokens)
}

/// Reads a quoted string starting at `chars[0]`.
///
/// Returns the decoded literal, the number of chars consumed (including
/// both quotes), and how many newlines were crossed.
fn read_string(
    chars: &[char],
    quote: char,
    start_line: usize,
) -> Result<(String, usize, usize), ScriptError> {
    let mut literal = String::new();
    let mut lines = 0;
    let mut i = 1;

    while i < chars.len() {
        let ch = chars[i];
        if ch == quote {
            return Ok((literal, i + 1, lines));
        }
        if ch == '\\' {
            let escaped = chars.get(i + 1).ok_or(ScriptError::Lex {
                message: "unterminated string literal".to_string(),
                line: start_line + lines,
            })?;
            literal.push(match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => *other,
            });
            i += 2;
            continue;
        }
        if ch == '\n' {
            lines += 1;
        }
        literal.push(ch);
        i += 1;
    }

    Err(ScriptError::Lex {
        message: "unterminated string literal".to_string(),
        line: start_line + lines,
    })
}
