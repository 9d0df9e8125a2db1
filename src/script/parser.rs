//! Recursive-descent parser for the restricted script dialect.
//!
//! The accepted grammar covers what structure-registration fragments
//! actually use: variable declarations, assignments into object members,
//! object/array literals, zero-argument function declarations and calls,
//! `typeof`, `!`, strict (in)equality, and `if`/`else`. Anything outside
//! that surface is a parse error, which the extraction layer treats as a
//! failed fragment rather than a failed build.

use super::lexer::{tokenize, SpannedToken, Token};
use super::ScriptError;

/// A statement in fragment source.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var`/`let`/`const` declaration, with optional initializer.
    VarDecl { name: String, init: Option<Expr> },
    /// Named function declaration. Parameters are not supported; the
    /// registration hook takes none.
    FunctionDecl { name: String, body: Vec<Stmt> },
    /// `if (...) { ... } else { ... }`
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    /// `return` with optional value, inside a function body.
    Return(Option<Expr>),
    /// Bare expression statement (assignment or call).
    Expr(Expr),
}

/// An expression in fragment source.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String, number, boolean, or null literal.
    Literal(serde_json::Value),
    /// The `undefined` keyword.
    Undefined,
    /// Identifier reference.
    Ident(String),
    /// Property access: `object.property`.
    Member { object: Box<Expr>, property: String },
    /// Computed access: `object[index]`.
    Index { object: Box<Expr>, index: Box<Expr> },
    /// Assignment: `target = value`.
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// Call: `callee(args...)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `typeof operand`.
    Typeof(Box<Expr>),
    /// `!operand`.
    Not(Box<Expr>),
    /// Strict (in)equality: `left === right` / `left !== right`.
    Eq {
        left: Box<Expr>,
        right: Box<Expr>,
        negated: bool,
    },
    /// Object literal, entries in declared order.
    Object(Vec<(String, Expr)>),
    /// Array literal.
    Array(Vec<Expr>),
}

/// Parses fragment source into a statement list.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn parse_program(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            if self.eat(&Token::Semi) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.peek_ident() {
            Some("var") | Some("let") | Some("const") => self.parse_var_decl(),
            Some("function") => self.parse_function_decl(),
            Some("if") => self.parse_if(),
            Some("return") => self.parse_return(),
            _ => {
                let expr = self.parse_expression()?;
                self.eat(&Token::Semi);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ScriptError> {
        self.advance(); // var / let / const
        let name = self.expect_ident("variable name")?;
        let init = if self.eat(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.eat(&Token::Semi);
        Ok(Stmt::VarDecl { name, init })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ScriptError> {
        self.advance(); // function
        let name = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'('")?;
        self.expect(&Token::RParen, "')' (parameters are not supported)")?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDecl { name, body })
    }

    fn parse_if(&mut self) -> Result<Stmt, ScriptError> {
        self.advance(); // if
        self.expect(&Token::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(&Token::RParen, "')'")?;
        let then_branch = self.parse_branch()?;
        let else_branch = if self.peek_ident() == Some("else") {
            self.advance();
            Some(self.parse_branch()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ScriptError> {
        self.advance(); // return
        if self.eat(&Token::Semi) || self.check(&Token::RBrace) || self.at_end() {
            return Ok(Stmt::Return(None));
        }
        let value = self.parse_expression()?;
        self.eat(&Token::Semi);
        Ok(Stmt::Return(Some(value)))
    }

    /// A branch is either a `{ ... }` block or a single statement.
    fn parse_branch(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        if self.check(&Token::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.at_end() {
                return Err(self.error("unterminated block"));
            }
            if self.eat(&Token::Semi) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.advance(); // }
        Ok(statements)
    }

    fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ScriptError> {
        let target = self.parse_equality()?;
        if self.eat(&Token::Assign) {
            if !matches!(target, Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. }) {
                return Err(self.error("invalid assignment target"));
            }
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_unary()?;
        loop {
            let negated = if self.eat(&Token::Eq) {
                false
            } else if self.eat(&Token::NotEq) {
                true
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Eq {
                left: Box::new(left),
                right: Box::new(right),
                negated,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if self.peek_ident() == Some("typeof") {
            self.advance();
            return Ok(Expr::Typeof(Box::new(self.parse_unary()?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let property = self.expect_ident("property name")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expression()?;
                self.expect(&Token::RBracket, "']'")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if !self.check(&Token::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RParen, "')'")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        if self.check(&Token::LBrace) {
            return self.parse_object_literal();
        }
        if self.eat(&Token::LBracket) {
            let mut elements = Vec::new();
            while !self.check(&Token::RBracket) {
                elements.push(self.parse_expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RBracket, "']'")?;
            return Ok(Expr::Array(elements));
        }
        if self.eat(&Token::LParen) {
            let inner = self.parse_expression()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(inner);
        }

        match self.advance_token() {
            Some(Token::Str(s)) => Ok(Expr::Literal(serde_json::Value::String(s))),
            Some(Token::Number(n)) => Ok(Expr::Literal(number_literal(n))),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(serde_json::Value::Bool(true))),
                "false" => Ok(Expr::Literal(serde_json::Value::Bool(false))),
                "null" => Ok(Expr::Literal(serde_json::Value::Null)),
                "undefined" => Ok(Expr::Undefined),
                _ => Ok(Expr::Ident(name)),
            },
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ScriptError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut entries = Vec::new();
        while !self.check(&Token::RBrace) {
            let key = match self.advance_token() {
                Some(Token::Ident(name)) => name,
                Some(Token::Str(s)) => s,
                Some(Token::Number(n)) => format_number_key(n),
                _ => return Err(self.error("expected an object key")),
            };
            self.expect(&Token::Colon, "':'")?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}'")?;
        Ok(Expr::Object(entries))
    }

    // Token-stream helpers

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Ident(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<(), ScriptError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ScriptError> {
        match self.advance_token() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error(&format!("expected {}", what))),
        }
    }

    fn error(&self, message: &str) -> ScriptError {
        let line = self
            .tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(1);
        ScriptError::Parse {
            message: message.to_string(),
            line,
        }
    }
}

/// Converts a lexed number to the narrowest JSON representation.
fn number_literal(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Value::from(n)
    }
}

fn format_number_key(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
