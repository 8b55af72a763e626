// crates/shardline-expr/src/syntax.rs
// ============================================================================
// Module: Inline Expression Syntax
// Description: Lexer and recursive-descent parser for `${ ... }` bodies.
// Purpose: Turn untrusted expression text into a bounded expression tree.
// Dependencies: crate::{error, value}
// ============================================================================

//! ## Overview
//! The grammar is intentionally small: literals, variables, arithmetic,
//! comparison, boolean connectives, a ternary, builtin function calls, and
//! the two expansion forms (`a..b` ranges and `[a, b]` lists) used by
//! data-node declarations.
//!
//! ### Precedence (lowest first)
//! 1. `c ? a : b`
//! 2. `||`
//! 3. `&&`
//! 4. `==`, `!=`
//! 5. `<`, `<=`, `>`, `>=`
//! 6. `a..b`
//! 7. `+`, `-`
//! 8. `*`, `/`, `%`
//! 9. unary `-`, `!`

use crate::error::ExprError;
use crate::value::Value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum supported nesting depth for parenthesised and call expressions.
pub(crate) const MAX_NESTING: usize = 32;

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Negate,
    /// Logical negation.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` (integer addition or string concatenation).
    Add,
    /// `-`.
    Sub,
    /// `*`.
    Mul,
    /// `/` (truncating).
    Div,
    /// `%` (sign follows the dividend).
    Rem,
    /// `==`.
    Eq,
    /// `!=`.
    Ne,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `&&`.
    And,
    /// `||`.
    Or,
}

impl BinaryOp {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal value.
    Literal(Value),
    /// Variable reference resolved at evaluation time.
    Variable(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Self>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
    /// Conditional expression.
    Ternary {
        /// Condition.
        condition: Box<Self>,
        /// Value when the condition is truthy.
        then: Box<Self>,
        /// Value when the condition is falsy.
        otherwise: Box<Self>,
    },
    /// Builtin function call.
    Call {
        /// Function name.
        name: String,
        /// Arguments in call order.
        args: Vec<Self>,
    },
    /// Inclusive integer range, only meaningful for expansion.
    Range {
        /// Range start.
        start: Box<Self>,
        /// Range end (inclusive).
        end: Box<Self>,
    },
    /// Literal list, only meaningful for expansion.
    List(Vec<Self>),
}

impl Expr {
    /// Collects variable names referenced anywhere in the tree.
    pub fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Variable(name) => out.push(name),
            Self::Unary {
                operand, ..
            } => operand.collect_variables(out),
            Self::Binary {
                left,
                right,
                ..
            } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Self::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_variables(out);
                then.collect_variables(out);
                otherwise.collect_variables(out);
            }
            Self::Call {
                args, ..
            }
            | Self::List(args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
            Self::Range {
                start,
                end,
            } => {
                start.collect_variables(out);
                end.collect_variables(out);
            }
        }
    }
}

/// Parses a single expression body (the text between `${` and `}`).
///
/// `base` is the byte offset of `input` inside the enclosing template and is
/// added to every reported position.
///
/// # Errors
/// Returns [`ExprError`] on lexical or syntactic failures.
pub fn parse_expression(input: &str, base: usize) -> Result<Expr, ExprError> {
    let tokens = Lexer::new(input, base).lex()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_ternary()?;
    parser.expect_eof()?;
    Ok(expr)
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Integer literal (raw text).
    Number(String),
    /// String literal (unescaped).
    Str(String),
    /// Identifier or keyword.
    Ident(String),
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Star,
    /// `/`.
    Slash,
    /// `%`.
    Percent,
    /// `==`.
    EqEq,
    /// `!=`.
    NotEq,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `&&`.
    AndAnd,
    /// `||`.
    OrOr,
    /// `!`.
    Bang,
    /// `?`.
    Question,
    /// `:`.
    Colon,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `[`.
    LBracket,
    /// `]`.
    RBracket,
    /// `,`.
    Comma,
    /// `..`.
    DotDot,
    /// End of input.
    Eof,
}

impl Token {
    /// Formats the token for diagnostics.
    fn describe(&self) -> String {
        match self {
            Self::Number(raw) | Self::Ident(raw) => raw.clone(),
            Self::Str(text) => format!("'{text}'"),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Percent => "%".to_string(),
            Self::EqEq => "==".to_string(),
            Self::NotEq => "!=".to_string(),
            Self::Lt => "<".to_string(),
            Self::Le => "<=".to_string(),
            Self::Gt => ">".to_string(),
            Self::Ge => ">=".to_string(),
            Self::AndAnd => "&&".to_string(),
            Self::OrOr => "||".to_string(),
            Self::Bang => "!".to_string(),
            Self::Question => "?".to_string(),
            Self::Colon => ":".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::LBracket => "[".to_string(),
            Self::RBracket => "]".to_string(),
            Self::Comma => ",".to_string(),
            Self::DotDot => "..".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Token paired with its byte offset.
#[derive(Debug, Clone)]
struct SpannedToken {
    /// Token value.
    token: Token,
    /// Byte offset in the enclosing template.
    position: usize,
}

/// Lexer over one expression body.
struct Lexer<'a> {
    /// Expression text.
    input: &'a str,
    /// Current byte offset into `input`.
    offset: usize,
    /// Offset of `input` inside the enclosing template.
    base: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer.
    const fn new(input: &'a str, base: usize) -> Self {
        Self {
            input,
            offset: 0,
            base,
        }
    }

    /// Lexes the whole body.
    fn lex(mut self) -> Result<Vec<SpannedToken>, ExprError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&ch) = bytes.get(self.offset) {
            let start = self.offset;
            let token = match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                    continue;
                }
                b'0' ..= b'9' => {
                    self.consume_while(bytes, |b| b.is_ascii_digit());
                    Token::Number(self.input[start .. self.offset].to_string())
                }
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                    self.consume_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_');
                    Token::Ident(self.input[start .. self.offset].to_string())
                }
                b'\'' | b'"' => self.lex_string(bytes, ch)?,
                _ => self.lex_operator(bytes, ch)?,
            };
            tokens.push(SpannedToken {
                token,
                position: self.base + start,
            });
        }

        if tokens.is_empty() {
            return Err(ExprError::EmptyInput);
        }
        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.base + self.offset,
        });
        Ok(tokens)
    }

    /// Lexes a quoted string; `\` escapes the next character.
    fn lex_string(&mut self, bytes: &[u8], quote: u8) -> Result<Token, ExprError> {
        let start = self.offset;
        self.offset += 1;
        let mut text = String::new();
        let mut segment_start = self.offset;
        while let Some(&b) = bytes.get(self.offset) {
            if b == quote {
                text.push_str(&self.input[segment_start .. self.offset]);
                self.offset += 1;
                return Ok(Token::Str(text));
            }
            if b == b'\\' && self.offset + 1 < bytes.len() {
                text.push_str(&self.input[segment_start .. self.offset]);
                let escaped_start = self.offset + 1;
                let escaped_len =
                    self.input[escaped_start ..].chars().next().map_or(1, char::len_utf8);
                text.push_str(&self.input[escaped_start .. escaped_start + escaped_len]);
                self.offset = escaped_start + escaped_len;
                segment_start = self.offset;
                continue;
            }
            self.offset += 1;
        }
        Err(ExprError::UnterminatedString {
            position: self.base + start,
        })
    }

    /// Lexes a punctuation or operator token.
    fn lex_operator(&mut self, bytes: &[u8], ch: u8) -> Result<Token, ExprError> {
        let next = bytes.get(self.offset + 1).copied();
        let (token, width) = match (ch, next) {
            (b'=', Some(b'=')) => (Token::EqEq, 2),
            (b'!', Some(b'=')) => (Token::NotEq, 2),
            (b'<', Some(b'=')) => (Token::Le, 2),
            (b'>', Some(b'=')) => (Token::Ge, 2),
            (b'&', Some(b'&')) => (Token::AndAnd, 2),
            (b'|', Some(b'|')) => (Token::OrOr, 2),
            (b'.', Some(b'.')) => (Token::DotDot, 2),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'*', _) => (Token::Star, 1),
            (b'/', _) => (Token::Slash, 1),
            (b'%', _) => (Token::Percent, 1),
            (b'<', _) => (Token::Lt, 1),
            (b'>', _) => (Token::Gt, 1),
            (b'!', _) => (Token::Bang, 1),
            (b'?', _) => (Token::Question, 1),
            (b':', _) => (Token::Colon, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            (b'[', _) => (Token::LBracket, 1),
            (b']', _) => (Token::RBracket, 1),
            (b',', _) => (Token::Comma, 1),
            _ => {
                let found = self.input[self.offset ..].chars().next().map_or_else(
                    || char::from(ch).to_string(),
                    |c| c.to_string(),
                );
                return Err(ExprError::UnexpectedToken {
                    expected: "literal, identifier, or operator",
                    found,
                    position: self.base + self.offset,
                });
            }
        };
        self.offset += width;
        Ok(token)
    }

    /// Advances while the predicate holds.
    fn consume_while<F>(&mut self, bytes: &[u8], predicate: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if !predicate(b) {
                break;
            }
            self.offset += 1;
        }
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser producing [`Expr`] trees.
struct Parser {
    /// Token stream terminated by [`Token::Eof`].
    tokens: Vec<SpannedToken>,
    /// Index of the current token.
    index: usize,
    /// Current nesting depth.
    nesting: usize,
}

impl Parser {
    /// Creates a parser over a non-empty, EOF-terminated token stream.
    const fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    /// Parses `cond ? a : b` (right associative).
    fn parse_ternary(&mut self) -> Result<Expr, ExprError> {
        let condition = self.parse_or()?;
        if !self.matches(&Token::Question) {
            return Ok(condition);
        }
        let then = self.parse_ternary()?;
        self.expect(&Token::Colon, "`:` in conditional expression")?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Parses `||` chains.
    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.matches(&Token::OrOr) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    /// Parses `&&` chains.
    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_equality()?;
        while self.matches(&Token::AndAnd) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    /// Parses `==` / `!=` chains.
    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current().token {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
    }

    /// Parses relational comparisons.
    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.current().token {
                Token::Lt => BinaryOp::Lt,
                Token::Le => BinaryOp::Le,
                Token::Gt => BinaryOp::Gt,
                Token::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_range()?;
            left = binary(op, left, right);
        }
    }

    /// Parses an optional `start..end` range.
    fn parse_range(&mut self) -> Result<Expr, ExprError> {
        let start = self.parse_additive()?;
        if !self.matches(&Token::DotDot) {
            return Ok(start);
        }
        let end = self.parse_additive()?;
        Ok(Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    /// Parses `+` / `-` chains.
    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    /// Parses `*` / `/` / `%` chains.
    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    /// Parses unary prefixes.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.current().token {
            Token::Minus => UnaryOp::Negate,
            Token::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let position = self.current().position;
        self.advance();
        let operand = self.with_nesting(position, Self::parse_unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses literals, variables, calls, groups, and lists.
    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        match token {
            Token::Number(raw) => {
                self.advance();
                raw.parse::<i64>().map(|value| Expr::Literal(Value::Int(value))).map_err(|_| {
                    ExprError::InvalidNumber {
                        raw,
                        position,
                    }
                })
            }
            Token::Str(text) => {
                self.advance();
                Ok(Expr::Literal(Value::Str(text)))
            }
            Token::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => Ok(Expr::Literal(Value::Bool(true))),
                    "false" => Ok(Expr::Literal(Value::Bool(false))),
                    "null" => Ok(Expr::Literal(Value::Null)),
                    _ if self.matches(&Token::LParen) => self.with_nesting(position, |parser| {
                        let args = parser.parse_arguments(&Token::RParen, "`)` after arguments")?;
                        Ok(Expr::Call {
                            name,
                            args,
                        })
                    }),
                    _ => Ok(Expr::Variable(name)),
                }
            }
            Token::LParen => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let expr = parser.parse_ternary()?;
                    parser.expect(&Token::RParen, "`)`")?;
                    Ok(expr)
                })
            }
            Token::LBracket => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let items = parser.parse_arguments(&Token::RBracket, "`]` after list")?;
                    Ok(Expr::List(items))
                })
            }
            other => Err(ExprError::UnexpectedToken {
                expected: "literal, identifier, `(`, or `[`",
                found: other.describe(),
                position,
            }),
        }
    }

    /// Parses a comma-separated list terminated by `close`.
    fn parse_arguments(
        &mut self,
        close: &Token,
        expected: &'static str,
    ) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.matches(close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_ternary()?);
            if self.matches(&Token::Comma) {
                continue;
            }
            self.expect(close, expected)?;
            return Ok(args);
        }
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.nesting + 1 > MAX_NESTING {
            return Err(ExprError::NestingTooDeep {
                max_depth: MAX_NESTING,
                position,
            });
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Consumes the expected token or fails.
    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ExprError> {
        if self.matches(token) {
            return Ok(());
        }
        Err(ExprError::UnexpectedToken {
            expected,
            found: self.current().token.describe(),
            position: self.current().position,
        })
    }

    /// Ensures all tokens were consumed.
    fn expect_eof(&self) -> Result<(), ExprError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(ExprError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the current token when it has the same kind as `kind`.
    fn matches(&mut self, kind: &Token) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    /// Advances to the next token, stopping at EOF.
    const fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }
}

/// Builds a boxed binary node.
fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
