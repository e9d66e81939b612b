//! Arithmetic expression evaluator for checking final answers.
//!
//! Grammar: `expr := term (('+'|'-') term)*`, `term := factor (('*'|'/') factor)*`,
//! `factor := number | '(' expr ')' | '-' factor`. `×` and `÷` are accepted for `*` and `/`.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character {0:?}")]
    Unexpected(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("trailing input after expression")]
    Trailing,
    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Bound on nested parentheses and unary minus.
pub const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.peek().copied()
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.chars.next();
                    value += self.term()?;
                }
                '-' => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' | '×' => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                '/' | '÷' => {
                    self.chars.next();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some('(') | Some('-') => {
                if self.depth >= MAX_DEPTH {
                    return Err(EvalError::TooDeep);
                }
                self.depth += 1;
                let value = self.nested();
                self.depth -= 1;
                value
            }
            _ => self.atom(),
        }
    }

    /// Parenthesized expression or unary minus; caller tracks depth.
    fn nested(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    Some(c) => Err(EvalError::Unexpected(c)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(EvalError::Unexpected(c)),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s.parse::<f64>().map_err(|_| EvalError::InvalidNumber(s))
    }
}

/// Evaluates an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(EvalError::Trailing),
    }
}

/// Numeric literals in `expression`, in order of appearance.
pub fn literals(expression: &str) -> Vec<f64> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in expression.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() || c == '.' {
            current.push(c);
        } else if !current.is_empty() {
            if let Ok(v) = current.parse::<f64>() {
                out.push(v);
            }
            current.clear();
        }
    }
    out
}
