//! Hit-point input: signed deltas, absolute values and small arithmetic.
//!
//! Accepted syntax is numeric literals, `+ - * /`, parentheses and
//! whitespace.  Anything else is rejected; nothing is ever executed.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | '(' expr ')'
//! ```

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected '{ch}' at position {pos}")]
    Unexpected { ch: char, pos: usize },
    #[error("expression ends too early")]
    UnexpectedEnd,
    #[error("malformed number at position {pos}")]
    BadNumber { pos: usize },
    #[error("too many nested parentheses")]
    TooDeep,
    #[error("result is not a finite number")]
    NotFinite,
    #[error("result {0} is out of range")]
    OutOfRange(f64),
}

/// Evaluate an arithmetic expression.  The result is always finite.
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    if parser.peek().is_none() {
        return Err(ExprError::Empty);
    }
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some((pos, ch)) = parser.current() {
        return Err(ExprError::Unexpected { ch, pos });
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(value)
}

/// What a hit-point field submission means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HpInput {
    /// Leading `+`/`-`: added to the current value.
    Delta(f64),
    /// Anything else: the new value.
    Absolute(f64),
}

impl HpInput {
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let trimmed = input.trim();
        let value = evaluate(trimmed)?;
        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            Ok(HpInput::Delta(value))
        } else {
            Ok(HpInput::Absolute(value))
        }
    }

    /// New hit points, rounded to the nearest integer.
    pub fn apply(&self, current: i32) -> Result<i32, ExprError> {
        let raw = match *self {
            HpInput::Delta(d) => current as f64 + d,
            HpInput::Absolute(v) => v,
        };
        let rounded = raw.round();
        if !rounded.is_finite() {
            return Err(ExprError::NotFinite);
        }
        if rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
            return Err(ExprError::OutOfRange(rounded));
        }
        Ok(rounded as i32)
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn current(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.current().map(|(_, c)| c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some('+') => {
                self.pos += 1;
                self.nested(|p| p.unary())
            }
            Some('-') => {
                self.pos += 1;
                self.nested(|p| p.unary()).map(|v| -v)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.current() {
            None => Err(ExprError::UnexpectedEnd),
            Some((_, '(')) => {
                self.pos += 1;
                let value = self.nested(|p| p.expr())?;
                self.skip_ws();
                match self.current() {
                    Some((_, ')')) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some((pos, ch)) => Err(ExprError::Unexpected { ch, pos }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((_, c)) if c.is_ascii_digit() || c == '.' => self.number(),
            Some((pos, ch)) => Err(ExprError::Unexpected { ch, pos }),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        let start_byte = self.chars[start].0;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
        literal
            .parse::<f64>()
            .map_err(|_| ExprError::BadNumber { pos: start_byte })
    }

    fn nested<F>(&mut self, f: F) -> Result<f64, ExprError>
    where
        F: FnOnce(&mut Self) -> Result<f64, ExprError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
