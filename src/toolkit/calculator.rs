use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::Tool;

/// Basic arithmetic over `+ - * /` with parentheses, for the occasional
/// follow-up computation on query results.
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a plain arithmetic expression, e.g. \"(3 + 4) * 2\". \
         Input is the expression only, no prose."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let value = evaluate(input)?;
        // Render integers without a trailing ".0".
        if value.fract() == 0.0 && value.abs() < 1e15 {
            Ok(format!("{}", value as i64))
        } else {
            Ok(format!("{}", value))
        }
    }
}

fn evaluate(input: &str) -> Result<f64> {
    let tokens: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        bail!("unexpected character at position {}", parser.pos);
    }
    Ok(value)
}

struct Parser {
    tokens: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.tokens.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.pos += 1;
                    value += self.term()?;
                }
                '-' => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                '/' => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        bail!("division by zero");
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() != Some(')') {
                    bail!("missing closing parenthesis");
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            other => Err(anyhow!("unexpected token: {:?}", other)),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.tokens[start..self.pos].iter().collect();
        text.parse()
            .map_err(|_| anyhow!("invalid number: {}", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evaluates_precedence_and_parens() {
        let calc = Calculator;
        assert_eq!(calc.call("2 + 3 * 4").await.unwrap(), "14");
        assert_eq!(calc.call("(2 + 3) * 4").await.unwrap(), "20");
        assert_eq!(calc.call("-3 + 5").await.unwrap(), "2");
        assert_eq!(calc.call("7 / 2").await.unwrap(), "3.5");
    }

    #[tokio::test]
    async fn rejects_garbage_and_division_by_zero() {
        let calc = Calculator;
        assert!(calc.call("what is 2+2").await.is_err());
        assert!(calc.call("1 / 0").await.is_err());
    }
}
