//! The `.bv` constraint-file front end.
//!
//! A problem file declares variables and then states one constraint per
//! line:
//!
//! ```text
//! # 4-bit modular equation
//! var A 4
//! A * 7 == 3
//! ```
//!
//! Declarations are `var <name> <width>` with widths 1..=32. Constraints are
//! infix over `+`, `-`, `*`, parentheses and the relations `==` (or `=`),
//! `<`, `<=`, `>`, `>=`. Integer literals take the width of the constraint's
//! variables; `#` starts a comment.

use sable_core::error::{SableError, SableResult};
use sable_core::expr::{ExprNode, ExprOp};
use std::collections::HashMap;

/// A parsed problem: declarations plus conjuncts.
#[derive(Debug, Clone)]
pub struct BvProblem {
    pub variables: Vec<(String, u32)>,
    pub conjuncts: Vec<ExprNode>,
}

pub fn parse(input: &str) -> SableResult<BvProblem> {
    let mut widths: HashMap<String, u32> = HashMap::new();
    let mut variables: Vec<(String, u32)> = Vec::new();
    let mut conjuncts = Vec::new();

    for (line_no, raw) in input.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_no + 1;
        if let Some(rest) = line.strip_prefix("var ") {
            let mut parts = rest.split_whitespace();
            let (Some(name), Some(width), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(SableError::Parse(format!(
                    "line {line_no}: expected `var <name> <width>`"
                )));
            };
            let width: u32 = width.parse().map_err(|_| {
                SableError::Parse(format!("line {line_no}: bad width {width:?}"))
            })?;
            if !(1..=32).contains(&width) {
                return Err(SableError::Parse(format!(
                    "line {line_no}: width {width} outside 1..=32"
                )));
            }
            match widths.insert(name.to_string(), width) {
                Some(prev) if prev != width => {
                    return Err(SableError::Parse(format!(
                        "line {line_no}: {name} redeclared at width {width} (was {prev})"
                    )))
                }
                _ => {}
            }
            if !variables.iter().any(|(n, _)| n == name) {
                variables.push((name.to_string(), width));
            }
            continue;
        }
        conjuncts.push(parse_constraint(line, &widths, line_no)?);
    }

    Ok(BvProblem {
        variables,
        conjuncts,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(u64),
    Plus,
    Minus,
    Star,
    LParen,
    RParen,
    Rel(ExprOp),
}

fn lex(line: &str, line_no: usize) -> SableResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                tokens.push(Token::Rel(ExprOp::Eq));
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Rel(ExprOp::Le));
                } else {
                    tokens.push(Token::Rel(ExprOp::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Rel(ExprOp::Ge));
                } else {
                    tokens.push(Token::Rel(ExprOp::Gt));
                }
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = digits.parse().map_err(|_| {
                    SableError::Parse(format!("line {line_no}: bad integer {digits:?}"))
                })?;
                tokens.push(Token::Int(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(SableError::Parse(format!(
                    "line {line_no}: unexpected character {other:?}"
                )))
            }
        }
    }
    Ok(tokens)
}

struct ConstraintParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    widths: &'a HashMap<String, u32>,
    width: u32,
    line_no: usize,
}

fn parse_constraint(
    line: &str,
    widths: &HashMap<String, u32>,
    line_no: usize,
) -> SableResult<ExprNode> {
    let tokens = lex(line, line_no)?;
    // integer literals take the width of the constraint's variables
    let width = tokens
        .iter()
        .find_map(|t| match t {
            Token::Ident(name) => widths.get(name).copied(),
            _ => None,
        })
        .ok_or_else(|| {
            SableError::Parse(format!(
                "line {line_no}: constraint mentions no declared variable"
            ))
        })?;
    let mut parser = ConstraintParser {
        tokens,
        pos: 0,
        widths,
        width,
        line_no,
    };
    let constraint = parser.relation()?;
    if parser.pos != parser.tokens.len() {
        return Err(SableError::Parse(format!(
            "line {line_no}: trailing input after constraint"
        )));
    }
    Ok(constraint)
}

impl ConstraintParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> SableError {
        SableError::Parse(format!("line {}: {message}", self.line_no))
    }

    /// `constraint := expr relop expr`
    fn relation(&mut self) -> SableResult<ExprNode> {
        let lhs = self.expr()?;
        let Some(Token::Rel(op)) = self.bump() else {
            return Err(self.error("expected a relation"));
        };
        let rhs = self.expr()?;
        Ok(ExprNode::Op {
            op,
            children: vec![lhs, rhs],
        })
    }

    /// `expr := term (('+' | '-') term)*`
    fn expr(&mut self) -> SableResult<ExprNode> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    lhs = lhs.add(self.term()?);
                }
                Some(Token::Minus) => {
                    self.bump();
                    lhs = lhs.sub(self.term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// `term := factor ('*' factor)*`
    fn term(&mut self) -> SableResult<ExprNode> {
        let mut lhs = self.factor()?;
        while self.peek() == Some(&Token::Star) {
            self.bump();
            lhs = lhs.mul(self.factor()?);
        }
        Ok(lhs)
    }

    /// `factor := ident | int | '(' expr ')'`
    fn factor(&mut self) -> SableResult<ExprNode> {
        match self.bump() {
            Some(Token::Ident(name)) => {
                let width = self
                    .widths
                    .get(&name)
                    .copied()
                    .ok_or_else(|| self.error(&format!("undeclared variable {name}")))?;
                Ok(ExprNode::bitvec(name, width))
            }
            Some(Token::Int(value)) => Ok(ExprNode::constant(value, self.width)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if self.bump() != Some(Token::RParen) {
                    return Err(self.error("expected `)`"));
                }
                Ok(inner)
            }
            _ => Err(self.error("expected a variable, integer or `(`")),
        }
    }
}
