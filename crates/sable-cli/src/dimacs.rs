//! DIMACS CNF parsing.
//!
//! Accepts the usual format: `c` comment lines, an optional `p cnf V C`
//! problem line, and whitespace-separated signed literals with `0`
//! terminating each clause.

use sable_core::cnf::{Clause, CnfFormula, Lit};
use sable_core::error::{SableError, SableResult};

pub fn parse(input: &str) -> SableResult<CnfFormula> {
    let mut formula = CnfFormula::new();
    let mut current: Vec<Lit> = Vec::new();
    let mut declared_vars = None;

    for (line_no, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('p') {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("cnf"), Some(vars)) => {
                    declared_vars = Some(vars.parse::<usize>().map_err(|_| {
                        SableError::Parse(format!(
                            "line {}: bad variable count {vars:?}",
                            line_no + 1
                        ))
                    })?);
                }
                _ => {
                    return Err(SableError::Parse(format!(
                        "line {}: malformed problem line",
                        line_no + 1
                    )))
                }
            }
            continue;
        }
        for token in line.split_whitespace() {
            let code: i32 = token.parse().map_err(|_| {
                SableError::Parse(format!("line {}: bad literal {token:?}", line_no + 1))
            })?;
            match Lit::new(code) {
                Some(lit) => current.push(lit),
                None => formula.push(Clause::new(current.drain(..))),
            }
        }
    }
    // tolerate a final clause without its terminating 0
    if !current.is_empty() {
        formula.push(Clause::new(current));
    }
    if let Some(vars) = declared_vars {
        formula.reserve_vars(vars);
    }
    Ok(formula)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_file() {
        let formula = parse("c a comment\np cnf 3 2\n1 -2 0\n2 3 0\n").unwrap();
        assert_eq!(formula.clauses().len(), 2);
        assert_eq!(formula.num_vars(), 3);
    }

    #[test]
    fn test_clause_spanning_lines() {
        let formula = parse("1 2\n-3 0\n").unwrap();
        assert_eq!(formula.clauses().len(), 1);
        assert_eq!(formula.clauses()[0].len(), 3);
    }

    #[test]
    fn test_header_reserves_unused_vars() {
        let formula = parse("p cnf 9 1\n1 0\n").unwrap();
        assert_eq!(formula.num_vars(), 9);
    }

    #[test]
    fn test_bad_literal_is_a_parse_error() {
        assert!(parse("1 x 0\n").is_err());
    }

    #[test]
    fn test_malformed_header_is_a_parse_error() {
        assert!(parse("p sat 3 2\n").is_err());
    }
}
