//! Predicate condition parser.
//!
//! Grammar, split purely on the literal operator tokens:
//!
//! ```text
//! Or  := And ('||' And)*
//! And := Eq ('&&' Eq)*
//! Eq  := Path '==' Literal
//! ```
//!
//! There is no escaping: a `||`, `&&` or `==` inside a quoted literal still splits.

use super::ast::BoolExpr;
use super::error::ParseError;
use super::parser::Parser;

/// Compiles a condition (the text between the predicate parentheses).
pub fn parse_condition(condition: &str) -> Result<BoolExpr, ParseError> {
    let mut any = Vec::new();

    for disjunct in condition.split("||") {
        let mut all = Vec::new();
        for clause in disjunct.split("&&") {
            all.push(parse_clause(clause, condition)?);
        }
        any.push(collapse(all, BoolExpr::And));
    }

    Ok(collapse(any, BoolExpr::Or))
}

/// Unwraps single-member groups so `a == 1` compiles to a bare `Eq`.
fn collapse(mut exprs: Vec<BoolExpr>, group: fn(Vec<BoolExpr>) -> BoolExpr) -> BoolExpr {
    if exprs.len() == 1 {
        exprs.remove(0)
    } else {
        group(exprs)
    }
}

fn parse_clause(clause: &str, condition: &str) -> Result<BoolExpr, ParseError> {
    let sides: Vec<&str> = clause.split("==").collect();
    let [left, right] = sides.as_slice() else {
        return Err(ParseError::InvalidClause {
            clause: clause.trim().to_string(),
            condition: condition.to_string(),
        });
    };

    let left = left.trim();
    let right = right.trim();

    let literal = parse_literal(right).ok_or_else(|| ParseError::InvalidLiteral {
        literal: right.to_string(),
        clause: clause.trim().to_string(),
        condition: condition.to_string(),
    })?;

    let path = Parser::parse(left).map_err(|err| ParseError::ClausePath {
        clause: clause.trim().to_string(),
        condition: condition.to_string(),
        inner: Box::new(err),
    })?;

    Ok(BoolExpr::Eq {
        path,
        literal,
        source: clause.trim().to_string(),
    })
}

/// Classifies the right side of a comparison by its first character.
///
/// Quoted strings lose the opening quote and at most one trailing quote of the same
/// kind; balance is not checked. Numbers are kept as raw text.
fn parse_literal(right: &str) -> Option<String> {
    match right.chars().next()? {
        quote @ ('"' | '\'') => {
            let rest = &right[1..];
            Some(rest.strip_suffix(quote).unwrap_or(rest).to_string())
        }
        c if c.is_ascii_digit() => Some(right.to_string()),
        _ => match right {
            "true" | "false" => Some(right.to_string()),
            _ => None,
        },
    }
}
