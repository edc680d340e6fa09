//! Path expression parser.

use std::str::FromStr;

use super::ast::{Root, Selector, YamlPath};
use super::condition::parse_condition;
use super::error::ParseError;

/// Parser for path expressions such as `$.spec.containers[?(@.name == 'nginx')].image`.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given expression.
    pub fn new(expr: &'a str) -> Self {
        Self {
            input: expr,
            position: 0,
        }
    }

    /// Parses the expression into a `YamlPath`.
    pub fn parse(expr: &str) -> Result<YamlPath, ParseError> {
        Parser::new(expr).parse_path()
    }

    fn parse_path(&mut self) -> Result<YamlPath, ParseError> {
        let root = match self.next() {
            Some('$') => Root::Absolute,
            Some('@') => Root::Current,
            Some(ch) => {
                return Err(ParseError::MissingRoot {
                    found: ch.to_string(),
                    expr: self.input.to_string(),
                })
            }
            None => {
                return Err(ParseError::UnexpectedEnd {
                    position: 0,
                    expected: "`$` or `@`".to_string(),
                })
            }
        };

        match self.peek() {
            Some('.') => {}
            Some(_) => {
                return Err(ParseError::MissingDot {
                    position: self.position,
                    found: self.rest().to_string(),
                    expr: self.input.to_string(),
                })
            }
            None => {
                return Err(ParseError::UnexpectedEnd {
                    position: self.position,
                    expected: "`.` after the root marker".to_string(),
                })
            }
        }

        let mut selectors = Vec::new();
        while let Some(ch) = self.peek() {
            let selector = match ch {
                '.' => self.parse_property()?,
                '[' => self.parse_bracket()?,
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.position,
                        found: self.rest().to_string(),
                        expected: "any of `.`, `[`".to_string(),
                    })
                }
            };
            selectors.push(selector);
        }

        Ok(YamlPath::new(root, selectors))
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// The unread part of the input.
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Parses `.NAME`, where NAME runs to the next `.`, `[` or the end.
    fn parse_property(&mut self) -> Result<Selector, ParseError> {
        self.next();
        let start = self.position;
        let len = self.rest().find(['.', '[']).unwrap_or(self.rest().len());
        let name = &self.input[start..start + len];

        if name.is_empty() {
            return Err(if self.rest().is_empty() {
                ParseError::UnexpectedEnd {
                    position: start,
                    expected: "property name".to_string(),
                }
            } else {
                ParseError::UnexpectedToken {
                    position: start,
                    found: self.rest().to_string(),
                    expected: "property name".to_string(),
                }
            });
        }
        if name.starts_with(['-', '+']) {
            return Err(ParseError::InvalidProperty {
                position: start,
                name: name.to_string(),
            });
        }

        self.position += len;
        Ok(Selector::PropertyOrIndex(name.to_string()))
    }

    /// Parses `[N]`, `[?( COND )]` or `[*]?( COND )`.
    fn parse_bracket(&mut self) -> Result<Selector, ParseError> {
        if self.rest().starts_with("[?(") {
            self.position += 3;
            self.parse_predicate(")]")
        } else if self.rest().starts_with("[*]?(") {
            self.position += 5;
            self.parse_predicate(")")
        } else {
            self.next();
            self.parse_index()
        }
    }

    fn parse_index(&mut self) -> Result<Selector, ParseError> {
        let start = self.position;
        let Some(len) = self.rest().find(']') else {
            return Err(ParseError::UnexpectedEnd {
                position: self.input.len(),
                expected: "`]`".to_string(),
            });
        };

        let digits = &self.input[start..start + len];
        let invalid = || ParseError::InvalidIndex {
            position: start,
            found: digits.to_string(),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let idx = digits.parse::<usize>().map_err(|_| invalid())?;

        self.position = start + len + 1;
        Ok(Selector::Index(idx))
    }

    /// Reads the condition up to the first `terminator` and compiles it.
    fn parse_predicate(&mut self, terminator: &str) -> Result<Selector, ParseError> {
        let start = self.position;
        let Some(len) = self.rest().find(terminator) else {
            return Err(ParseError::UnexpectedEnd {
                position: self.input.len(),
                expected: format!("`{}`", terminator),
            });
        };

        let condition = &self.input[start..start + len];
        let expr = parse_condition(condition).map_err(|err| ParseError::InPredicate {
            position: start,
            condition: condition.to_string(),
            inner: Box::new(err),
        })?;

        self.position = start + len + terminator.len();
        Ok(Selector::Predicate(expr))
    }
}

/// Compiles a path expression into a reusable `YamlPath`.
pub fn compile_path(expr: &str) -> Result<YamlPath, ParseError> {
    Parser::parse(expr)
}

impl FromStr for YamlPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yamlpath::ast::BoolExpr;

    fn prop(name: &str) -> Selector {
        Selector::PropertyOrIndex(name.to_string())
    }

    #[test]
    fn test_parse_child() {
        let result = Parser::parse("$.foo.bar");
        assert!(result.is_ok());
        let path = result.unwrap();
        assert_eq!(path.root, Root::Absolute);
        assert_eq!(path.selectors, vec![prop("foo"), prop("bar")]);
    }

    #[test]
    fn test_parse_current_root() {
        let path = Parser::parse("@.name").unwrap();
        assert_eq!(path.root, Root::Current);
        assert_eq!(path.selectors, vec![prop("name")]);
    }

    #[test]
    fn test_parse_array_index() {
        let path = Parser::parse("$.spec.containers[1].privileged").unwrap();
        assert_eq!(
            path.selectors,
            vec![
                prop("spec"),
                prop("containers"),
                Selector::Index(1),
                prop("privileged")
            ]
        );
    }

    #[test]
    fn test_parse_dot_index() {
        let path = Parser::parse("$.spec.containers.1.privileged").unwrap();
        assert_eq!(path.selectors[2], prop("1"));
    }

    #[test]
    fn test_parse_consecutive_indexes() {
        let path = Parser::parse("$.matrix[0][12]").unwrap();
        assert_eq!(
            path.selectors,
            vec![prop("matrix"), Selector::Index(0), Selector::Index(12)]
        );
    }

    #[test]
    fn test_parse_inline_predicate() {
        let path = Parser::parse("$.spec.containers[?(@.privileged == true)].privileged").unwrap();
        assert_eq!(path.selectors.len(), 4);
        match &path.selectors[2] {
            Selector::Predicate(BoolExpr::Eq { literal, .. }) => assert_eq!(literal, "true"),
            other => panic!("expected predicate, got {:?}", other),
        }
        assert_eq!(path.selectors[3], prop("privileged"));
    }

    #[test]
    fn test_both_predicate_spellings_compile_alike() {
        let inline = Parser::parse("$.items[?(@.name == 'a')].value").unwrap();
        let star = Parser::parse("$.items[*]?(@.name == 'a').value").unwrap();
        assert_eq!(inline, star);
    }

    #[test]
    fn test_display() {
        let path = Parser::parse("$.a[2][*]?(@.b == 'c').d").unwrap();
        assert_eq!(path.to_string(), "$.a[2][?(@.b == 'c')].d");
    }

    #[test]
    fn test_from_str() {
        let path: YamlPath = "$.metadata.name".parse().unwrap();
        assert_eq!(path.selectors, vec![prop("metadata"), prop("name")]);
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(matches!(
            Parser::parse(""),
            Err(ParseError::UnexpectedEnd { position: 0, .. })
        ));
    }

    #[test]
    fn test_parse_missing_root_fails() {
        let err = Parser::parse("spec.containers").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRoot {
                found: "s".to_string(),
                expr: "spec.containers".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_missing_dot_fails() {
        let err = Parser::parse("$foo").unwrap_err();
        assert!(matches!(err, ParseError::MissingDot { position: 1, ref found, .. } if found == "foo"));
        assert!(matches!(
            Parser::parse("$"),
            Err(ParseError::UnexpectedEnd { position: 1, .. })
        ));
    }

    #[test]
    fn test_parse_signed_property_fails() {
        let err = Parser::parse("$.spec.-replicas").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidProperty {
                position: 7,
                name: "-replicas".to_string(),
            }
        );
        assert!(Parser::parse("$.+1").is_err());
    }

    #[test]
    fn test_parse_dash_inside_property_is_allowed() {
        let path = Parser::parse("$.metadata.app-name").unwrap();
        assert_eq!(path.selectors[1], prop("app-name"));
    }

    #[test]
    fn test_parse_empty_property_fails() {
        assert!(matches!(
            Parser::parse("$.foo."),
            Err(ParseError::UnexpectedEnd { position: 6, .. })
        ));
        assert!(matches!(
            Parser::parse("$..foo"),
            Err(ParseError::UnexpectedToken { position: 2, .. })
        ));
    }

    #[test]
    fn test_parse_stray_token_fails() {
        let err = Parser::parse("$.items[0]x").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                position: 10,
                found: "x".to_string(),
                expected: "any of `.`, `[`".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unterminated_brackets_fail() {
        assert!(matches!(
            Parser::parse("$.items[0"),
            Err(ParseError::UnexpectedEnd { position: 9, .. })
        ));
        assert!(matches!(
            Parser::parse("$.items[?(@.a == 1)"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Parser::parse("$.items[*]?(@.a == 1"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_parse_bad_index_fails() {
        for expr in ["$.items[-1]", "$.items[]", "$.items[a]", "$.items[+2]"] {
            assert!(
                matches!(Parser::parse(expr), Err(ParseError::InvalidIndex { position: 8, .. })),
                "{} should fail",
                expr
            );
        }
    }

    #[test]
    fn test_parse_bad_condition_reports_offset() {
        let err = Parser::parse("$.items[?(@.name = 'a')]").unwrap_err();
        match err {
            ParseError::InPredicate {
                position,
                condition,
                inner,
            } => {
                assert_eq!(position, 10);
                assert_eq!(condition, "@.name = 'a'");
                assert!(matches!(*inner, ParseError::InvalidClause { .. }));
            }
            other => panic!("expected InPredicate, got {:?}", other),
        }
    }
}
