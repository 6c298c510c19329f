//! Filter query parser using nom.
//!
//! # Grammar
//!
//! ```text
//! Expr    := OrExpr
//! OrExpr  := AndExpr ( "OR" AndExpr )*
//! AndExpr := NotExpr ( "AND"? NotExpr )*
//! NotExpr := "NOT" Single | Single
//! Single  := "(" Expr ")" | Key ":" Value
//! Value   := '"' [^"]+ '"' | [^"()\s]+
//! ```
//!
//! `NOT` binds tighter than `AND`, which binds tighter than `OR`. Both binary
//! operators fold to the left, and two expressions written side by side are
//! joined with `AND`. Keywords and keys are case-insensitive; keys come out
//! lowercase, values come out exactly as written.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::char,
    combinator::{map, peek, verify},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use tracing::debug;

use crate::ast::FilterNode;
use crate::error::InvalidQuery;
use crate::keys::{is_key_char, KeySet};

/// Deepest bracket nesting a query may use.
pub const MAX_NESTING: usize = 128;

/// Parses queries against a key set fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct FilterParser {
    keys: KeySet,
}

impl FilterParser {
    pub fn new(keys: KeySet) -> Self {
        Self { keys }
    }

    /// Keys this parser accepts.
    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Parse `query` into a filter tree.
    pub fn parse(&self, query: &str) -> Result<FilterNode, InvalidQuery> {
        parse(query, &self.keys)
    }
}

/// Parse a complete filter query.
///
/// Either the whole input is one expression over keys from `keys`, or the
/// result is [`InvalidQuery`]. Brackets nested deeper than [`MAX_NESTING`]
/// are rejected.
pub fn parse(query: &str, keys: &KeySet) -> Result<FilterNode, InvalidQuery> {
    let mut expr = delimited(sp, |i| parse_or_expr(i, keys, 0), sp);

    match expr(query) {
        Ok(("", node)) => Ok(node),
        Ok((remaining, _)) => {
            debug!(
                offset = query.len() - remaining.len(),
                remaining, "filter query has trailing content"
            );
            Err(InvalidQuery)
        }
        Err(e) => {
            debug!(error = ?e, "filter query did not parse");
            Err(InvalidQuery)
        }
    }
}

/// Insignificant whitespace.
fn sp(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace)(input)
}

/// A case-insensitive keyword that must be followed by whitespace or `(`.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(
        tag_no_case(word),
        peek(alt((take_while1(char::is_whitespace), tag("(")))),
    )
}

/// OR level: `AndExpr (OR AndExpr)*`, folded left.
fn parse_or_expr<'a>(input: &'a str, keys: &KeySet, depth: usize) -> IResult<&'a str, FilterNode> {
    let (mut input, mut left) = parse_and_expr(input, keys, depth)?;

    loop {
        let step = preceded(tuple((sp, keyword("or"), sp)), |i| parse_and_expr(i, keys, depth))(input);
        match step {
            Ok((remaining, right)) => {
                left = FilterNode::or(left, right);
                input = remaining;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, left))
}

/// AND level: explicit `AND` or plain juxtaposition, folded left.
fn parse_and_expr<'a>(input: &'a str, keys: &KeySet, depth: usize) -> IResult<&'a str, FilterNode> {
    let (mut input, mut left) = parse_not_expr(input, keys, depth)?;

    loop {
        let step = alt((
            preceded(tuple((sp, keyword("and"), sp)), |i| parse_not_expr(i, keys, depth)),
            preceded(sp, |i| parse_not_expr(i, keys, depth)),
        ))(input);
        match step {
            Ok((remaining, right)) => {
                left = FilterNode::and(left, right);
                input = remaining;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, left))
}

/// `NOT Single` or `Single`.
fn parse_not_expr<'a>(input: &'a str, keys: &KeySet, depth: usize) -> IResult<&'a str, FilterNode> {
    alt((
        map(
            preceded(pair(keyword("not"), sp), |i| parse_single(i, keys, depth)),
            FilterNode::not,
        ),
        |i| parse_single(i, keys, depth),
    ))(input)
}

/// A bracketed group or a literal.
fn parse_single<'a>(input: &'a str, keys: &KeySet, depth: usize) -> IResult<&'a str, FilterNode> {
    alt((|i| parse_group(i, keys, depth), |i| parse_literal(i, keys)))(input)
}

/// `( Expr )`; an empty group does not parse.
///
/// `depth` counts the groups already open around `input`.
fn parse_group<'a>(input: &'a str, keys: &KeySet, depth: usize) -> IResult<&'a str, FilterNode> {
    if depth >= MAX_NESTING && input.starts_with('(') {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::TooLarge)));
    }
    delimited(
        pair(char('('), sp),
        |i| parse_or_expr(i, keys, depth + 1),
        pair(sp, char(')')),
    )(input)
}

/// `key:value`, with optional whitespace around the colon.
fn parse_literal<'a>(input: &'a str, keys: &KeySet) -> IResult<&'a str, FilterNode> {
    let (input, key) = parse_key(input, keys)?;
    let (input, _) = delimited(sp, char(':'), sp)(input)?;
    let (input, value) = parse_value(input)?;

    Ok((
        input,
        FilterNode::Literal {
            key,
            value: value.to_string(),
        },
    ))
}

/// A key from the key set, lowercased.
fn parse_key<'a>(input: &'a str, keys: &KeySet) -> IResult<&'a str, String> {
    map(
        verify(take_while1(is_key_char), |k: &str| keys.contains(k)),
        |k: &str| k.to_lowercase(),
    )(input)
}

/// A quoted or bare value. Neither form may be empty.
fn parse_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while1(|c: char| c != '"'), char('"')),
        take_while1(|c: char| !c.is_whitespace() && c != '"' && c != '(' && c != ')'),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys() -> KeySet {
        KeySet::from_keys(["name", "tag", "owner", "order", "notes"]).unwrap()
    }

    fn lit(key: &str, value: &str) -> FilterNode {
        FilterNode::literal(key, value)
    }

    #[test]
    fn test_simple_literal() {
        assert_eq!(parse("name:foo", &keys()), Ok(lit("name", "foo")));
    }

    #[test]
    fn test_quoted_value_keeps_spaces() {
        assert_eq!(
            parse(r#"name:"foo bar""#, &keys()),
            Ok(lit("name", "foo bar"))
        );
    }

    #[test]
    fn test_quoted_value_keeps_brackets_and_keywords() {
        assert_eq!(
            parse(r#"name:"(a OR b)""#, &keys()),
            Ok(lit("name", "(a OR b)"))
        );
    }

    #[test]
    fn test_value_may_contain_colon() {
        assert_eq!(parse("tag:team:core", &keys()), Ok(lit("tag", "team:core")));
    }

    #[test]
    fn test_value_is_verbatim() {
        assert_eq!(parse("name:FooBar", &keys()), Ok(lit("name", "FooBar")));
    }

    #[test]
    fn test_and_folds_left() {
        let expected = FilterNode::and(
            FilterNode::and(lit("name", "a"), lit("tag", "b")),
            lit("owner", "c"),
        );
        assert_eq!(parse("name:a AND tag:b owner:c", &keys()), Ok(expected));
    }

    #[test]
    fn test_or_folds_left() {
        let expected = FilterNode::or(
            FilterNode::or(lit("name", "a"), lit("tag", "b")),
            lit("owner", "c"),
        );
        assert_eq!(parse("name:a OR tag:b OR owner:c", &keys()), Ok(expected));
    }

    #[test]
    fn test_not_before_group() {
        let expected = FilterNode::not(FilterNode::or(lit("name", "a"), lit("tag", "b")));
        assert_eq!(parse("NOT(name:a OR tag:b)", &keys()), Ok(expected));
    }

    #[test]
    fn test_implicit_and_with_not() {
        let expected = FilterNode::and(lit("name", "a"), FilterNode::not(lit("tag", "b")));
        assert_eq!(parse("name:a not tag:b", &keys()), Ok(expected));
    }

    #[test]
    fn test_juxtaposed_group_without_space() {
        let expected = FilterNode::and(lit("name", "a"), lit("tag", "b"));
        assert_eq!(parse("name:a(tag:b)", &keys()), Ok(expected));
    }

    #[test]
    fn test_keyword_prefixed_keys() {
        let expected = FilterNode::and(
            FilterNode::and(lit("order", "x"), lit("notes", "y")),
            lit("owner", "z"),
        );
        assert_eq!(parse("order:x notes:y owner:z", &keys()), Ok(expected));
    }

    #[test]
    fn test_nested_groups() {
        let expected = FilterNode::and(
            lit("name", "a"),
            FilterNode::or(
                lit("tag", "b"),
                FilterNode::not(FilterNode::and(lit("owner", "c"), lit("tag", "d"))),
            ),
        );
        assert_eq!(
            parse("name:a ((tag:b) OR NOT (owner:c tag:d))", &keys()),
            Ok(expected)
        );
    }

    #[test]
    fn test_double_not_needs_brackets() {
        assert_eq!(parse("NOT NOT name:a", &keys()), Err(InvalidQuery));
        assert_eq!(
            parse("NOT (NOT name:a)", &keys()),
            Ok(FilterNode::not(FilterNode::not(lit("name", "a"))))
        );
    }

    #[test]
    fn test_failures() {
        let keys = keys();
        for query in [
            "",
            "   ",
            "name:",
            "name",
            ":foo",
            "name:foo tag:",
            "foo:bar",
            "name:foo AND ()",
            "()",
            "(name:foo",
            "name:foo)",
            "name:\"foo",
            "name:\"\"",
            "name:foo AND",
            "name:foo OR",
            "OR name:foo",
            "NOT",
            "NOTname:foo",
            "name:foo AND AND tag:bar",
        ] {
            assert_eq!(parse(query, &keys), Err(InvalidQuery), "query: {:?}", query);
        }
    }

    #[test]
    fn test_filter_parser_uses_its_keys() {
        let parser = FilterParser::new(KeySet::from_keys(["system"]).unwrap());
        assert_eq!(parser.parse("SYSTEM:billing"), Ok(lit("system", "billing")));
        assert_eq!(parser.parse("name:foo"), Err(InvalidQuery));
        assert!(parser.keys().contains("system"));
    }

    fn nested(depth: usize, inner: &str) -> String {
        format!("{}{}{}", "(".repeat(depth), inner, ")".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_limit() {
        let keys = keys();
        assert_eq!(parse(&nested(MAX_NESTING, "name:a"), &keys), Ok(lit("name", "a")));
        assert_eq!(
            parse(&nested(MAX_NESTING, "NOT (tag:b)"), &keys),
            Err(InvalidQuery)
        );
        assert_eq!(
            parse(&nested(MAX_NESTING - 1, "NOT (tag:b)"), &keys),
            Ok(FilterNode::not(lit("tag", "b")))
        );
    }

    #[test]
    fn test_nesting_past_limit_rejected() {
        let keys = keys();
        assert_eq!(parse(&nested(MAX_NESTING + 1, "name:a"), &keys), Err(InvalidQuery));
        assert_eq!(parse(&nested(10_000, "name:a"), &keys), Err(InvalidQuery));
        assert_eq!(parse(&"(".repeat(10_000), &keys), Err(InvalidQuery));
    }

    #[test]
    fn test_sibling_groups_do_not_add_depth() {
        let query = vec![nested(MAX_NESTING, "name:a"); 3].join(" OR ");
        let expected = FilterNode::or(
            FilterNode::or(lit("name", "a"), lit("name", "a")),
            lit("name", "a"),
        );
        assert_eq!(parse(&query, &keys()), Ok(expected));
    }

    #[test]
    fn test_default_parser_uses_default_keys() {
        let parser = FilterParser::default();
        assert_eq!(parser.parse("tag:api"), Ok(lit("tag", "api")));
    }
}
