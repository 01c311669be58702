//! Parser for bucket `filterQuery` fragments using nom combinators.
//!
//! The search service hands back one filter fragment per bucket:
//! - Terms: `modifier:"admin"`, `cm:addressees:"{en}first"`, `creator:admin`
//! - Ranges: `content.size:[0 TO 102400]`, `created:{2020-01-01 TO NOW]`
//!
//! Field names may carry a namespace prefix (`cm:`), so the field/value split
//! happens at the first colon whose left side is a field name and whose
//! remainder parses as a complete value. Bare values may contain colons
//! followed by a digit (`modified:2020-01-01T00:00:00`).

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, multispace0, multispace1, satisfy},
    combinator::{map, peek, recognize},
    multi::many0_count,
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterQuery {
    Term {
        field: String,
        value: String,
        quoted: bool,
    },
    Range {
        field: String,
        lower: String,
        upper: String,
        include_lower: bool,
        include_upper: bool,
    },
}

impl FilterQuery {
    pub fn field(&self) -> &str {
        match self {
            FilterQuery::Term { field, .. } | FilterQuery::Range { field, .. } => field,
        }
    }

    /// True when this fragment filters on `field`, ignoring single quotes
    /// around either name (`'content.size'` and `content.size` match).
    pub fn targets_field(&self, field: &str) -> bool {
        self.field().trim_matches('\'') == field.trim_matches('\'')
    }
}

impl fmt::Display for FilterQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterQuery::Term {
                field,
                value,
                quoted: true,
            } => write!(f, "{}:\"{}\"", field, value),
            FilterQuery::Term {
                field,
                value,
                quoted: false,
            } => write!(f, "{}:{}", field, value),
            FilterQuery::Range {
                field,
                lower,
                upper,
                include_lower,
                include_upper,
            } => write!(
                f,
                "{}:{}{} TO {}{}",
                field,
                if *include_lower { '[' } else { '{' },
                lower,
                upper,
                if *include_upper { ']' } else { '}' }
            ),
        }
    }
}

enum ParsedValue<'a> {
    Term(&'a str, bool),
    Range(bool, &'a str, &'a str, bool),
}

/// Parse a bucket filter fragment.
///
/// # Errors
/// Returns an error string when no colon splits the input into a valid
/// field name and a complete value.
pub fn parse_filter_query(input: &str) -> Result<FilterQuery, String> {
    let input = input.trim();
    for (idx, _) in input.match_indices(':') {
        let (field, rest) = (&input[..idx], &input[idx + 1..]);
        if !is_field_name(field) {
            continue;
        }
        if let Ok(("", parsed)) = value(rest) {
            let field = field.to_string();
            return Ok(match parsed {
                ParsedValue::Term(v, quoted) => FilterQuery::Term {
                    field,
                    value: v.to_string(),
                    quoted,
                },
                ParsedValue::Range(include_lower, lower, upper, include_upper) => {
                    FilterQuery::Range {
                        field,
                        lower: lower.to_string(),
                        upper: upper.to_string(),
                        include_lower,
                        include_upper,
                    }
                }
            });
        }
    }
    Err(format!("Not a field filter: '{}'", input))
}

fn is_field_name(field: &str) -> bool {
    !field.is_empty()
        && field
            .split(':')
            .all(|segment| !segment.is_empty() && segment.chars().all(is_field_char))
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@' | '\'')
}

fn value(input: &str) -> IResult<&str, ParsedValue<'_>> {
    alt((
        map(range_value, |(lo_incl, lo, hi, hi_incl)| {
            ParsedValue::Range(lo_incl, lo, hi, hi_incl)
        }),
        map(quoted_value, |v| ParsedValue::Term(v, true)),
        map(bare_value, |v| ParsedValue::Term(v, false)),
    ))(input)
}

fn range_value(input: &str) -> IResult<&str, (bool, &str, &str, bool)> {
    let (input, (open, _, lower, _, _, _, upper, _, close)) = tuple((
        alt((char('['), char('{'))),
        multispace0,
        bound,
        multispace1,
        tag_no_case("TO"),
        multispace1,
        bound,
        multispace0,
        alt((char(']'), char('}'))),
    ))(input)?;
    Ok((input, (open == '[', lower, upper, close == ']')))
}

fn bound(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ']' && c != '}')(input)
}

fn quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && c != ':' && c != '"'
}

fn bare_value(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_bare_char),
        many0_count(alt((
            satisfy(is_bare_char),
            terminated(char(':'), peek(satisfy(|c: char| c.is_ascii_digit()))),
        ))),
    ))(input)
}
