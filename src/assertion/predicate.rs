use serde_json::Value;
use std::fmt;

/// The outcome of one check: pass/fail plus a sentence a human can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub description: String,
}

impl Verdict {
    pub fn pass(description: impl Into<String>) -> Self {
        Verdict {
            passed: true,
            description: description.into(),
        }
    }

    pub fn fail(description: impl Into<String>) -> Self {
        Verdict {
            passed: false,
            description: description.into(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            if self.passed { "PASS" } else { "FAIL" },
            self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Is(Value),
    Contains(String),
    GreaterThan(f64),
    NotEmpty,
    Empty,
}

impl Predicate {
    /// Expected-value phrase, e.g. `is "small"` or `is greater than 0`.
    pub fn expected(&self, negated: bool) -> String {
        let not = if negated { "not " } else { "" };
        match self {
            Predicate::Is(v) => format!("{}{}", if negated { "is not " } else { "is " }, v),
            Predicate::Contains(s) => format!("does {}contain {:?}", not, s),
            Predicate::GreaterThan(n) => format!("is {}greater than {}", not, n),
            Predicate::NotEmpty => format!("is {}non-empty", not),
            Predicate::Empty => format!("is {}empty", not),
        }
    }

    fn holds(&self, actual: &Value) -> bool {
        match self {
            Predicate::Is(expected) => values_equal(actual, expected),
            Predicate::Contains(needle) => contains(actual, needle),
            Predicate::GreaterThan(n) => as_number(actual).is_some_and(|a| a > *n),
            Predicate::NotEmpty => !is_empty(actual),
            Predicate::Empty => is_empty(actual),
        }
    }

    pub fn evaluate(&self, field: &str, actual: &Value, negated: bool) -> Verdict {
        let holds = self.holds(actual) != negated;
        let expected = self.expected(negated);
        if holds {
            Verdict::pass(format!("field '{}' {} (was {})", field, expected, actual))
        } else {
            Verdict::fail(format!(
                "field '{}' expected to satisfy `{}` but was {}",
                field, expected, actual
            ))
        }
    }
}

/// Scalar rendering used for cross-type comparisons: strings without quotes.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numbers compare numerically (`1 == 1.0`); a string and a number or bool
/// compare by rendering (`"1" == 1`); everything else structurally.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::String(_), Value::Number(_) | Value::Bool(_))
        | (Value::Number(_) | Value::Bool(_), Value::String(_)) => {
            render(actual) == render(expected)
        }
        _ => actual == expected,
    }
}

fn contains(actual: &Value, needle: &str) -> bool {
    match actual {
        Value::String(s) => s.contains(needle),
        Value::Number(_) | Value::Bool(_) => actual.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|item| render(item) == needle),
        Value::Object(map) => map.contains_key(needle),
        Value::Null => false,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) | Value::Bool(_) => false,
    }
}
