use lazy_static::lazy_static;
use regex::Regex;

/// How a statement is run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatementKind {
    /// Produces a result set, which is rendered.
    Query,
    /// Run for its side effects only.
    Execute,
}

impl StatementKind {
    /// Classifies a statement by its leading keyword.
    pub fn classify(statement: &str) -> Self {
        lazy_static! {
            static ref RE_QUERY: Regex = Regex::new(r"^(?i)\s*select\b").unwrap();
        }

        match RE_QUERY.is_match(statement) {
            true => StatementKind::Query,
            false => StatementKind::Execute,
        }
    }
}
