use std::sync::OnceLock;

use regex::Regex;

/// A human issue identifier such as `ENG-123`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueKey {
    pub team_key: String,
    pub issue_number: u64,
}

fn identifier_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([A-Z]+)-(\d+)$").ok())
        .as_ref()
}

/// Split `ENG-123` into team key and number. UUIDs and lowercase keys give `None`.
pub fn parse_identifier(identifier: &str) -> Option<IssueKey> {
    let captures = identifier_pattern()?.captures(identifier)?;
    let issue_number = captures[2].parse().ok()?;
    Some(IssueKey {
        team_key: captures[1].to_string(),
        issue_number,
    })
}
