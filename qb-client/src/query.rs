//! Parsers for the short-hand syntax accepted on the command line.

use std::sync::LazyLock;

use qbcli_core::FieldId;
use regex::Regex;

use crate::{
    Error, Result,
    resources::records::{GroupBy, SortBy, SortOrder},
};

static SORT_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)(?:\s+(ASC|DESC)?\s*)?$").expect("sort pattern is valid")
});

static GROUP_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)(?:\s+([-A-Za-z0-9_]+)?\s*)?$").expect("group pattern is valid")
});

/// Parse `"6, 7,8"` into field ids. An empty string is an empty list.
pub fn parse_field_list(s: &str) -> Result<Vec<FieldId>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<FieldId>()
                .map_err(|_| Error::invalid_input("expecting fid to be a number"))
        })
        .collect()
}

/// Split `6=foo 7='bar baz' done` into key/value pairs.
///
/// Values may be wrapped in single or double quotes to keep spaces. A token
/// without `=` yields an empty value.
pub fn parse_key_values(s: &str) -> Vec<(String, String)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut started = false;

    for c in s.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                started = true;
            }
            None if c.is_whitespace() => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            None => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .map(|token| match token.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (token, String::new()),
        })
        .collect()
}

/// Expand the simplified `6=foo 7=bar` filter into query language.
///
/// Input already in query language (starting with `{` or `(`) is returned
/// unchanged. A bare token matches the record id.
pub fn parse_query(q: &str) -> String {
    if q.starts_with('{') || q.starts_with('(') {
        return q.to_string();
    }
    parse_key_values(q)
        .into_iter()
        .map(|(k, v)| {
            if v.is_empty() {
                format!("{{3.EX.{k:?}}}")
            } else {
                format!("{{{k:?}.EX.{v:?}}}")
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Parse `"7 DESC,8"` into sort clauses. The order defaults to ascending.
pub fn parse_sort_by(s: &str) -> Result<Vec<SortBy>> {
    s.split(',')
        .map(|clause| {
            let caps = SORT_BY
                .captures(clause)
                .ok_or_else(|| Error::invalid_input(format!("invalid sort clause '{clause}'")))?;
            let order = match caps.get(2).map(|m| m.as_str()) {
                Some("DESC") => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            Ok(SortBy {
                field_id: parse_fid(&caps[1])?,
                order,
            })
        })
        .collect()
}

/// Parse `"6 same-value,7"` into grouping clauses.
pub fn parse_group_by(s: &str) -> Result<Vec<GroupBy>> {
    s.split(',')
        .map(|clause| {
            let caps = GROUP_BY
                .captures(clause)
                .ok_or_else(|| Error::invalid_input(format!("invalid group clause '{clause}'")))?;
            Ok(GroupBy {
                field_id: parse_fid(&caps[1])?,
                grouping: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

// The patterns only admit digits, but the number can still overflow.
fn parse_fid(digits: &str) -> Result<FieldId> {
    digits
        .parse()
        .map_err(|_| Error::invalid_input(format!("field id '{digits}' is out of range")))
}
