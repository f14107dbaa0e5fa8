//! Newline-delimited batch input
//!
//! Lines are trimmed and blank lines skipped. A line that fails to parse is
//! kept verbatim in `invalid` and the rest of the batch carries on; any other
//! error aborts the batch.

use serde::Serialize;

use crate::error::SandboxError;
use crate::facade::InputStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchParse<T> {
    pub valid: Vec<T>,
    pub invalid: Vec<String>,
    pub status: InputStatus,
}

impl<T> BatchParse<T> {
    pub fn is_valid(&self) -> bool {
        self.status == InputStatus::Valid
    }
}

/// Non-blank trimmed lines of `text`
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub fn parse_lines<T, F>(text: &str, mut parse: F) -> Result<BatchParse<T>, SandboxError>
where
    F: FnMut(&str) -> Result<T, SandboxError>,
{
    parse_all(lines(text), &mut parse)
}

/// Same as [`parse_lines`] for input that is already split
pub fn parse_all<'a, T, F>(
    items: impl IntoIterator<Item = &'a str>,
    mut parse: F,
) -> Result<BatchParse<T>, SandboxError>
where
    F: FnMut(&str) -> Result<T, SandboxError>,
{
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut seen = false;

    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        seen = true;
        match parse(item) {
            Ok(value) => valid.push(value),
            Err(SandboxError::Parse(_)) => invalid.push(item.to_string()),
            Err(e) => return Err(e),
        }
    }

    let status = if !seen {
        InputStatus::Missing
    } else if valid.is_empty() {
        InputStatus::Invalid
    } else {
        InputStatus::Valid
    };

    Ok(BatchParse {
        valid,
        invalid,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EntityKind, ParseError};
    use crate::release::ReleaseId;
    use rstest::rstest;

    fn number(line: &str) -> Result<u32, SandboxError> {
        line.parse()
            .map_err(|_| ParseError::new(EntityKind::Version, line, "not a number").into())
    }

    #[rstest]
    #[case("1\n  two \n\n3\n", vec![1, 3], vec!["two"], InputStatus::Valid)]
    #[case("one\ntwo", vec![], vec!["one", "two"], InputStatus::Invalid)]
    #[case(" \n\n", vec![], vec![], InputStatus::Missing)]
    #[case("", vec![], vec![], InputStatus::Missing)]
    fn collects_invalid_lines(
        #[case] text: &str,
        #[case] valid: Vec<u32>,
        #[case] invalid: Vec<&str>,
        #[case] status: InputStatus,
    ) {
        let batch = parse_lines(text, number).unwrap();

        assert_eq!(batch.valid, valid);
        assert_eq!(batch.invalid, invalid);
        assert_eq!(batch.status, status);
    }

    #[test]
    fn other_errors_abort_the_batch() {
        let release = ReleaseId::parse("4.3.0").unwrap();

        let result = parse_lines("1\n2", |_| -> Result<u32, SandboxError> {
            Err(SandboxError::Unsupported {
                release: release.clone(),
                capability: "Parse",
            })
        });

        assert!(matches!(result, Err(SandboxError::Unsupported { .. })));
    }

    #[test]
    fn split_input_is_trimmed() {
        let batch = parse_all(["1", " 2 ", ""], number).unwrap();

        assert_eq!(batch.valid, vec![1, 2]);
        assert!(batch.is_valid());
    }
}
