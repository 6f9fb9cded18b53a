// crates/core/src/label.rs

//! Parsing of judge-model replies into an explanation and a label.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LABEL_DELIMITER: &str = "LABEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Valid,
    Invalid,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Valid => "VALID",
            Label::Invalid => "INVALID",
        }
    }

    /// 1 for VALID, 0 for INVALID.
    pub fn score(&self) -> f64 {
        match self {
            Label::Valid => 1.0,
            Label::Invalid => 0.0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeResponse {
    pub explanation: String,
    pub label: Label,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("judge response has no LABEL field")]
    MissingDelimiter,
    #[error("judge response label is neither VALID nor INVALID: {0:?}")]
    UnrecognizedLabel(String),
}

/// Split `raw_text` at the first `LABEL` into explanation and label.
///
/// The label field must name VALID or INVALID; anything else is an error
/// rather than a default.
pub fn extract_label(raw_text: &str) -> Result<JudgeResponse, LabelParseError> {
    let (explanation, field) = raw_text
        .split_once(LABEL_DELIMITER)
        .ok_or(LabelParseError::MissingDelimiter)?;

    // "INVALID" contains "VALID", so it has to be checked first.
    let label = if field.contains("INVALID") {
        Label::Invalid
    } else if field.contains("VALID") {
        Label::Valid
    } else {
        return Err(LabelParseError::UnrecognizedLabel(field.trim().to_string()));
    };

    Ok(JudgeResponse {
        explanation: explanation.trim().to_string(),
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_label() {
        let r = extract_label("EXPLANATION: The tool matched the question.\nLABEL: VALID").unwrap();
        assert_eq!(r.label, Label::Valid);
        assert_eq!(r.explanation, "EXPLANATION: The tool matched the question.");
    }

    #[test]
    fn test_invalid_label() {
        let r = extract_label("Wrong tool for a weather question. LABEL: INVALID").unwrap();
        assert_eq!(r.label, Label::Invalid);
        assert_eq!(r.explanation, "Wrong tool for a weather question.");
    }

    #[test]
    fn test_missing_delimiter_is_an_error() {
        assert_eq!(
            extract_label("Looks VALID to me."),
            Err(LabelParseError::MissingDelimiter)
        );
        assert_eq!(extract_label(""), Err(LabelParseError::MissingDelimiter));
        // Delimiter is case sensitive.
        assert_eq!(
            extract_label("label: VALID"),
            Err(LabelParseError::MissingDelimiter)
        );
    }

    #[test]
    fn test_unrecognized_label_is_an_error() {
        assert_eq!(
            extract_label("Unclear. LABEL: maybe"),
            Err(LabelParseError::UnrecognizedLabel(": maybe".to_string()))
        );
    }

    #[test]
    fn test_splits_on_first_delimiter() {
        let r = extract_label("ok LABEL: INVALID (second LABEL: VALID)").unwrap();
        assert_eq!(r.label, Label::Invalid);
        assert_eq!(r.explanation, "ok");
    }

    #[test]
    fn test_scores() {
        assert_eq!(Label::Valid.score(), 1.0);
        assert_eq!(Label::Invalid.score(), 0.0);
        assert_eq!(Label::Invalid.to_string(), "INVALID");
        assert_eq!(serde_json::to_string(&Label::Valid).unwrap(), "\"VALID\"");
    }
}
