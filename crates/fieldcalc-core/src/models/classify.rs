//! Point-role classification at the import boundary.
//!
//! Imported files carry free-form point names ("SP", "ТП3", "Start point").
//! The core only ever operates on already-classified [`PointRole`]s; the
//! classifier is the single, pluggable place where name matching happens.

use crate::error::{FieldcalcError, Result};
use crate::models::point::PointRole;

/// Maps a raw point name to a role, or `None` when unrecognized.
pub trait RoleClassifier: Send + Sync {
    fn classify(&self, name: &str) -> Option<PointRole>;
}

/// Classify a name, turning "unrecognized" into an error for import paths
/// that cannot skip points.
pub fn classify_required(classifier: &dyn RoleClassifier, name: &str) -> Result<PointRole> {
    classifier.classify(name).ok_or_else(|| FieldcalcError::UnknownRole {
        name: name.to_string(),
    })
}

/// Default name-based classifier.
///
/// Recognizes the Latin and Cyrillic tokens used by field crews: SP/СП,
/// TP{k}/ТП{k}, BM/БМ, LM/ЛМ, plus "start"-keyword names in English and
/// Ukrainian. Matching is case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameClassifier;

const START_KEYWORDS: [&str; 3] = ["START", "ПОЧАТК", "НАЧАЛЬ"];

impl RoleClassifier for NameClassifier {
    fn classify(&self, name: &str) -> Option<PointRole> {
        let token = name.trim().to_uppercase();
        if token.is_empty() {
            return None;
        }

        match token.as_str() {
            "SP" | "СП" => return Some(PointRole::Start),
            "BM" | "БМ" => return Some(PointRole::Benchmark),
            "LM" | "ЛМ" => return Some(PointRole::Landmark),
            _ => {}
        }

        if let Some(index) = parse_turning_index(&token) {
            return Some(PointRole::Turning(index));
        }

        if START_KEYWORDS.iter().any(|kw| token.contains(kw)) {
            return Some(PointRole::Start);
        }

        None
    }
}

fn parse_turning_index(token: &str) -> Option<u32> {
    let digits = token.strip_prefix("TP").or_else(|| token.strip_prefix("ТП"))?;
    let index: u32 = digits.parse().ok()?;
    if index == 0 {
        return None;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_tokens() {
        let c = NameClassifier;
        assert_eq!(c.classify("SP"), Some(PointRole::Start));
        assert_eq!(c.classify("tp3"), Some(PointRole::Turning(3)));
        assert_eq!(c.classify("BM"), Some(PointRole::Benchmark));
        assert_eq!(c.classify("lm"), Some(PointRole::Landmark));
    }

    #[test]
    fn test_cyrillic_tokens() {
        let c = NameClassifier;
        assert_eq!(c.classify("СП"), Some(PointRole::Start));
        assert_eq!(c.classify("тп12"), Some(PointRole::Turning(12)));
        assert_eq!(c.classify("БМ"), Some(PointRole::Benchmark));
        assert_eq!(c.classify("ЛМ"), Some(PointRole::Landmark));
    }

    #[test]
    fn test_start_keywords() {
        let c = NameClassifier;
        assert_eq!(c.classify("Start point"), Some(PointRole::Start));
        assert_eq!(c.classify("Початкова точка"), Some(PointRole::Start));
        assert_eq!(c.classify("начальная"), Some(PointRole::Start));
    }

    #[test]
    fn test_unrecognized_names() {
        let c = NameClassifier;
        assert_eq!(c.classify("corner A"), None);
        assert_eq!(c.classify("TP0"), None);
        assert_eq!(c.classify("TPx"), None);
        assert_eq!(c.classify(""), None);
    }

    #[test]
    fn test_classify_required_errors() {
        let c = NameClassifier;
        assert!(classify_required(&c, "TP4").is_ok());
        let err = classify_required(&c, "mystery").unwrap_err();
        assert!(matches!(err, FieldcalcError::UnknownRole { .. }));
    }
}
