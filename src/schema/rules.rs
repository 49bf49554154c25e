//! Per-field constraints and their compiled form

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FormError, FormResult};

/// A single constraint on a field value.
///
/// Rules are declared in configuration files with a `rule` tag:
///
/// ```yaml
/// rules:
///   - rule: required
///   - rule: min_length
///     min: 8
///     message: Password is too short
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MinLength {
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Pattern {
        regex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    OneOf {
        values: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl FieldRule {
    pub fn is_required(&self) -> bool {
        matches!(self, FieldRule::Required { .. })
    }

    fn message(&self) -> Option<&String> {
        match self {
            FieldRule::Required { message }
            | FieldRule::MinLength { message, .. }
            | FieldRule::MaxLength { message, .. }
            | FieldRule::Email { message }
            | FieldRule::Pattern { message, .. }
            | FieldRule::OneOf { message, .. }
            | FieldRule::Integer { message, .. } => message.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
enum Check {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Pattern(Regex),
    OneOf(Vec<String>),
    Integer { min: Option<i64>, max: Option<i64> },
}

/// A rule ready to be evaluated (regexes compiled up front)
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    check: Check,
    message: Option<String>,
}

impl CompiledRule {
    pub(crate) fn compile(field: &str, rule: &FieldRule) -> FormResult<Self> {
        let check = match rule {
            FieldRule::Required { .. } => Check::Required,
            FieldRule::MinLength { min, .. } => Check::MinLength(*min),
            FieldRule::MaxLength { max, .. } => Check::MaxLength(*max),
            FieldRule::Email { .. } => Check::Email,
            FieldRule::Pattern { regex, .. } => {
                let compiled = Regex::new(regex).map_err(|e| FormError::InvalidSchema {
                    field: field.to_string(),
                    reason: format!("invalid pattern '{}': {}", regex, e),
                })?;
                Check::Pattern(compiled)
            }
            FieldRule::OneOf { values, .. } => {
                if values.is_empty() {
                    return Err(FormError::InvalidSchema {
                        field: field.to_string(),
                        reason: "one_of requires at least one value".to_string(),
                    });
                }
                Check::OneOf(values.clone())
            }
            FieldRule::Integer { min, max, .. } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(FormError::InvalidSchema {
                            field: field.to_string(),
                            reason: format!("integer minimum {} exceeds maximum {}", lo, hi),
                        });
                    }
                }
                Check::Integer {
                    min: *min,
                    max: *max,
                }
            }
        };

        Ok(Self {
            check,
            message: rule.message().cloned(),
        })
    }

    pub(crate) fn is_required(&self) -> bool {
        matches!(self.check, Check::Required)
    }

    /// Message describing why `value` violates this rule, if it does
    pub(crate) fn violation(&self, value: &str) -> Option<String> {
        let default = match &self.check {
            Check::Required => {
                if !value.trim().is_empty() {
                    return None;
                }
                "Required".to_string()
            }
            Check::MinLength(min) => {
                if value.chars().count() >= *min {
                    return None;
                }
                format!("Must be at least {} characters", min)
            }
            Check::MaxLength(max) => {
                if value.chars().count() <= *max {
                    return None;
                }
                format!("Must be at most {} characters", max)
            }
            Check::Email => {
                if is_email(value) {
                    return None;
                }
                "Invalid email".to_string()
            }
            Check::Pattern(regex) => {
                if regex.is_match(value) {
                    return None;
                }
                "Invalid format".to_string()
            }
            Check::OneOf(values) => {
                if values.iter().any(|v| v == value) {
                    return None;
                }
                format!("Must be one of: {}", values.join(", "))
            }
            Check::Integer { min, max } => match value.trim().parse::<i64>() {
                Err(_) => "Expected an integer".to_string(),
                Ok(n) if min.is_some_and(|lo| n < lo) => {
                    format!("Must be at least {}", min.unwrap_or_default())
                }
                Ok(n) if max.is_some_and(|hi| n > hi) => {
                    format!("Must be at most {}", max.unwrap_or_default())
                }
                Ok(_) => return None,
            },
        };

        Some(self.message.clone().unwrap_or(default))
    }
}

/// `local@domain.tld` with no whitespace and non-empty labels
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rule: FieldRule) -> CompiledRule {
        CompiledRule::compile("field", &rule).unwrap()
    }

    #[test]
    fn test_required() {
        let rule = compile(FieldRule::Required { message: None });
        assert_eq!(rule.violation(""), Some("Required".to_string()));
        assert_eq!(rule.violation("   "), Some("Required".to_string()));
        assert_eq!(rule.violation("x"), None);
    }

    #[test]
    fn test_length_bounds_count_chars() {
        let min = compile(FieldRule::MinLength { min: 3, message: None });
        assert!(min.violation("ab").is_some());
        assert!(min.violation("äöü").is_none());

        let max = compile(FieldRule::MaxLength { max: 2, message: None });
        assert_eq!(
            max.violation("abc"),
            Some("Must be at most 2 characters".to_string())
        );
        assert!(max.violation("ab").is_none());
    }

    #[test]
    fn test_email() {
        let rule = compile(FieldRule::Email { message: None });
        assert!(rule.violation("a@b.com").is_none());
        assert!(rule.violation("first.last@sub.example.org").is_none());
        for bad in ["a@b", "@b.com", "a@@b.com", "a b@c.com", "a@b..com", "plain"] {
            assert_eq!(rule.violation(bad), Some("Invalid email".to_string()), "{}", bad);
        }
    }

    #[test]
    fn test_pattern_and_custom_message() {
        let rule = compile(FieldRule::Pattern {
            regex: "^[a-z]+$".to_string(),
            message: Some("Lowercase letters only".to_string()),
        });
        assert!(rule.violation("abc").is_none());
        assert_eq!(rule.violation("ABC"), Some("Lowercase letters only".to_string()));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = CompiledRule::compile(
            "code",
            &FieldRule::Pattern {
                regex: "([a-z".to_string(),
                message: None,
            },
        );
        assert!(matches!(result, Err(FormError::InvalidSchema { field, .. }) if field == "code"));
    }

    #[test]
    fn test_one_of() {
        let rule = compile(FieldRule::OneOf {
            values: vec!["red".to_string(), "blue".to_string()],
            message: None,
        });
        assert!(rule.violation("red").is_none());
        assert_eq!(rule.violation("green"), Some("Must be one of: red, blue".to_string()));
    }

    #[test]
    fn test_integer_bounds() {
        let rule = compile(FieldRule::Integer {
            min: Some(18),
            max: Some(120),
            message: None,
        });
        assert!(rule.violation("42").is_none());
        assert_eq!(rule.violation("abc"), Some("Expected an integer".to_string()));
        assert_eq!(rule.violation("17"), Some("Must be at least 18".to_string()));
        assert_eq!(rule.violation("121"), Some("Must be at most 120".to_string()));
    }

    #[test]
    fn test_rule_deserialization() {
        let yaml = r#"
- rule: required
- rule: min_length
  min: 8
  message: Too short
- rule: one_of
  values: [a, b]
"#;
        let rules: Vec<FieldRule> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules[0].is_required());
        assert_eq!(
            rules[1],
            FieldRule::MinLength {
                min: 8,
                message: Some("Too short".to_string())
            }
        );
    }
}
