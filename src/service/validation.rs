//! Request validation from the rules declared on an entity's fields.

use crate::case::to_camel_case;
use crate::error::{AppError, ConfigError};
use crate::schema::{FieldSpec, Rule, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a (snake_case keyed) body against every declared rule. The first failing
    /// rule is reported with its message, `{0}` replaced by the API field name.
    pub fn validate(body: &Map<String, Value>, fields: &[FieldSpec]) -> Result<(), AppError> {
        for field in fields {
            let val = body.get(field.name());
            for rule in field.rules() {
                if !check(rule, val, body)? {
                    return Err(AppError::Validation(rule.message_for(&to_camel_case(field.name()))));
                }
            }
        }
        Ok(())
    }
}

/// Absent and null values only fail `Required`; every other rule skips them.
fn check(rule: &Rule, val: Option<&Value>, body: &Map<String, Value>) -> Result<bool, AppError> {
    let v = match val {
        None | Some(Value::Null) => return Ok(!matches!(rule.kind, RuleKind::Required)),
        Some(v) => v,
    };
    Ok(match &rule.kind {
        RuleKind::Required => !matches!(v, Value::String(s) if s.trim().is_empty()),
        RuleKind::RegularExpression(pattern) => {
            let re = anchored(pattern)?;
            v.as_str().map(|s| re.is_match(s)).unwrap_or(true)
        }
        RuleKind::MinLength(min) => length_of(v).map(|n| n >= *min).unwrap_or(true),
        RuleKind::MaxLength(max) => length_of(v).map(|n| n <= *max).unwrap_or(true),
        RuleKind::Range { min, max } => v.as_f64().map(|n| n >= *min && n <= *max).unwrap_or(false),
        RuleKind::StringLength { min, max } => v
            .as_str()
            .map(|s| {
                let n = s.chars().count();
                n >= *min && n <= *max
            })
            .unwrap_or(true),
        RuleKind::EmailAddress => v.as_str().map(is_email).unwrap_or(false),
        RuleKind::Phone => v.as_str().map(is_phone).unwrap_or(false),
        RuleKind::Url => v.as_str().map(is_url).unwrap_or(false),
        RuleKind::CreditCard => v.as_str().map(luhn_valid).unwrap_or(false),
        RuleKind::Compare(other) => body.get(other.as_str()) == Some(v),
        RuleKind::Custom { .. } => true,
    })
}

static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Whole-value match for a declared pattern, compiled once per pattern. A pattern that does
/// not compile is a fault in the entity declaration, reported as a server-side error.
fn anchored(pattern: &str) -> Result<Regex, AppError> {
    if let Ok(cache) = PATTERNS.read() {
        if let Some(re) = cache.get(pattern) {
            return Ok(re.clone());
        }
    }
    let re = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| ConfigError::Validation(format!("invalid declared pattern '{}': {}", pattern, e)))?;
    if let Ok(mut cache) = PATTERNS.write() {
        cache.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

fn length_of(v: &Value) -> Option<usize> {
    match v {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

/// Exactly one '@', not at either end.
fn is_email(s: &str) -> bool {
    let mut parts = s.split('@');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    )
}

fn is_phone(s: &str) -> bool {
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    digits > 0
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
}

fn is_url(s: &str) -> bool {
    let lower = s.to_lowercase();
    ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

fn luhn_valid(s: &str) -> bool {
    let cleaned: Vec<char> = s.chars().filter(|c| *c != '-' && *c != ' ').collect();
    if cleaned.is_empty() || !cleaned.iter().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = cleaned
        .iter()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<String>("display_name")
                .rule(Rule::required())
                .rule(Rule::string_length(2, 10)),
            FieldSpec::of::<String>("email").rule(Rule::email_address()),
            FieldSpec::of::<i32>("age").rule(Rule::range(0.0, 130.0)),
            FieldSpec::of::<String>("code").rule(Rule::regular_expression("[A-Z]{3}")),
            FieldSpec::of::<Vec<String>>("tags").rule(Rule::max_length(2)),
        ]
    }

    #[test]
    fn valid_body_passes() {
        let b = body(json!({ "display_name": "Ada", "email": "ada@example.com", "age": 36, "code": "ABC", "tags": ["x"] }));
        assert!(RequestValidator::validate(&b, &fields()).is_ok());
    }

    #[test]
    fn missing_required_reports_api_name() {
        let err = RequestValidator::validate(&body(json!({})), &fields()).unwrap_err();
        assert_eq!(err.to_string(), "validation: The displayName field is required.");
    }

    #[test]
    fn optional_rules_skip_absent_values() {
        assert!(RequestValidator::validate(&body(json!({ "display_name": "Ada" })), &fields()).is_ok());
    }

    #[test]
    fn each_rule_kind_rejects() {
        let cases = [
            json!({ "display_name": "A" }),
            json!({ "display_name": "Ada", "email": "ada" }),
            json!({ "display_name": "Ada", "age": 200 }),
            json!({ "display_name": "Ada", "code": "ABCD" }),
            json!({ "display_name": "Ada", "tags": ["a", "b", "c"] }),
            json!({ "display_name": "   " }),
        ];
        for case in cases {
            assert!(RequestValidator::validate(&body(case.clone()), &fields()).is_err(), "{case}");
        }
    }

    #[test]
    fn compare_and_card_checks() {
        let f = vec![
            FieldSpec::of::<String>("password"),
            FieldSpec::of::<String>("confirm").rule(Rule::compare("password")),
            FieldSpec::of::<String>("card").rule(Rule::credit_card()),
        ];
        assert!(RequestValidator::validate(&body(json!({ "password": "a", "confirm": "a", "card": "4111 1111 1111 1111" })), &f).is_ok());
        assert!(RequestValidator::validate(&body(json!({ "password": "a", "confirm": "b" })), &f).is_err());
        assert!(RequestValidator::validate(&body(json!({ "card": "4111 1111 1111 1112" })), &f).is_err());
    }

    #[test]
    fn broken_declared_pattern_is_a_server_fault() {
        let f = vec![FieldSpec::of::<String>("code").rule(Rule::regular_expression("[A-Z"))];
        let err = RequestValidator::validate(&body(json!({ "code": "ABC" })), &f).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Validation(_))));
        assert!(err.into_response().status().is_server_error());
    }

    #[test]
    fn patterns_are_compiled_once() {
        let first = anchored("[a-z]+[0-9]").unwrap();
        assert!(first.is_match("ab1"));
        assert!(!first.is_match("ab1x"));
        assert!(PATTERNS.read().unwrap().contains_key("[a-z]+[0-9]"));
    }

    #[test]
    fn url_and_phone_formats() {
        assert!(is_url("https://example.com"));
        assert!(!is_url("example.com"));
        assert!(is_phone("+1 (555) 010-2000"));
        assert!(!is_phone("call me"));
    }
}
