//! Validation rules and render-hint annotations declared per field.

use serde::Serialize;
use serde_json::Value;

/// Suffix dropped from declared rule and annotation names ("RequiredAttribute" -> "Required").
const NAME_SUFFIX: &str = "Attribute";

pub fn normalize_name(name: &str) -> String {
    match name.strip_suffix(NAME_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => name.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RuleKind {
    Required,
    RegularExpression(String),
    MinLength(usize),
    MaxLength(usize),
    Range { min: f64, max: f64 },
    StringLength { min: usize, max: usize },
    EmailAddress,
    Phone,
    Url,
    CreditCard,
    /// Value must equal the named sibling field.
    Compare(String),
    Custom { name: String, payload: Option<Value> },
}

/// A constraint on a field's value. `{0}` in the message stands for the field name.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub error_message: Option<String>,
}

impl Rule {
    fn of(kind: RuleKind) -> Self {
        Rule { kind, error_message: None }
    }

    pub fn required() -> Self {
        Self::of(RuleKind::Required)
    }

    pub fn regular_expression(pattern: impl Into<String>) -> Self {
        Self::of(RuleKind::RegularExpression(pattern.into()))
    }

    pub fn min_length(len: usize) -> Self {
        Self::of(RuleKind::MinLength(len))
    }

    pub fn max_length(len: usize) -> Self {
        Self::of(RuleKind::MaxLength(len))
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::of(RuleKind::Range { min, max })
    }

    pub fn string_length(min: usize, max: usize) -> Self {
        Self::of(RuleKind::StringLength { min, max })
    }

    pub fn email_address() -> Self {
        Self::of(RuleKind::EmailAddress)
    }

    pub fn phone() -> Self {
        Self::of(RuleKind::Phone)
    }

    pub fn url() -> Self {
        Self::of(RuleKind::Url)
    }

    pub fn credit_card() -> Self {
        Self::of(RuleKind::CreditCard)
    }

    pub fn compare(other_field: impl Into<String>) -> Self {
        Self::of(RuleKind::Compare(other_field.into()))
    }

    pub fn custom(name: &str, payload: Option<Value>) -> Self {
        Self::of(RuleKind::Custom {
            name: normalize_name(name),
            payload,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn name(&self) -> String {
        match &self.kind {
            RuleKind::Required => "Required".into(),
            RuleKind::RegularExpression(_) => "RegularExpression".into(),
            RuleKind::MinLength(_) => "MinLength".into(),
            RuleKind::MaxLength(_) => "MaxLength".into(),
            RuleKind::Range { .. } => "Range".into(),
            RuleKind::StringLength { .. } => "StringLength".into(),
            RuleKind::EmailAddress => "EmailAddress".into(),
            RuleKind::Phone => "Phone".into(),
            RuleKind::Url => "Url".into(),
            RuleKind::CreditCard => "CreditCard".into(),
            RuleKind::Compare(_) => "Compare".into(),
            RuleKind::Custom { name, .. } => name.clone(),
        }
    }

    /// Error message with `{0}` left in place for the consumer to substitute.
    pub fn message_template(&self) -> String {
        if let Some(msg) = &self.error_message {
            return msg.clone();
        }
        match &self.kind {
            RuleKind::Required => "The {0} field is required.".into(),
            RuleKind::RegularExpression(p) => {
                format!("The field {{0}} must match the regular expression '{}'.", p)
            }
            RuleKind::MinLength(n) => format!(
                "The field {{0}} must be a string or array type with a minimum length of '{}'.",
                n
            ),
            RuleKind::MaxLength(n) => format!(
                "The field {{0}} must be a string or array type with a maximum length of '{}'.",
                n
            ),
            RuleKind::Range { min, max } => {
                format!("The field {{0}} must be between {} and {}.", min, max)
            }
            RuleKind::StringLength { min: 0, max } => {
                format!("The field {{0}} must be a string with a maximum length of {}.", max)
            }
            RuleKind::StringLength { min, max } => format!(
                "The field {{0}} must be a string with a minimum length of {} and a maximum length of {}.",
                min, max
            ),
            RuleKind::EmailAddress => "The {0} field is not a valid e-mail address.".into(),
            RuleKind::Phone => "The {0} field is not a valid phone number.".into(),
            RuleKind::Url => {
                "The {0} field is not a valid fully-qualified http, https, or ftp URL.".into()
            }
            RuleKind::CreditCard => "The {0} field is not a valid credit card number.".into(),
            RuleKind::Compare(other) => format!("'{{0}}' and '{}' do not match.", other),
            RuleKind::Custom { .. } => "The field {0} is invalid.".into(),
        }
    }

    /// Message with the field name substituted.
    pub fn message_for(&self, field: &str) -> String {
        self.message_template().replace("{0}", field)
    }

    pub fn payload(&self) -> Option<Value> {
        match &self.kind {
            RuleKind::RegularExpression(p) => Some(Value::String(p.clone())),
            RuleKind::MinLength(n) | RuleKind::MaxLength(n) => Some(Value::from(*n)),
            RuleKind::Range { min, max } => Some(Value::String(format!("{} ~ {}", min, max))),
            RuleKind::StringLength { min, max } => {
                Some(Value::String(format!("{} ~ {}", min, max)))
            }
            RuleKind::Compare(other) => Some(Value::String(other.clone())),
            RuleKind::Custom { payload, .. } => payload.clone(),
            RuleKind::Required
            | RuleKind::EmailAddress
            | RuleKind::Phone
            | RuleKind::Url
            | RuleKind::CreditCard => None,
        }
    }
}

/// Input widget a front end should prefer when rendering a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    Hidden,
    Custom,
    Text,
    TextArea,
    Number,
    Password,
    Radio,
    Dropdown,
    Checkbox,
    DatePicker,
    ColorPicker,
    ImagePicker,
    FilePicker,
    UrlPicker,
    Email,
    LinkPicker,
    Richtext,
    TagPicker,
}

/// Any non-validation annotation (render hints and the like), passed through as-is.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub payload: Value,
}

impl Annotation {
    pub fn new(name: &str, payload: Value) -> Self {
        Annotation {
            name: normalize_name(name),
            payload,
        }
    }

    pub fn preferred_input(input: InputType) -> Self {
        let value = serde_json::to_value(input).unwrap_or(Value::Null);
        Self::new("PreferredInput", serde_json::json!({ "value": value }))
    }

    /// Custom widget name understood by the front end.
    pub fn preferred_input_named(widget: &str) -> Self {
        Self::new("PreferredInput", serde_json::json!({ "value": widget }))
    }
}
