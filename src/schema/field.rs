//! Declared fields: name, type, rules and annotations, in declaration order.

use super::rule::{Annotation, Rule};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Type-level facts the schema exporter needs about a field's type.
///
/// Enumerations override `enum_variants` so front ends can render their options.
/// Containers delegate to their element type.
pub trait FieldType {
    fn enum_variants() -> Option<&'static [&'static str]> {
        None
    }
}

macro_rules! plain_field_types {
    ($($t:ty),* $(,)?) => {
        $(impl FieldType for $t {})*
    };
}

plain_field_types!(
    bool, char, String, str, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    Uuid, DateTime<Utc>, NaiveDate, NaiveDateTime, serde_json::Value,
);

impl<T: FieldType> FieldType for Vec<T> {
    fn enum_variants() -> Option<&'static [&'static str]> {
        T::enum_variants()
    }
}

impl<T: FieldType> FieldType for [T] {
    fn enum_variants() -> Option<&'static [&'static str]> {
        T::enum_variants()
    }
}

impl<T: FieldType, const N: usize> FieldType for [T; N] {
    fn enum_variants() -> Option<&'static [&'static str]> {
        T::enum_variants()
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn enum_variants() -> Option<&'static [&'static str]> {
        T::enum_variants()
    }
}

/// Strip module paths from every segment of a `std::any::type_name` string.
/// `alloc::vec::Vec<app::Color>` becomes `Vec<Color>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    name: String,
    type_name: String,
    enum_variants: Option<&'static [&'static str]>,
    rules: Vec<Rule>,
    annotations: Vec<Annotation>,
}

impl FieldSpec {
    /// Declare a field of type `F`. `name` is the serialized (snake_case) field name.
    pub fn of<F: FieldType + ?Sized>(name: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            type_name: short_type_name(std::any::type_name::<F>()),
            enum_variants: F::enum_variants(),
            rules: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Override the exported type name.
    pub fn type_name(mut self, name: &str) -> Self {
        self.type_name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.type_name
    }

    pub fn enum_variants(&self) -> Option<&'static [&'static str]> {
        self.enum_variants
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Color {}

    impl FieldType for Color {
        fn enum_variants() -> Option<&'static [&'static str]> {
            Some(&["Red", "Green", "Blue"])
        }
    }

    #[test]
    fn short_names_drop_module_paths() {
        assert_eq!(short_type_name("alloc::vec::Vec<app::model::Color>"), "Vec<Color>");
        assert_eq!(
            short_type_name("core::option::Option<chrono::datetime::DateTime<chrono::offset::utc::Utc>>"),
            "Option<DateTime<Utc>>"
        );
        assert_eq!(short_type_name("[u8; 4]"), "[u8; 4]");
        assert_eq!(short_type_name("i32"), "i32");
    }

    #[test]
    fn enum_payload_follows_element_type() {
        assert_eq!(FieldSpec::of::<Color>("c").enum_variants(), Some(&["Red", "Green", "Blue"][..]));
        assert!(FieldSpec::of::<Vec<Color>>("c").enum_variants().is_some());
        assert!(FieldSpec::of::<[Color; 2]>("c").enum_variants().is_some());
        assert!(FieldSpec::of::<String>("s").enum_variants().is_none());
    }

    #[test]
    fn declared_type_uses_short_name() {
        assert_eq!(FieldSpec::of::<String>("s").declared_type(), "String");
        assert_eq!(FieldSpec::of::<Vec<Color>>("c").declared_type(), "Vec<Color>");
        assert_eq!(FieldSpec::of::<String>("s").type_name("Text").declared_type(), "Text");
    }
}
