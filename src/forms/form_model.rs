use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Control values and form inputs
// ============================================================================

/// A value to apply to one live control.
///
/// For text, textarea and select controls `selected` is always true and means
/// "apply this literal value". For checkbox and radio controls `selected` is
/// the check state to apply, independent of `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlValue {
    pub value: String,
    pub selected: bool,
}

impl ControlValue {
    pub fn new(value: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            selected,
        }
    }

    /// Build a value with the selection semantics of `input_type`.
    pub fn for_type(value: impl Into<String>, input_type: &InputType) -> Self {
        let value = value.into();
        let selected = if input_type.is_toggle() {
            value == "1"
        } else {
            true
        };
        Self { value, selected }
    }
}

/// Resolved type of a form control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InputType {
    Text,
    Textarea,
    Select,
    Checkbox,
    Radio,
    /// Any other `type` attribute value, or the lower-cased tag name.
    Other(String),
}

impl InputType {
    /// Resolve a control's type from its tag and optional `type` attribute.
    ///
    /// The `type` attribute wins when present. An `input` without one is a
    /// text field. Anything else falls back to its tag name.
    pub fn from_control(tag: &str, type_attr: Option<&str>) -> Self {
        match type_attr {
            Some(t) => Self::from_name(&t.to_lowercase()),
            None if tag.eq_ignore_ascii_case("input") => InputType::Text,
            None => Self::from_name(&tag.to_lowercase()),
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "text" => InputType::Text,
            "textarea" => InputType::Textarea,
            "select" => InputType::Select,
            "checkbox" => InputType::Checkbox,
            "radio" => InputType::Radio,
            other => InputType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputType::Text => "text",
            InputType::Textarea => "textarea",
            InputType::Select => "select",
            InputType::Checkbox => "checkbox",
            InputType::Radio => "radio",
            InputType::Other(name) => name,
        }
    }

    /// Checkbox and radio controls are toggled rather than typed into.
    pub fn is_toggle(&self) -> bool {
        matches!(self, InputType::Checkbox | InputType::Radio)
    }

    pub fn is_text_like(&self) -> bool {
        self.as_str().starts_with("text")
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for InputType {
    fn from(name: String) -> Self {
        Self::from_name(&name.to_lowercase())
    }
}

impl From<InputType> for String {
    fn from(t: InputType) -> Self {
        t.as_str().to_string()
    }
}

/// Values resolved for one named control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,
    pub input_type: InputType,
    pub values: Vec<ControlValue>,
}

impl FormInput {
    pub fn new(name: impl Into<String>, input_type: InputType, values: Vec<ControlValue>) -> Self {
        Self {
            name: name.into(),
            input_type,
            values,
        }
    }

    /// The first value, which is the one applied in practice.
    pub fn first_value(&self) -> Option<&ControlValue> {
        self.values.first()
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// Field names that must be filled together before activating one anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedFieldGroup {
    /// Group identity, used as the prefix of candidate markers
    pub id: String,
    /// Logical field names (field ids or names matching an alias pattern)
    pub fields: Vec<String>,
}

impl LinkedFieldGroup {
    pub fn new(id: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn marker(&self, index: usize) -> String {
        format!("{}_{}", self.id, index)
    }
}

/// Shallow copy of the anchor element: tag, attributes and text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementClone {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
}

impl ElementClone {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One concrete fill combination for an anchor control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateElement {
    /// `<group id>_<index>`, distinct per candidate of one generation
    pub marker: String,
    /// Clone of the anchor, carrying the marker as an attribute
    pub element: ElementClone,
    /// Absolute XPath of the original anchor
    pub locator: String,
    pub form_inputs: Vec<FormInput>,
}

impl CandidateElement {
    pub fn input(&self, name: &str) -> Option<&FormInput> {
        self.form_inputs.iter().find(|i| i.name == name)
    }

    /// First value for the named control, if it was filled.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.input(name)
            .and_then(FormInput::first_value)
            .map(|v| v.value.as_str())
    }
}
