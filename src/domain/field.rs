//! Field - Editable field configuration, values and type coercion

use crate::constants::{CUSTOM_ATTRIBUTES_KEY, OPTION_LIST_DELIMITER, PERSON_TOKEN_PREFIX};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Kind of editor shown for a field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Boolean toggle
    Checkbox,
    /// Reference to a person record
    Person,
    /// Choice from a fixed option list
    Dropdown,
    /// Free text (also any unrecognized type)
    #[default]
    #[serde(other)]
    Text,
}

/// Identifier of a custom attribute definition
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomAttributeId(pub u64);

impl std::fmt::Display for CustomAttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a field's value lives on its record
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum FieldBinding {
    /// Dynamic slot under the record's custom attribute namespace
    CustomAttribute(CustomAttributeId),
    /// Built-in property, addressed by a dotted path
    Property(Arc<str>),
}

impl std::fmt::Display for FieldBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomAttribute(id) => write!(f, "{CUSTOM_ATTRIBUTES_KEY}.{id}"),
            Self::Property(path) => write!(f, "{path}"),
        }
    }
}

/// Selectable options, either a list or one delimited string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionList {
    List(Vec<String>),
    Delimited(String),
}

impl OptionList {
    /// Split into discrete options
    pub fn into_options(self) -> Vec<String> {
        match self {
            Self::List(values) => values,
            Self::Delimited(values) => values
                .split(OPTION_LIST_DELIMITER)
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Per-field widget configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Editor type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Custom attribute storage (takes precedence over `property`)
    #[serde(rename = "caId", alias = "ca_id", default)]
    pub ca_id: Option<CustomAttributeId>,
    /// Direct property path
    #[serde(default)]
    pub property: Option<String>,
    /// Selectable options
    #[serde(default)]
    pub values: Option<OptionList>,
}

impl FieldConfig {
    /// Options offered by the editor
    pub fn options(&self) -> Vec<String> {
        self.values
            .clone()
            .map(OptionList::into_options)
            .unwrap_or_default()
    }
}

/// Reference to a person, compared by id
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PersonRef {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            email: None,
            name: None,
        }
    }

    /// Token stored in custom attribute slots (`Person:<id>`)
    pub fn token(&self) -> String {
        format!("{PERSON_TOKEN_PREFIX}{}", self.id)
    }

    /// Parse a `Person:<id>` token
    pub fn parse_token(token: &str) -> Option<Self> {
        token
            .strip_prefix(PERSON_TOKEN_PREFIX)
            .and_then(|id| id.trim().parse().ok())
            .map(Self::new)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id));
        if let Some(email) = &self.email {
            map.insert("email".into(), Value::from(email.as_str()));
        }
        if let Some(name) = &self.name {
            map.insert("name".into(), Value::from(name.as_str()));
        }
        Value::Object(map)
    }
}

impl PartialEq for PersonRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Value held by an editable field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Unset,
    Bool(bool),
    Int(i64),
    Text(String),
    Person(PersonRef),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Truthiness as a checkbox sees it
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unset => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Text(value) => !value.is_empty(),
            Self::Person(_) => true,
        }
    }

    /// Read a raw record value without type-specific normalization
    pub fn from_json(raw: Value) -> Self {
        match raw {
            Value::Null => Self::Unset,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => Self::Text(number.to_string()),
            },
            Value::String(value) => Self::Text(value),
            Value::Object(map) => match serde_json::from_value::<PersonRef>(Value::Object(map.clone())) {
                Ok(person) => Self::Person(person),
                Err(_) => Self::Text(Value::Object(map).to_string()),
            },
            Value::Array(values) => Self::Text(Value::Array(values).to_string()),
        }
    }

    /// Raw record value without type-specific coercion
    pub fn to_json(&self) -> Value {
        match self {
            Self::Unset => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Text(value) => Value::String(value.clone()),
            Self::Person(person) => person.to_json(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Person(person) => match (&person.name, &person.email) {
                (Some(name), _) => write!(f, "{name}"),
                (None, Some(email)) => write!(f, "{email}"),
                (None, None) => write!(f, "{}", person.token()),
            },
        }
    }
}

/// Resolved type and storage location of one editable field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub binding: FieldBinding,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType, binding: FieldBinding) -> Self {
        Self {
            field_type,
            binding,
        }
    }

    pub fn is_custom_attribute(&self) -> bool {
        matches!(self.binding, FieldBinding::CustomAttribute(_))
    }

    /// Normalize a stored value into the editor's representation
    ///
    /// Type-specific rules only apply to custom attribute slots; direct
    /// properties are read as they are stored.
    pub fn normalize(&self, raw: Value) -> FieldValue {
        if !self.is_custom_attribute() {
            return FieldValue::from_json(raw);
        }

        match self.field_type {
            FieldType::Checkbox => FieldValue::Bool(match &raw {
                Value::String(value) => value == "1",
                Value::Bool(value) => *value,
                Value::Number(number) => number.as_i64() == Some(1),
                _ => false,
            }),
            FieldType::Person => normalize_person(raw),
            FieldType::Dropdown => match raw {
                Value::Null => FieldValue::Text(String::new()),
                other => FieldValue::from_json(other),
            },
            FieldType::Text => FieldValue::from_json(raw),
        }
    }

    /// Coerce an editor value into what gets written on the record
    pub fn coerce(&self, value: &FieldValue) -> Value {
        if !self.is_custom_attribute() {
            return value.to_json();
        }

        match self.field_type {
            FieldType::Checkbox => Value::from(if value.is_truthy() { 1 } else { 0 }),
            FieldType::Person => match value {
                FieldValue::Person(person) => Value::String(person.token()),
                FieldValue::Unset => Value::Null,
                other => other.to_json(),
            },
            FieldType::Dropdown => match value {
                FieldValue::Text(text) if text.is_empty() => Value::Null,
                other => other.to_json(),
            },
            FieldType::Text => value.to_json(),
        }
    }

    /// Parse user-typed text into a value of this field's type
    pub fn parse_input(&self, input: &str) -> FieldValue {
        let input = input.trim();
        match self.field_type {
            FieldType::Checkbox => FieldValue::Bool(matches!(
                input.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )),
            FieldType::Person if input.is_empty() => FieldValue::Unset,
            FieldType::Person => PersonRef::parse_token(input)
                .or_else(|| input.parse().ok().map(PersonRef::new))
                .map(FieldValue::Person)
                .unwrap_or_else(|| FieldValue::text(input)),
            FieldType::Dropdown | FieldType::Text => FieldValue::text(input),
        }
    }
}

impl TryFrom<&FieldConfig> for FieldDescriptor {
    type Error = Error;

    fn try_from(config: &FieldConfig) -> Result<Self> {
        let binding = match (config.ca_id, config.property.as_deref()) {
            (Some(id), _) => FieldBinding::CustomAttribute(id),
            (None, Some(property)) if !property.is_empty() => {
                FieldBinding::Property(property.into())
            }
            _ => {
                return Err(Error::Invalid {
                    message: "field needs either a custom attribute id or a property".into(),
                });
            }
        };

        Ok(Self::new(config.field_type, binding))
    }
}

fn normalize_person(raw: Value) -> FieldValue {
    match raw {
        Value::Object(map) if map.is_empty() => FieldValue::Unset,
        Value::Object(map) => serde_json::from_value::<PersonRef>(Value::Object(map))
            .map(FieldValue::Person)
            .unwrap_or(FieldValue::Unset),
        Value::String(token) if token.is_empty() => FieldValue::Unset,
        Value::String(token) => match PersonRef::parse_token(&token) {
            Some(person) => FieldValue::Person(person),
            None => FieldValue::Text(token),
        },
        Value::Number(number) => number
            .as_u64()
            .map(|id| FieldValue::Person(PersonRef::new(id)))
            .unwrap_or(FieldValue::Unset),
        Value::Null | Value::Bool(_) | Value::Array(_) => FieldValue::Unset,
    }
}
