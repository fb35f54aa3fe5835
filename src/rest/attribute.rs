//! Attribute descriptors and typed wire values.
//!
//! An [`AttributeDescriptor`] describes one exposed field: its local and
//! remote names, its [`AttributeType`], and the validation metadata the
//! server schema declares for it. [`WireValue`] is implemented by every Rust
//! type a field may have and converts it to and from its JSON form.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

/// The kind of value an attribute holds on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// A string.
    String,
    /// A signed integer.
    Integer,
    /// A floating point number.
    Float,
    /// A boolean, sent as `0` or `1`.
    Boolean,
    /// A point in time, sent as milliseconds since the Unix epoch.
    Timestamp,
    /// A list of strings.
    List,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// Metadata for one exposed field.
///
/// Descriptors are created once per resource type, when its registry is
/// built, and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AttributeDescriptor {
    /// Name of the field on the Rust side.
    pub local_name: &'static str,
    /// Name of the key on the wire.
    pub remote_name: &'static str,
    /// Kind of value.
    pub value_type: AttributeType,
    /// Name shown to humans; defaults to the local name.
    pub display_name: &'static str,
    /// The server requires a value.
    pub is_required: bool,
    /// The value is computed by the server.
    pub is_readonly: bool,
    /// The value may be changed after creation.
    pub is_editable: bool,
    /// The attribute identifies the resource.
    pub is_identifier: bool,
    /// The value is unique among resources of this type.
    pub is_unique: bool,
    /// The value is an email address.
    pub is_email: bool,
    /// The value is a login name.
    pub is_login: bool,
    /// The value is a secret.
    pub is_password: bool,
    /// Minimum length of a string value.
    pub min_length: Option<usize>,
    /// Maximum length of a string value.
    pub max_length: Option<usize>,
    /// Allowed values, if the attribute is an enumeration.
    pub choices: Option<&'static [&'static str]>,
    /// Collections may be ordered by this attribute.
    pub can_order: bool,
    /// Collections may be searched by this attribute.
    pub can_search: bool,
}

impl AttributeDescriptor {
    /// Creates a descriptor whose remote and display names equal `local_name`.
    #[must_use]
    pub const fn new(local_name: &'static str, value_type: AttributeType) -> Self {
        Self {
            local_name,
            remote_name: local_name,
            value_type,
            display_name: local_name,
            is_required: false,
            is_readonly: false,
            is_editable: true,
            is_identifier: false,
            is_unique: false,
            is_email: false,
            is_login: false,
            is_password: false,
            min_length: None,
            max_length: None,
            choices: None,
            can_order: false,
            can_search: false,
        }
    }
}

/// A wire value did not have the shape an attribute expects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct WireTypeError {
    /// The attribute type that was expected.
    pub expected: AttributeType,
    /// A short description of the value that was received.
    pub found: String,
}

impl WireTypeError {
    fn new(expected: AttributeType, value: &Value) -> Self {
        let found = match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean {b}"),
            Value::Number(n) => format!("number {n}"),
            Value::String(s) => format!("string {s:?}"),
            Value::Array(_) => "array".to_string(),
            Value::Object(_) => "object".to_string(),
        };
        Self { expected, found }
    }
}

/// A Rust type that can back an exposed attribute.
///
/// `None` is sent as `null`, and `null` resets the field to `None`.
pub trait WireValue: Sized + Send + Sync + 'static {
    /// The attribute type values of this Rust type are exchanged as.
    const KIND: AttributeType;

    /// Converts the value to its wire form.
    fn to_wire(&self) -> Value;

    /// Converts a wire value, rejecting values of the wrong shape.
    ///
    /// # Errors
    ///
    /// Returns [`WireTypeError`] if `value` cannot represent this type.
    fn from_wire(value: Value) -> Result<Self, WireTypeError>;
}

impl WireValue for Option<String> {
    const KIND: AttributeType = AttributeType::String;

    fn to_wire(&self) -> Value {
        self.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // Identifiers are sometimes numeric on the wire
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(WireTypeError::new(Self::KIND, &other)),
        }
    }
}

impl WireValue for Option<i64> {
    const KIND: AttributeType = AttributeType::Integer;

    fn to_wire(&self) -> Value {
        self.map_or(Value::Null, Value::from)
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        match &value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| WireTypeError::new(Self::KIND, &value)),
            _ => Err(WireTypeError::new(Self::KIND, &value)),
        }
    }
}

impl WireValue for Option<f64> {
    const KIND: AttributeType = AttributeType::Float;

    fn to_wire(&self) -> Value {
        self.map_or(Value::Null, Value::from)
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        match &value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| WireTypeError::new(Self::KIND, &value)),
            _ => Err(WireTypeError::new(Self::KIND, &value)),
        }
    }
}

impl WireValue for Option<bool> {
    const KIND: AttributeType = AttributeType::Boolean;

    fn to_wire(&self) -> Value {
        self.map_or(Value::Null, |b| Value::from(i64::from(b)))
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        match &value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(WireTypeError::new(Self::KIND, &value)),
            },
            _ => Err(WireTypeError::new(Self::KIND, &value)),
        }
    }
}

impl WireValue for Option<DateTime<Utc>> {
    const KIND: AttributeType = AttributeType::Timestamp;

    fn to_wire(&self) -> Value {
        self.map_or(Value::Null, |t| Value::from(t.timestamp_millis()))
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        let from_millis = |millis: i64| Utc.timestamp_millis_opt(millis).single();

        let parsed = match &value {
            Value::Null => return Ok(None),
            Value::Number(n) => n.as_i64().and_then(from_millis),
            Value::String(s) => s.parse::<i64>().ok().map_or_else(
                || {
                    DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|t| t.with_timezone(&Utc))
                },
                from_millis,
            ),
            _ => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| WireTypeError::new(Self::KIND, &value))
    }
}

impl WireValue for Vec<String> {
    const KIND: AttributeType = AttributeType::List;

    fn to_wire(&self) -> Value {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }

    fn from_wire(value: Value) -> Result<Self, WireTypeError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(WireTypeError::new(Self::KIND, &other)),
                })
                .collect(),
            other => Err(WireTypeError::new(Self::KIND, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_defaults_names_to_local_name() {
        let descriptor = AttributeDescriptor::new("name", AttributeType::String);

        assert_eq!(descriptor.remote_name, "name");
        assert_eq!(descriptor.display_name, "name");
        assert!(descriptor.is_editable);
        assert!(!descriptor.is_readonly);
        assert!(descriptor.choices.is_none());
    }

    #[test]
    fn test_booleans_are_sent_as_integers() {
        assert_eq!(Some(true).to_wire(), json!(1));
        assert_eq!(Some(false).to_wire(), json!(0));
        assert_eq!(None::<bool>.to_wire(), Value::Null);
    }

    #[test]
    fn test_booleans_accept_bool_and_zero_one() {
        assert_eq!(Option::<bool>::from_wire(json!(true)), Ok(Some(true)));
        assert_eq!(Option::<bool>::from_wire(json!(0)), Ok(Some(false)));
        assert_eq!(Option::<bool>::from_wire(Value::Null), Ok(None));
        assert!(Option::<bool>::from_wire(json!(2)).is_err());
        assert!(Option::<bool>::from_wire(json!("yes")).is_err());
    }

    #[test]
    fn test_strings_accept_numbers() {
        assert_eq!(
            Option::<String>::from_wire(json!(42)),
            Ok(Some("42".to_string()))
        );
        let error = Option::<String>::from_wire(json!({"a": 1})).unwrap_err();
        assert_eq!(error.expected, AttributeType::String);
        assert_eq!(error.found, "object");
    }

    #[test]
    fn test_integers_reject_fractions_and_strings() {
        assert_eq!(Option::<i64>::from_wire(json!(7)), Ok(Some(7)));
        assert!(Option::<i64>::from_wire(json!(7.5)).is_err());
        assert!(Option::<i64>::from_wire(json!("7")).is_err());
    }

    #[test]
    fn test_timestamps_use_epoch_milliseconds() {
        let time = Utc.timestamp_millis_opt(1_476_000_000_123).single();
        assert_eq!(time.to_wire(), json!(1_476_000_000_123_i64));

        assert_eq!(
            Option::<DateTime<Utc>>::from_wire(json!(1_476_000_000_123_i64)),
            Ok(time)
        );
        assert_eq!(
            Option::<DateTime<Utc>>::from_wire(json!("1476000000123")),
            Ok(time)
        );
    }

    #[test]
    fn test_timestamps_accept_rfc3339() {
        let parsed = Option::<DateTime<Utc>>::from_wire(json!("2016-10-09T08:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp(), 1_476_000_000);

        assert!(Option::<DateTime<Utc>>::from_wire(json!("yesterday")).is_err());
    }

    #[test]
    fn test_lists_of_strings() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(list.to_wire(), json!(["a", "b"]));
        assert_eq!(Vec::<String>::from_wire(json!(["a", 2])), Ok(vec!["a".to_string(), "2".to_string()]));
        assert_eq!(Vec::<String>::from_wire(Value::Null), Ok(Vec::new()));
        assert!(Vec::<String>::from_wire(json!([true])).is_err());
    }
}
