//! Value coercion pipelines.
//!
//! Every resolved attribute carries eight conversions between the client,
//! wire and storage representations of its values. The kind-independent
//! steps (absent values, null handling, read-only) live here; the
//! kind-specific checks are supplied by a [`ValueRules`] implementation
//! chosen by the attribute's [`Constraints`](crate::catalog::Constraints).
//!
//! Checks run in a fixed order and only the first violation is reported:
//!
//! 1. absent value
//! 2. null
//! 3. primitive type
//! 4. domain checks (finiteness, range, step, length, pattern or format,
//!    enum membership)

use crate::catalog::Control;
use crate::error::CoerceError;
use crate::value::Value;
use std::fmt;

/// Kind-specific half of a coercion pipeline.
///
/// Implementations only ever see non-null values.
pub trait ValueRules: fmt::Debug + Send + Sync {
    /// Validate external input and produce the client representation.
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError>;

    /// Convert a validated client value to its wire form.
    fn wire_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Render a validated client value for a query string.
    fn filter_string(&self, value: &Value) -> String;

    /// Validate a payload value and produce the storage representation.
    fn storage_value(&self, value: &Value) -> Result<Value, CoerceError> {
        self.client_value(value)
    }

    /// Parse a raw query-string parameter into a storage value.
    fn parse_filter(&self, raw: &str) -> Result<Value, CoerceError> {
        self.storage_value(&Value::String(raw.to_owned()))
    }

    /// Convert a storage value into the value returned to the caller.
    fn response_value(&self, value: &Value) -> Value {
        value.clone()
    }
}

/// Null if the attribute allows it.
pub fn null_value(control: &Control) -> Result<Value, CoerceError> {
    if control.allow_null {
        Ok(Value::Null)
    } else {
        Err(CoerceError::Null)
    }
}

fn client_input(control: &Control, value: Option<&Value>) -> Result<Value, CoerceError> {
    match value {
        None => Err(CoerceError::Undefined),
        Some(Value::Null) => null_value(control),
        Some(value) => control.constraints.rules().client_value(value),
    }
}

/// Raw external input to a validated client value.
pub fn set_client_property_value(
    control: &Control,
    value: Option<&Value>,
) -> Result<Value, CoerceError> {
    client_input(control, value)
}

/// Validated client value to its wire form. Never fails.
pub fn serialize_client_property_value(control: &Control, value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        value => control.constraints.rules().wire_value(value),
    }
}

/// Raw query-filter input to a validated client value.
pub fn set_client_query_filter_value(
    control: &Control,
    value: Option<&Value>,
) -> Result<Value, CoerceError> {
    client_input(control, value)
}

/// Validated client filter value to its query-string form.
pub fn serialize_client_query_filter_value(control: &Control, value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        value => control.constraints.rules().filter_string(value),
    }
}

/// Server response value to a client value.
pub fn set_client_property_value_from_response(
    control: &Control,
    value: Option<&Value>,
) -> Result<Value, CoerceError> {
    client_input(control, value)
}

/// API payload value to a storage value.
///
/// Read-only attributes reject every write. An absent value is stored as
/// null when the attribute allows it.
pub fn set_orm_property_value(
    control: &Control,
    value: Option<&Value>,
) -> Result<Value, CoerceError> {
    if control.read_only {
        return Err(CoerceError::ReadOnly);
    }
    match value {
        None | Some(Value::Null) => null_value(control),
        Some(value) => control.constraints.rules().storage_value(value),
    }
}

/// Query-string parameter to a storage-typed filter value.
pub fn set_orm_query_filter_value(control: &Control, raw: &str) -> Result<Value, CoerceError> {
    match raw {
        "null" | "undefined" => null_value(control),
        raw => control.constraints.rules().parse_filter(raw),
    }
}

/// Storage value to the value returned to the caller.
pub fn serialize_orm_property_value(control: &Control, value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        value => control.constraints.rules().response_value(value),
    }
}
