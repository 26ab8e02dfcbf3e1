//! Core error types.

use crate::catalog::{AttributeKind, DateStep};
use crate::value::Numeric;
use thiserror::Error;

/// Crate-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A declaration is structurally wrong.
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] InvalidSchemaError),

    /// A value violates an attribute's resolved contract.
    #[error(transparent)]
    Coerce(#[from] CoerceError),

    /// A declaration manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while assembling or resolving declarations.
///
/// These are startup-time failures: a host should refuse to serve requests
/// with a schema map that failed to build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSchemaError {
    /// The map key does not follow the naming rule.
    #[error("key '{key}' does not match schema name, expected '{expected}'")]
    KeyMismatch {
        /// The key the schema was declared under.
        key: String,
        /// The key the naming rule requires.
        expected: String,
    },

    /// The schema name is empty or otherwise unusable.
    #[error("invalid schema name '{0}'")]
    InvalidName(String),

    /// An enum attribute was declared without values.
    #[error("enum values must be a non-empty list of strings")]
    EmptyEnum,

    /// `min` is greater than `max`.
    #[error("min {min} is greater than max {max}")]
    InvalidBounds {
        /// Declared minimum.
        min: Numeric,
        /// Declared maximum.
        max: Numeric,
    },

    /// A numeric step is negative or not finite.
    #[error("step {0} must be a finite, non-negative number")]
    InvalidStep(Numeric),

    /// A date step finer than the attribute kind supports.
    #[error("step '{step}' is not supported by {kind} attributes")]
    UnsupportedStep {
        /// The declared step.
        step: DateStep,
        /// The attribute kind.
        kind: AttributeKind,
    },

    /// A pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A static default does not satisfy the attribute's own contract.
    #[error("invalid default value: {0}")]
    InvalidDefault(CoerceError),

    /// Two attributes share a name.
    #[error("duplicate attribute '{attribute}' on schema '{schema}'")]
    DuplicateAttribute {
        /// Schema key.
        schema: String,
        /// Attribute name.
        attribute: String,
    },

    /// Two relationships share a name.
    #[error("duplicate relationship '{relationship}' on schema '{schema}'")]
    DuplicateRelationship {
        /// Schema key.
        schema: String,
        /// Relationship name.
        relationship: String,
    },

    /// The display attribute names nothing on the schema.
    #[error("display attribute '{attribute}' not found on schema '{schema}'")]
    UnknownDisplayAttribute {
        /// Schema key.
        schema: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute failed to finalize.
    #[error("attribute '{schema}.{attribute}': {source}")]
    Attribute {
        /// Schema key.
        schema: String,
        /// Attribute name.
        attribute: String,
        /// Underlying failure.
        #[source]
        source: Box<InvalidSchemaError>,
    },

    /// A relationship points at a schema that is not in the map.
    #[error("relationship '{schema}.{relationship}' targets unknown schema '{target}'")]
    UnknownTarget {
        /// Owning schema key.
        schema: String,
        /// Relationship name.
        relationship: String,
        /// Missing target key.
        target: String,
    },

    /// A synthesized foreign key collides with an existing attribute.
    #[error("foreign key '{attribute}' collides with an existing attribute on schema '{schema}'")]
    ForeignKeyCollision {
        /// Schema key.
        schema: String,
        /// Attribute name.
        attribute: String,
    },

    /// A relationship or attribute name is already taken.
    #[error("name '{name}' is already used on schema '{schema}'")]
    NameCollision {
        /// Schema key.
        schema: String,
        /// Colliding name.
        name: String,
    },

    /// An explicit inverse does not name a matching belongsTo.
    #[error("relationship '{schema}.{relationship}' names inverse '{inverse}', which is not a belongsTo on '{target}' pointing back")]
    InvalidInverse {
        /// Owning schema key.
        schema: String,
        /// Relationship name.
        relationship: String,
        /// Target schema key.
        target: String,
        /// Declared inverse name.
        inverse: String,
    },

    /// Several belongsTo relationships on the target point back and no inverse is named.
    #[error("relationship '{schema}.{relationship}' has ambiguous inverse on '{target}' ('{first}', '{second}'); name one with inverse")]
    AmbiguousInverse {
        /// Owning schema key.
        schema: String,
        /// Relationship name.
        relationship: String,
        /// Target schema key.
        target: String,
        /// First candidate belongsTo.
        first: String,
        /// Second candidate belongsTo.
        second: String,
    },

    /// A schema declares a through relationship to itself.
    #[error("relationship '{schema}.{relationship}' declares a through relationship to its own schema")]
    SelfThrough {
        /// Schema key.
        schema: String,
        /// Relationship name.
        relationship: String,
    },

    /// One participant declares several through relationships to the same partner.
    #[error("schema '{schema}' declares more than one through relationship to '{target}' ('{first}', '{second}')")]
    AmbiguousThrough {
        /// Schema key.
        schema: String,
        /// Partner schema key.
        target: String,
        /// First relationship name.
        first: String,
        /// Second relationship name.
        second: String,
    },

    /// A junction key is already taken by a declared schema.
    #[error("junction schema '{0}' collides with a declared schema")]
    JunctionCollision(String),
}

impl InvalidSchemaError {
    /// Attach the owning schema and attribute to a finalization failure.
    pub fn in_attribute(self, schema: impl Into<String>, attribute: impl Into<String>) -> Self {
        InvalidSchemaError::Attribute {
            schema: schema.into(),
            attribute: attribute.into(),
            source: Box::new(self),
        }
    }
}

/// A value rejected by a coercion pipeline.
///
/// Only the first violated constraint is reported, in pipeline order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// The value was absent.
    #[error("non-undefined value required")]
    Undefined,

    /// The value was null and the attribute does not allow null.
    #[error("non-null value required")]
    Null,

    /// The attribute does not accept writes.
    #[error("read-only value")]
    ReadOnly,

    /// The value has the wrong primitive type.
    #[error("{expected} value required")]
    Type {
        /// Expected primitive.
        expected: &'static str,
    },

    /// The number is infinite.
    #[error("finite number required")]
    NotFinite,

    /// The integer is outside the exactly representable range.
    #[error("safe integer required")]
    UnsafeInteger,

    /// Below `min`.
    #[error("value must be greater than or equal to {min}")]
    BelowMinimum {
        /// Resolved minimum.
        min: Numeric,
    },

    /// Above `max`.
    #[error("value must be less than or equal to {max}")]
    AboveMaximum {
        /// Resolved maximum.
        max: Numeric,
    },

    /// Not an exact multiple of `step`.
    #[error("value must be a multiple of {step}")]
    Step {
        /// Resolved step.
        step: Numeric,
    },

    /// Fewer characters than `min`.
    #[error("length must be at least {min}")]
    TooShort {
        /// Minimum length.
        min: usize,
    },

    /// More characters than `max`.
    #[error("length must be at most {max}")]
    TooLong {
        /// Maximum length.
        max: usize,
    },

    /// The string does not match the attribute pattern.
    #[error("value must match pattern {pattern}")]
    Pattern {
        /// Pattern source.
        pattern: String,
    },

    /// The string is not in the expected format.
    #[error("value must be a valid {format}")]
    Format {
        /// Format name.
        format: &'static str,
    },

    /// The date is not aligned to the step granularity.
    #[error("value must align to a whole {step}")]
    Granularity {
        /// Resolved step.
        step: DateStep,
    },

    /// The string is not one of the enum values.
    #[error("value must be one of {allowed}")]
    NotAllowed {
        /// Quoted, comma-joined allow-list.
        allowed: String,
    },
}

/// Errors raised while loading a declaration manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest is not valid JSON for the declaration format.
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two schemas resolve to the same key.
    #[error("duplicate schema key '{0}'")]
    DuplicateKey(String),

    /// An option was given for a kind that does not support it.
    #[error("attribute '{attribute}': option '{option}' is not supported by {kind} attributes")]
    UnsupportedOption {
        /// Attribute name.
        attribute: String,
        /// Option name.
        option: &'static str,
        /// Attribute kind.
        kind: AttributeKind,
    },

    /// An option has an unusable value.
    #[error("{context}: invalid value for '{option}': {reason}")]
    InvalidOption {
        /// Attribute or relationship name.
        context: String,
        /// Option name.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_error_messages() {
        assert_eq!(CoerceError::Undefined.to_string(), "non-undefined value required");
        assert_eq!(CoerceError::Null.to_string(), "non-null value required");
        assert_eq!(CoerceError::ReadOnly.to_string(), "read-only value");
        assert_eq!(
            CoerceError::Type { expected: "number" }.to_string(),
            "number value required"
        );
        assert_eq!(
            CoerceError::BelowMinimum { min: Numeric(1.0) }.to_string(),
            "value must be greater than or equal to 1"
        );
        assert_eq!(
            CoerceError::Step { step: Numeric(0.5) }.to_string(),
            "value must be a multiple of 0.5"
        );
    }

    #[test]
    fn test_attribute_context() {
        let err = InvalidSchemaError::EmptyEnum.in_attribute("Todo", "status");
        assert_eq!(
            err.to_string(),
            "attribute 'Todo.status': enum values must be a non-empty list of strings"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = CoerceError::Null.into();
        assert!(matches!(err, Error::Coerce(CoerceError::Null)));
        assert_eq!(err.to_string(), "non-null value required");
    }
}
