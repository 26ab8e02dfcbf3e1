//! Data-type builders and their finalization rules.
//!
//! Each primitive type has a builder taking partial configuration. Builders
//! produce a [`PartialAttribute`]; calling `finalize` on it resolves every
//! unset option and attaches the kind's coercion rules.
//!
//! ```
//! use schemata_core::datatype::{string, AttributeBuilder};
//!
//! let title = string().required().max(120).finalize().unwrap();
//! assert!(!title.control.allow_null);
//! ```

pub mod boolean;
pub mod date;
pub mod enumeration;
pub mod number;
pub mod string;
pub mod uuid;

pub use boolean::{boolean, BooleanBuilder, BooleanRules};
pub use date::{
    dateonly, datetime, DateOnlyBuilder, DateOnlyRules, DateTimeBuilder, DateTimeRules,
};
pub use enumeration::{enumeration, EnumBuilder, EnumRules};
pub use number::{
    integer, number, IntegerBuilder, IntegerRules, NumberBuilder, NumberRules, PartialRange, Range,
};
pub use string::{
    string, text, PartialTextBounds, Pattern, StringBuilder, StringRules, TextBounds, TextBuilder,
    TextRules,
};
pub use self::uuid::{uuid, FixedUuid, RandomUuid, UuidBuilder, UuidRules, UuidSource};

use crate::catalog::{
    DefaultValue, FinalAttribute, Generator, PartialAttribute, PartialConstraints, PartialControl,
    PartialOrm, PartialUi, Tristate,
};
use crate::error::InvalidSchemaError;
use crate::value::Value;

/// Options shared by every builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonOptions {
    /// Reject null.
    pub required: Tristate,
    /// Primary key.
    pub primary: Tristate,
    /// Unique constraint.
    pub unique: Tristate,
    /// Reject writes through the storage pipeline.
    pub read_only: Tristate,
    /// Secondary index on the column.
    pub index: Tristate,
    /// Hide in generated UIs.
    pub hidden: Tristate,
    /// Declared default.
    pub default: Option<DefaultValue>,
    /// Human-readable label.
    pub display_name: Option<String>,
}

impl CommonOptions {
    /// Combine the shared options with kind-specific constraints.
    pub fn into_partial(self, constraints: PartialConstraints) -> PartialAttribute {
        let allow_null = self.required.negate();
        PartialAttribute {
            control: PartialControl {
                allow_null,
                primary: self.primary,
                unique: self.unique,
                read_only: self.read_only,
                default: self.default,
                constraints,
                ui: PartialUi {
                    hidden: self.hidden,
                    display_name: self.display_name,
                },
            },
            orm: PartialOrm {
                allow_null,
                primary: self.primary,
                unique: self.unique,
                index: self.index,
                default: None,
            },
        }
    }
}

/// Common builder surface.
pub trait AttributeBuilder: Sized {
    /// Shared options being built.
    fn common_mut(&mut self) -> &mut CommonOptions;

    /// Produce the declared attribute.
    fn build(self) -> PartialAttribute;

    /// Reject null.
    fn required(mut self) -> Self {
        self.common_mut().required = Tristate::True;
        self
    }

    /// Explicitly allow null.
    fn optional(mut self) -> Self {
        self.common_mut().required = Tristate::False;
        self
    }

    /// Mark as primary key.
    fn primary(mut self) -> Self {
        self.common_mut().primary = Tristate::True;
        self
    }

    /// Add a unique constraint.
    fn unique(mut self) -> Self {
        self.common_mut().unique = Tristate::True;
        self
    }

    /// Reject writes through the storage pipeline.
    fn read_only(mut self) -> Self {
        self.common_mut().read_only = Tristate::True;
        self
    }

    /// Add a secondary index.
    fn indexed(mut self) -> Self {
        self.common_mut().index = Tristate::True;
        self
    }

    /// Hide in generated UIs.
    fn hidden(mut self) -> Self {
        self.common_mut().hidden = Tristate::True;
        self
    }

    /// Set a human-readable label.
    fn display_name(mut self, name: impl Into<String>) -> Self {
        self.common_mut().display_name = Some(name.into());
        self
    }

    /// Set a static default.
    fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.common_mut().default = Some(DefaultValue::Static(value.into()));
        self
    }

    /// Default to a freshly generated UUID-v4.
    fn generated_uuid(mut self) -> Self {
        self.common_mut().default = Some(DefaultValue::Generated(Generator::UuidV4));
        self
    }

    /// Build and finalize in one step.
    fn finalize(self) -> Result<FinalAttribute, InvalidSchemaError> {
        self.build().finalize()
    }
}

macro_rules! impl_attribute_builder {
    ($($builder:ty),* $(,)?) => {
        $(
            impl From<$builder> for PartialAttribute {
                fn from(builder: $builder) -> Self {
                    builder.build()
                }
            }
        )*
    };
}

impl_attribute_builder!(
    BooleanBuilder,
    StringBuilder,
    TextBuilder,
    NumberBuilder,
    IntegerBuilder,
    UuidBuilder,
    EnumBuilder,
    DateOnlyBuilder,
    DateTimeBuilder,
);
