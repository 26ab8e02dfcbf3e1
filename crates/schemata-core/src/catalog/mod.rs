//! Schema catalog: attribute, relationship and schema definitions.
//!
//! Every definition exists in a declared ("partial") form, where options may
//! be left unset, and a resolved form where every option has a concrete
//! value. The assembler and resolver move a [`SchemaMap`] from one form to
//! the other.

mod attribute;
mod control;
mod map;
mod orm;
mod relation;
mod schema;
mod types;

pub use attribute::{FinalAttribute, PartialAttribute};
pub use control::{
    Constraints, Control, DefaultValue, Generator, PartialConstraints, PartialControl, PartialUi,
    UiHints,
};
pub use map::{serialize_entries, SchemaMap};
pub use orm::{ColumnType, Orm, PartialOrm};
pub use relation::{
    belongs_to, has_many, has_one, BelongsTo, HasMany, HasOne, PartialRelationship, Relationship,
};
pub use schema::{AssembledSchema, FinalSchema, Id, PartialSchema};
pub use types::{AttributeKind, DateStep, Limit, Tristate};
