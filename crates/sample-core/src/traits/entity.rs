//! The contract every persisted record fulfils.

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::types::value::FieldValue;

/// Name of the identifier field.
pub const ID: &str = "id";
/// Name of the creation timestamp field.
pub const CREATED_AT: &str = "created_at";
/// Name of the last-update timestamp field.
pub const UPDATED_AT: &str = "updated_at";
/// Name of the soft-delete timestamp field.
pub const DELETED_AT: &str = "deleted_at";

/// Base fields shared by every entity, in column order.
pub const BASE_FIELDS: [&str; 4] = [ID, CREATED_AT, UPDATED_AT, DELETED_AT];

/// A persisted record with an identifier, audit timestamps and soft-delete
/// marker.
///
/// Field access by name replaces runtime reflection: predicates, sort keys
/// and SQL row binding all go through [`Entity::field`], and updates go
/// through the explicit [`Entity::merge_from`].
pub trait Entity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Type name used in cache keys (`repo_{NAME}_{id}`).
    const NAME: &'static str;

    /// Backing table name.
    const TABLE: &'static str;

    /// Every field name, base fields first. Doubles as the column list.
    const FIELDS: &'static [&'static str];

    /// Relations that may be requested through `includes`.
    const RELATIONS: &'static [&'static str] = &[];

    /// Identifier. `Uuid::nil()` means "not assigned yet".
    fn id(&self) -> Uuid;

    /// Assign the identifier.
    fn set_id(&mut self, id: Uuid);

    /// Creation timestamp (Unix seconds, `0` when unset).
    fn created_at(&self) -> i64;

    /// Assign the creation timestamp.
    fn set_created_at(&mut self, ts: i64);

    /// Last update timestamp.
    fn updated_at(&self) -> Option<i64>;

    /// Assign the last update timestamp.
    fn set_updated_at(&mut self, ts: Option<i64>);

    /// Soft-delete timestamp. `None` or `Some(0)` means live.
    fn deleted_at(&self) -> Option<i64>;

    /// Assign the soft-delete timestamp.
    fn set_deleted_at(&mut self, ts: Option<i64>);

    /// Read a field by name. Returns `None` for unknown names and
    /// `Some(FieldValue::Null)` for unset optional fields.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Copy every non-null domain field of `incoming` that differs from the
    /// stored value. Base fields are never touched. Returns the names of the
    /// fields that changed.
    fn merge_from(&mut self, incoming: &Self) -> Vec<&'static str>;

    /// Whether the entity has not been soft-deleted.
    fn is_live(&self) -> bool {
        matches!(self.deleted_at(), None | Some(0))
    }

    /// Whether `name` is a declared field.
    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }

    /// Read one of the base fields. Entity implementations delegate the
    /// base names here from [`Entity::field`].
    fn base_field(&self, name: &str) -> Option<FieldValue> {
        match name {
            ID => Some(FieldValue::Uuid(self.id())),
            CREATED_AT => Some(FieldValue::Integer(self.created_at())),
            UPDATED_AT => Some(self.updated_at().into()),
            DELETED_AT => Some(self.deleted_at().into()),
            _ => None,
        }
    }

    /// Column/value pairs for every field, in [`Entity::FIELDS`] order.
    fn to_row(&self) -> Vec<(&'static str, FieldValue)> {
        Self::FIELDS
            .iter()
            .map(|name| (*name, self.field(name).unwrap_or(FieldValue::Null)))
            .collect()
    }
}
