//! Entity trait: identity + continuity across state changes.

use crate::id::RecordId;

/// Entity marker + minimal interface.
///
/// Every persisted record in the catalog is keyed by a sequential integer id,
/// so stores can be written once against this trait.
pub trait Entity: Clone + core::fmt::Debug {
    /// Strongly-typed entity identifier.
    type Id: RecordId;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
