// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity resolution trait for looking up and resolving STEP entities

use crate::{AttributeValue, DecodedEntity, EntityId, StepType};
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// This trait provides the core functionality for accessing STEP entities
/// and resolving entity references. Implementations should provide O(1)
/// lookup by entity ID.
///
/// # Example
///
/// ```ignore
/// use cadmesh_model::{EntityResolver, EntityId};
///
/// fn print_face(resolver: &dyn EntityResolver, face_id: EntityId) {
///     if let Some(face) = resolver.get(face_id) {
///         for bound in resolver.resolve_ref_list(&face.attributes[1]) {
///             println!("bound {} is a {}", bound.id, bound.step_type);
///         }
///     }
/// }
/// ```
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    ///
    /// Returns the decoded entity if it exists, wrapped in an Arc for
    /// efficient sharing.
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references
    ///
    /// Non-reference items and dangling references are skipped.
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// IDs of all entities of a specific type, in ascending order
    fn ids_by_type(&self, step_type: &StepType) -> Vec<EntityId>;

    /// Count entities of a specific type
    fn count_by_type(&self, step_type: &StepType) -> usize {
        self.ids_by_type(step_type).len()
    }

    /// Get total entity count
    fn entity_count(&self) -> usize;
}

/// Extension methods for EntityResolver
pub trait EntityResolverExt: EntityResolver {
    /// Get entity or return error
    fn get_or_err(&self, id: EntityId) -> crate::Result<Arc<DecodedEntity>> {
        self.get(id).ok_or(crate::ParseError::EntityNotFound(id))
    }

    /// Resolve the reference stored at `attr_index` of `entity`
    fn resolve_attr(
        &self,
        entity: &DecodedEntity,
        attr_index: usize,
    ) -> crate::Result<Arc<DecodedEntity>> {
        entity
            .get(attr_index)
            .and_then(|attr| self.resolve_ref(attr))
            .ok_or(crate::ParseError::InvalidReference {
                entity: entity.id,
                attribute: attr_index,
            })
    }
}

// Blanket implementation for all EntityResolver types
impl<T: EntityResolver + ?Sized> EntityResolverExt for T {}
