// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EntityResolver trait implementation

use crate::scanner::{EntityIndex, EntityScanner};
use crate::tokenizer::parse_entity_at;
use cadmesh_model::{DecodedEntity, EntityId, EntityResolver, StepType};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe, lazily decoding entity resolver
///
/// Entities are located by a single scan up front and decoded on first
/// access.
pub struct StepResolver {
    /// Raw file content (owned for thread safety)
    content: String,
    /// Entity ID -> (start, end) byte offsets
    index: EntityIndex,
    /// Decoded entity cache
    cache: RwLock<FxHashMap<u32, Arc<DecodedEntity>>>,
    /// Type -> entity IDs index, IDs ascending
    type_index: FxHashMap<StepType, Vec<EntityId>>,
}

impl StepResolver {
    /// Scan `content` and build the entity and type indexes
    pub fn new(content: String) -> Self {
        let mut index = EntityIndex::default();
        let mut type_index: FxHashMap<StepType, Vec<EntityId>> = FxHashMap::default();

        {
            let mut scanner = EntityScanner::new(&content);
            while let Some((id, type_name, start, end)) = scanner.next_entity() {
                index.insert(id, (start, end));
                type_index
                    .entry(StepType::parse(type_name))
                    .or_default()
                    .push(EntityId(id));
            }
        }

        for ids in type_index.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }

        Self {
            content,
            index,
            cache: RwLock::new(FxHashMap::default()),
            type_index,
        }
    }

    /// Get raw content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Decode and cache an entity
    fn decode_and_cache(&self, id: u32) -> Option<Arc<DecodedEntity>> {
        {
            let cache = self.cache.read().ok()?;
            if let Some(cached) = cache.get(&id) {
                return Some(Arc::clone(cached));
            }
        }

        let (start, end) = self.index.get(&id)?;
        let entity = parse_entity_at(&self.content, *start, *end).ok()?;
        let arc = Arc::new(entity);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&arc));
        }

        Some(arc)
    }
}

impl EntityResolver for StepResolver {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.decode_and_cache(id.0)
    }

    fn ids_by_type(&self, step_type: &StepType) -> Vec<EntityId> {
        self.type_index.get(step_type).cloned().unwrap_or_default()
    }

    fn count_by_type(&self, step_type: &StepType) -> usize {
        self.type_index.get(step_type).map(|v| v.len()).unwrap_or(0)
    }

    fn entity_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadmesh_model::EntityResolverExt;

    const TEST_STEP: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('CONFIG_CONTROL_DESIGN'));
ENDSEC;
DATA;
#12=CARTESIAN_POINT('',(1.,0.,0.));
#3=CARTESIAN_POINT('',(0.,0.,0.));
#4=VERTEX_POINT('',#3);
#5=VERTEX_POINT('',#99);
ENDSEC;
END-ISO-10303-21;
"#;

    fn resolver() -> StepResolver {
        StepResolver::new(TEST_STEP.to_string())
    }

    #[test]
    fn test_resolver_get() {
        let entity = resolver().get(EntityId(4)).unwrap();
        assert_eq!(entity.id, EntityId(4));
        assert_eq!(entity.step_type, StepType::VertexPoint);
    }

    #[test]
    fn test_ids_by_type_are_sorted() {
        let ids = resolver().ids_by_type(&StepType::CartesianPoint);
        assert_eq!(ids, vec![EntityId(3), EntityId(12)]);
        assert_eq!(resolver().count_by_type(&StepType::ClosedShell), 0);
        assert_eq!(resolver().entity_count(), 4);
    }

    #[test]
    fn test_resolve_attr_reports_dangling_reference() {
        let r = resolver();
        let vertex = r.get(EntityId(4)).unwrap();
        assert_eq!(r.resolve_attr(&vertex, 1).unwrap().id, EntityId(3));

        let dangling = r.get(EntityId(5)).unwrap();
        assert!(r.resolve_attr(&dangling, 1).is_err());
    }

    #[test]
    fn test_resolver_thread_safe() {
        use std::thread;

        let resolver = Arc::new(resolver());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    for id in [3, 4, 5, 12] {
                        assert!(resolver.get(EntityId(id)).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
