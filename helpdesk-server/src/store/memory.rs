//! In-memory document store
//!
//! Backed by a [`DashMap`] keyed by `(collection, id)`. Each entry remembers
//! its insertion sequence so listings come back in insertion order.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{
    Direction, DocumentStore, Fields, Record, StoreError, StoreResult, apply_patch,
    compare_field, matches_expected,
};

#[derive(Debug, Clone)]
struct StoredDoc {
    seq: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<(String, String), StoredDoc>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(collection: &str, id: &str) -> (String, String) {
        (collection.to_string(), id.to_string())
    }

    fn seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn snapshot(&self, collection: &str) -> Vec<(u64, Record)> {
        self.docs
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| {
                let doc = entry.value();
                (
                    doc.seq,
                    Record {
                        id: entry.key().1.clone(),
                        fields: doc.fields.clone(),
                    },
                )
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let seq = self.seq();
        self.docs
            .insert(Self::key(collection, &id), StoredDoc { seq, fields });
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        match self.docs.entry(Self::key(collection, id)) {
            Entry::Occupied(mut entry) => entry.get_mut().fields = fields,
            Entry::Vacant(entry) => {
                entry.insert(StoredDoc {
                    seq: self.seq(),
                    fields,
                });
            }
        }
        Ok(())
    }

    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let mut docs = self.snapshot(collection);
        docs.sort_by_key(|(seq, _)| *seq);
        Ok(docs.into_iter().map(|(_, record)| record).collect())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Record> {
        self.docs
            .get(&Self::key(collection, id))
            .map(|doc| Record {
                id: id.to_string(),
                fields: doc.fields.clone(),
            })
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn update_fields(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        let mut doc = self
            .docs
            .get_mut(&Self::key(collection, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        apply_patch(&mut doc.fields, patch);
        Ok(())
    }

    async fn update_fields_if(
        &self,
        collection: &str,
        id: &str,
        expected: &Fields,
        patch: Fields,
    ) -> StoreResult<()> {
        // get_mut holds the shard write lock across check and write
        let mut doc = self
            .docs
            .get_mut(&Self::key(collection, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        if !matches_expected(&doc.fields, expected) {
            return Err(StoreError::conflict(collection, id));
        }
        apply_patch(&mut doc.fields, patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.docs
            .remove(&Self::key(collection, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn query_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Record>> {
        let mut docs = self.snapshot(collection);
        docs.sort_by(|(seq_a, a), (seq_b, b)| {
            compare_field(a.fields.get(field), b.fields.get(field), direction)
                .then(seq_a.cmp(seq_b))
        });
        Ok(docs.into_iter().map(|(_, record)| record).collect())
    }
}
