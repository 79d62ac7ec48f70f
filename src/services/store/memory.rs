use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, Filter, Scan, StoreError};

/// In-process document store used by tests and local development.
///
/// Mirrors the semantics the service depends on from the managed store:
/// create-if-absent is atomic under the collection write lock, deletes of
/// absent keys fail with `NotFound`, and scans sort on a single field.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, value) => doc.get(field) == Some(value),
        Filter::Contains(field, value) => doc
            .get(field)
            .and_then(Value::as_array)
            .map_or(false, |items| items.contains(value)),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }

        let mut doc = doc;
        if let Some(fields) = doc.as_object_mut() {
            fields.insert("$id".to_string(), Value::String(id.to_string()));
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("{collection}/{id}"))),
        }
    }

    async fn scan(&self, collection: &str, scan: Scan) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Value> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| scan.filters.iter().all(|f| matches_filter(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(field) = scan.order_desc {
            docs.sort_by(|a, b| {
                let a = a.get(field).unwrap_or(&Value::Null);
                let b = b.get(field).unwrap_or(&Value::Null);
                compare_values(b, a)
            });

            if let Some(after) = &scan.start_after {
                docs.retain(|doc| {
                    doc.get(field)
                        .map_or(false, |v| compare_values(v, after) == Ordering::Less)
                });
            }
        }

        if let Some(limit) = scan.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
