//! Client state cache
//!
//! Entries are JSON values keyed by [`QueryKey`]. Server responses land as
//! `Fresh`; local speculative edits land as `Optimistic` until a broadcast
//! or refetch overwrites them (server wins). Only `Fresh` entries are served
//! without a round trip. Invalidation marks entries `Stale`.

mod key;
mod query_client;

pub use key::{KeyFilter, QueryKey};
pub use query_client::{QueryClient, QueryFetcher, UnauthorizedBehavior};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::util::now_millis;

use crate::error::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Last written from a server response
    Fresh,
    /// Marked for refetch
    Stale,
    /// Patched locally, not yet confirmed
    Optimistic,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    state: EntryState,
    updated_at: i64,
}

/// Result of [`QueryCache::patch_entity`]
#[derive(Debug, Default, PartialEq)]
pub struct PatchOutcome {
    /// Entries where the entity was found and merged
    pub patched: Vec<QueryKey>,
    /// List entries that do not contain the entity yet
    pub missing: Vec<QueryKey>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed read; `None` when absent or not decodable as `T`
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        match T::deserialize(&entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cached value has unexpected shape");
                None
            }
        }
    }

    pub fn get_value(&self, key: &QueryKey) -> Option<Value> {
        self.entries.get(key).map(|e| e.data.clone())
    }

    pub fn state(&self, key: &QueryKey) -> Option<EntryState> {
        self.entries.get(key).map(|e| e.state)
    }

    pub fn updated_at(&self, key: &QueryKey) -> Option<i64> {
        self.entries.get(key).map(|e| e.updated_at)
    }

    fn put(&self, key: QueryKey, data: Value, state: EntryState) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                state,
                updated_at: now_millis(),
            },
        );
    }

    /// Authoritative write; replaces whatever was there, optimistic or not
    pub fn set_fresh_value(&self, key: QueryKey, data: Value) {
        self.put(key, data, EntryState::Fresh);
    }

    pub fn set_fresh<T: Serialize>(&self, key: QueryKey, data: &T) -> ClientResult<()> {
        self.set_fresh_value(key, serde_json::to_value(data)?);
        Ok(())
    }

    /// Optimistic patch of exactly `key`. `update` receives the current value
    /// (if any and decodable) and returns the new one.
    pub fn set_query_data<T, F>(&self, key: QueryKey, update: F) -> ClientResult<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let next = update(self.get(&key));
        self.put(key, serde_json::to_value(&next)?, EntryState::Optimistic);
        Ok(())
    }

    /// Mark matching entries stale and return their keys
    pub fn invalidate(&self, filter: &KeyFilter) -> Vec<QueryKey> {
        let mut keys = Vec::new();
        for mut entry in self.entries.iter_mut() {
            if filter.matches(entry.key()) {
                entry.state = EntryState::Stale;
                keys.push(entry.key().clone());
            }
        }
        keys.sort();
        keys
    }

    pub fn keys_matching(&self, filter: &KeyFilter) -> Vec<QueryKey> {
        let mut keys: Vec<_> = self
            .entries
            .iter()
            .filter(|e| filter.matches(e.key()))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `entity` into every matching entry that holds an object with the
    /// same `id`, either directly or as an element of a list. Fields the
    /// entity lacks (e.g. a joined `menuItem`) are kept. The entity is
    /// authoritative, so an `Optimistic` entry becomes `Fresh`; a `Stale` one
    /// stays stale.
    pub fn patch_entity(&self, filter: &KeyFilter, id: i64, entity: &Value) -> PatchOutcome {
        let mut outcome = PatchOutcome::default();
        for mut entry in self.entries.iter_mut() {
            if !filter.matches(entry.key()) {
                continue;
            }
            let key = entry.key().clone();
            let found = match &mut entry.data {
                Value::Array(items) => {
                    let mut found = false;
                    for item in items.iter_mut().filter(|item| has_id(item, id)) {
                        merge_object(item, entity);
                        found = true;
                    }
                    if !found {
                        outcome.missing.push(key.clone());
                    }
                    found
                }
                obj @ Value::Object(_) if has_id(obj, id) => {
                    merge_object(obj, entity);
                    true
                }
                _ => false,
            };
            if found {
                if entry.state == EntryState::Optimistic {
                    entry.state = EntryState::Fresh;
                }
                entry.updated_at = now_millis();
                outcome.patched.push(key);
            }
        }
        outcome.patched.sort();
        outcome.missing.sort();
        outcome
    }
}

fn has_id(value: &Value, id: i64) -> bool {
    value.get("id").and_then(Value::as_i64) == Some(id)
}

fn merge_object(target: &mut Value, patch: &Value) {
    match (target.as_object_mut(), patch.as_object()) {
        (Some(target), Some(patch)) => {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        _ => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_wins_over_optimistic_patch() {
        let cache = QueryCache::new();
        let key = QueryKey::tenant(1, "tables");
        cache
            .set_fresh(key.clone(), &json!([{"id": 5, "status": "empty"}]))
            .unwrap();

        cache
            .set_query_data(key.clone(), |old: Option<Vec<Value>>| {
                old.unwrap_or_default()
                    .into_iter()
                    .map(|mut t| {
                        t["status"] = json!("occupied");
                        t
                    })
                    .collect()
            })
            .unwrap();
        assert_eq!(cache.state(&key), Some(EntryState::Optimistic));
        assert_eq!(cache.get_value(&key).unwrap()[0]["status"], "occupied");

        cache
            .set_fresh(key.clone(), &json!([{"id": 5, "status": "bill_requested"}]))
            .unwrap();
        assert_eq!(cache.state(&key), Some(EntryState::Fresh));
        assert_eq!(cache.get_value(&key).unwrap()[0]["status"], "bill_requested");
    }

    #[test]
    fn optimistic_patch_touches_exact_key_only() {
        let cache = QueryCache::new();
        let all = QueryKey::tenant(1, "orders");
        let active = QueryKey::tenant(1, "orders").with_param("active", true);
        cache.set_fresh(all.clone(), &json!([{"id": 1, "status": "active"}])).unwrap();
        cache.set_fresh(active.clone(), &json!([{"id": 1, "status": "active"}])).unwrap();

        cache
            .set_query_data(active.clone(), |_: Option<Value>| json!([]))
            .unwrap();
        assert_eq!(cache.get_value(&active).unwrap(), json!([]));
        assert_eq!(cache.get_value(&all).unwrap()[0]["id"], 1);
        assert_eq!(cache.state(&all), Some(EntryState::Fresh));
    }

    #[test]
    fn invalidate_by_prefix() {
        let cache = QueryCache::new();
        cache.set_fresh(QueryKey::tenant(1, "orders"), &json!([])).unwrap();
        cache
            .set_fresh(QueryKey::tenant(1, "orders").with_param("active", true), &json!([]))
            .unwrap();
        cache.set_fresh(QueryKey::tenant(1, "tables"), &json!([])).unwrap();

        let stale = cache.invalidate(&KeyFilter::prefix("/api/tenants/1/orders"));
        assert_eq!(stale.len(), 2);
        assert_eq!(cache.state(&QueryKey::tenant(1, "orders")), Some(EntryState::Stale));
        assert_eq!(cache.state(&QueryKey::tenant(1, "tables")), Some(EntryState::Fresh));
    }

    #[test]
    fn typed_get_with_wrong_shape_is_none() {
        let cache = QueryCache::new();
        let key = QueryKey::new("/api/user");
        cache.set_fresh(key.clone(), &json!("not a list")).unwrap();
        assert!(cache.get::<Vec<Value>>(&key).is_none());
        assert_eq!(cache.get::<String>(&key).as_deref(), Some("not a list"));
    }

    #[test]
    fn patch_entity_merges_and_reports_missing() {
        let cache = QueryCache::new();
        let items = QueryKey::new("/api/orders/7/items");
        let other = QueryKey::new("/api/orders/8/items");
        cache
            .set_fresh(
                items.clone(),
                &json!([
                    {"id": 1, "status": "new", "menuItem": {"id": 3, "name": "Pide"}},
                    {"id": 2, "status": "new"}
                ]),
            )
            .unwrap();
        cache.set_fresh(other.clone(), &json!([{"id": 9}])).unwrap();

        let outcome = cache.patch_entity(
            &KeyFilter::prefix("/api/orders"),
            1,
            &json!({"id": 1, "status": "served"}),
        );
        assert_eq!(outcome.patched, vec![items.clone()]);
        assert_eq!(outcome.missing, vec![other]);

        let data = cache.get_value(&items).unwrap();
        assert_eq!(data[0]["status"], "served");
        assert_eq!(data[0]["menuItem"]["name"], "Pide");
        assert_eq!(data[1]["status"], "new");
    }

    #[test]
    fn patch_single_entity_entry() {
        let cache = QueryCache::new();
        let key = QueryKey::tenant(1, "orders/4");
        cache.set_fresh(key.clone(), &json!({"id": 4, "status": "active"})).unwrap();
        let outcome =
            cache.patch_entity(&KeyFilter::from(key.clone()), 4, &json!({"id": 4, "status": "completed"}));
        assert_eq!(outcome.patched, vec![key.clone()]);
        assert_eq!(cache.get_value(&key).unwrap()["status"], "completed");
    }

    #[test]
    fn patch_promotes_optimistic_but_not_stale() {
        let cache = QueryCache::new();
        let tables = QueryKey::tenant(1, "tables");
        let area = QueryKey::new("/api/areas/1/tables");
        cache
            .set_query_data(tables.clone(), |_: Option<Value>| json!([{"id": 5, "status": "occupied"}]))
            .unwrap();
        cache.set_fresh(area.clone(), &json!([{"id": 5, "status": "empty"}])).unwrap();
        cache.invalidate(&KeyFilter::Exact(area.clone()));

        let entity = json!({"id": 5, "status": "occupied"});
        cache.patch_entity(&KeyFilter::Exact(tables.clone()), 5, &entity);
        cache.patch_entity(&KeyFilter::Exact(area.clone()), 5, &entity);

        assert_eq!(cache.state(&tables), Some(EntryState::Fresh));
        assert_eq!(cache.state(&area), Some(EntryState::Stale));
        assert_eq!(cache.get_value(&area).unwrap()[0]["status"], "occupied");
    }
}
