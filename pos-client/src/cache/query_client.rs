//! Query client: fetch-through reads, eager invalidation and live patches

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::live::LiveMessage;
use std::sync::Arc;

use super::{EntryState, KeyFilter, QueryCache, QueryKey};
use crate::error::{ClientError, ClientResult};

/// Source of authoritative data for a key
#[async_trait]
pub trait QueryFetcher: Send + Sync {
    async fn fetch(&self, key: &QueryKey) -> ClientResult<Value>;
}

/// What a read resolves to when the server answers 401
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedBehavior {
    /// "Not logged in" is a normal answer: resolve to `None`
    ReturnNull,
    /// 401 is an error
    #[default]
    Throw,
}

pub struct QueryClient<F> {
    fetcher: F,
    cache: Arc<QueryCache>,
}

impl<F: Clone> Clone for QueryClient<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<F: QueryFetcher> QueryClient<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Always hits the server and stores the result as fresh
    pub async fn fetch_query<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
        on_unauthorized: UnauthorizedBehavior,
    ) -> ClientResult<Option<T>> {
        match self.fetcher.fetch(key).await {
            Ok(data) => {
                let value = T::deserialize(&data)
                    .map_err(|e| ClientError::InvalidResponse(format!("{key}: {e}")))?;
                self.cache.set_fresh_value(key.clone(), data);
                Ok(Some(value))
            }
            Err(ClientError::Unauthorized)
                if on_unauthorized == UnauthorizedBehavior::ReturnNull =>
            {
                self.cache.set_fresh_value(key.clone(), Value::Null);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Cached value when fresh. Stale and optimistic entries are refetched,
    /// so an unconfirmed local patch never outlives the next read.
    pub async fn query<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
        on_unauthorized: UnauthorizedBehavior,
    ) -> ClientResult<Option<T>> {
        if self.cache.state(key) == Some(EntryState::Fresh) {
            let cached = self.cache.get_value(key).unwrap_or(Value::Null);
            if cached.is_null() {
                return Ok(None);
            }
            if let Ok(value) = T::deserialize(&cached) {
                return Ok(Some(value));
            }
        }
        self.fetch_query(key, on_unauthorized).await
    }

    /// Mark matching entries stale and refetch each of them now.
    ///
    /// Every entry is attempted; the first error is returned after the rest
    /// have been tried.
    pub async fn invalidate_and_refetch(&self, filter: &KeyFilter) -> ClientResult<usize> {
        let keys = self.cache.invalidate(filter);
        let mut first_error = None;
        let mut refetched = 0;
        for key in &keys {
            match self
                .fetch_query::<Value>(key, UnauthorizedBehavior::Throw)
                .await
            {
                Ok(_) => refetched += 1,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Refetch failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(refetched),
        }
    }

    /// Patch cached collections with a broadcast entity. Collections that do
    /// not contain the entity yet are marked stale so the next read refetches.
    /// Returns the number of entries patched.
    pub fn apply_live(&self, msg: &LiveMessage) -> ClientResult<usize> {
        let (filters, id, entity) = match msg {
            LiveMessage::TableUpdated { table } => (
                vec![
                    KeyFilter::Exact(QueryKey::tenant(table.tenant_id, "tables")),
                    KeyFilter::Exact(QueryKey::new(format!(
                        "/api/areas/{}/tables",
                        table.area_id
                    ))),
                ],
                table.id,
                serde_json::to_value(table)?,
            ),
            LiveMessage::OrderUpdated { order } => {
                let mut filters = vec![KeyFilter::prefix(format!(
                    "/api/tenants/{}/orders",
                    order.tenant_id
                ))];
                if let Some(table_id) = order.table_id {
                    filters.push(KeyFilter::Exact(QueryKey::new(format!(
                        "/api/tables/{table_id}/orders"
                    ))));
                }
                (filters, order.id, serde_json::to_value(order)?)
            }
            LiveMessage::OrderItemUpdated { order_item } => (
                vec![KeyFilter::Exact(QueryKey::new(format!(
                    "/api/orders/{}/items",
                    order_item.order_id
                )))],
                order_item.id,
                serde_json::to_value(order_item)?,
            ),
        };

        let mut patched = 0;
        for filter in &filters {
            let outcome = self.cache.patch_entity(filter, id, &entity);
            patched += outcome.patched.len();
            for key in &outcome.missing {
                self.cache.invalidate(&KeyFilter::Exact(key.clone()));
            }
        }

        // 订单结束后不再属于 active 视图
        if let LiveMessage::OrderUpdated { order } = msg
            && order.status.is_terminal()
        {
            let orders = KeyFilter::prefix(format!("/api/tenants/{}/orders", order.tenant_id));
            for key in self.cache.keys_matching(&orders) {
                if key.param("active") == Some("true") {
                    self.cache.invalidate(&KeyFilter::Exact(key));
                }
            }
        }

        tracing::debug!(kind = msg.kind(), id, patched, "Applied live message");
        Ok(patched)
    }
}
