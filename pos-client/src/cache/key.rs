//! Query keys
//!
//! A key is a resource path plus its scoping parameters. Two keys with the
//! same path but different parameters are different cache entries.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    path: String,
    /// Sorted, so parameter order never creates distinct entries
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    /// `/api/tenants/{tenant_id}/{resource}`
    pub fn tenant(tenant_id: i64, resource: &str) -> Self {
        Self::new(format!("/api/tenants/{tenant_id}/{resource}"))
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Request URL relative to the server root
impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

/// Which entries an invalidation or patch applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Exactly this key (path and params)
    Exact(QueryKey),
    /// Every key whose path is this path or below it, any params
    Prefix(String),
}

impl KeyFilter {
    pub fn prefix(path: impl Into<String>) -> Self {
        KeyFilter::Prefix(path.into())
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            KeyFilter::Exact(exact) => exact == key,
            KeyFilter::Prefix(prefix) => {
                let prefix = prefix.trim_end_matches('/');
                key.path == prefix
                    || key
                        .path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

impl From<QueryKey> for KeyFilter {
    fn from(key: QueryKey) -> Self {
        KeyFilter::Exact(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_order_independent() {
        let a = QueryKey::new("/api/x").with_param("b", 2).with_param("a", 1);
        let b = QueryKey::new("/api/x").with_param("a", 1).with_param("b", 2);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "/api/x?a=1&b=2");
    }

    #[test]
    fn filtered_view_is_a_distinct_key() {
        let all = QueryKey::tenant(1, "orders");
        let active = QueryKey::tenant(1, "orders").with_param("active", true);
        assert_ne!(all, active);
        assert_eq!(active.to_string(), "/api/tenants/1/orders?active=true");
        assert_eq!(active.param("active"), Some("true"));
    }

    #[test]
    fn prefix_respects_segment_boundaries() {
        let filter = KeyFilter::prefix("/api/tenants/1");
        assert!(filter.matches(&QueryKey::tenant(1, "tables")));
        assert!(filter.matches(&QueryKey::new("/api/tenants/1")));
        assert!(!filter.matches(&QueryKey::tenant(10, "tables")));

        let orders = KeyFilter::prefix("/api/tenants/1/orders/");
        assert!(orders.matches(&QueryKey::tenant(1, "orders").with_param("active", true)));
        assert!(!orders.matches(&QueryKey::tenant(1, "order-items")));
    }

    #[test]
    fn exact_filter_checks_params() {
        let active = QueryKey::tenant(1, "orders").with_param("active", true);
        let filter = KeyFilter::from(active.clone());
        assert!(filter.matches(&active));
        assert!(!filter.matches(&QueryKey::tenant(1, "orders")));
    }
}
