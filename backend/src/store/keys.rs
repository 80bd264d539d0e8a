use std::fmt::Display;

use storefront_shared::{
    COUNTER_SUFFIX, ORDERS_COLLECTION, PRODUCTS_COLLECTION, PROMOS_COLLECTION, STATS_KEY,
    USERS_COLLECTION,
};

/// Root of every key the service writes, e.g. `vape_shop`.
#[derive(Debug, Clone)]
pub struct KeyNamespace {
    root: String,
}

impl KeyNamespace {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn products(&self) -> Collection {
        self.collection(PRODUCTS_COLLECTION, true)
    }

    pub fn orders(&self) -> Collection {
        self.collection(ORDERS_COLLECTION, true)
    }

    /// Users are keyed by external id; the collection still reserves the counter key.
    pub fn users(&self) -> Collection {
        self.collection(USERS_COLLECTION, true)
    }

    /// Promos are keyed by code, so `counter` is an ordinary code here.
    pub fn promos(&self) -> Collection {
        self.collection(PROMOS_COLLECTION, false)
    }

    pub fn stats(&self) -> String {
        format!("{}:{}", self.root, STATS_KEY)
    }

    fn collection(&self, name: &str, has_counter: bool) -> Collection {
        Collection {
            prefix: format!("{}:{}", self.root, name),
            has_counter,
        }
    }
}

/// Keys of one entity type: `{root}:{name}:{id}`, plus `{root}:{name}:counter`
/// for collections with a counter.
#[derive(Debug, Clone)]
pub struct Collection {
    prefix: String,
    has_counter: bool,
}

impl Collection {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn record(&self, id: impl Display) -> String {
        format!("{}:{}", self.prefix, id)
    }

    pub fn counter(&self) -> String {
        self.record(COUNTER_SUFFIX)
    }

    pub fn is_counter(&self, key: &str) -> bool {
        self.has_counter && key == self.counter()
    }
}
