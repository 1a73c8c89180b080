use dashmap::DashMap;

/// Who asked about which shipment. Subscribers are kept in first-lookup
/// order and never removed.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    by_goods_id: DashMap<String, Vec<String>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `subscriber_id` was newly added.
    pub fn subscribe(&self, goods_id: &str, subscriber_id: &str) -> bool {
        let mut subscribers = self.by_goods_id.entry(goods_id.to_string()).or_default();
        if subscribers.iter().any(|existing| existing == subscriber_id) {
            return false;
        }
        subscribers.push(subscriber_id.to_string());
        true
    }

    pub fn subscribers(&self, goods_id: &str) -> Vec<String> {
        self.by_goods_id
            .get(goods_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
