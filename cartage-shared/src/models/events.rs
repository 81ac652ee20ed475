use uuid::Uuid;

/// Unix timestamp for event stamping.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CourierQuotesReceivedEvent {
    pub line_item_id: String,
    pub supplier_id: String,
    pub quote_count: usize,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ManifestGeneratedEvent {
    pub request_id: Uuid,
    pub order_id: String,
    pub supplier_id: String,
    pub courier_id: String,
    pub line_item_ids: Vec<String>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct LabelGeneratedEvent {
    pub request_id: Uuid,
    pub order_id: String,
    pub supplier_id: String,
    pub courier_id: String,
    pub line_item_ids: Vec<String>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct FulfillmentCompletedEvent {
    pub order_id: String,
    pub groups_processed: usize,
    pub line_item_ids: Vec<String>,
    pub timestamp: i64,
}
