use async_trait::async_trait;
use cartage_shared::Redacted;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer block embedded in every manifest and label request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub id: String,
    pub name: String,
    pub email: Redacted<String>,
    pub phone: Redacted<String>,
    pub postal_code: String,
    pub address: String,
}

/// One order line as the document service expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestLine {
    pub line_item_id: String,
    pub product: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price_cents: i32,
}

/// Request for one shipment group's manifest.
///
/// Supplier display fields may be empty when the chosen identifier could not
/// be resolved against the candidate list; the service renders blanks rather
/// than rejecting the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRequest {
    pub request_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_address: String,
    pub supplier_phone: String,
    pub courier_id: String,
    pub courier_name: String,
    pub customer: CustomerDetails,
    pub line_items: Vec<ManifestLine>,
}

impl ManifestRequest {
    /// Label request for the same shipment group, under its own correlation id.
    pub fn to_label_request(&self) -> LabelRequest {
        LabelRequest {
            request_id: Uuid::new_v4(),
            requested_at: Utc::now(),
            supplier_id: self.supplier_id.clone(),
            supplier_name: self.supplier_name.clone(),
            supplier_address: self.supplier_address.clone(),
            supplier_phone: self.supplier_phone.clone(),
            courier_id: self.courier_id.clone(),
            courier_name: self.courier_name.clone(),
            customer: self.customer.clone(),
            line_items: self.line_items.clone(),
        }
    }
}

/// Same shape as [`ManifestRequest`]; the label service is called separately
/// and the two payloads may diverge later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRequest {
    pub request_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_address: String,
    pub supplier_phone: String,
    pub courier_id: String,
    pub courier_name: String,
    pub customer: CustomerDetails,
    pub line_items: Vec<ManifestLine>,
}

/// Acknowledgement from the document service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReceipt {
    pub request_id: Uuid,
    pub document_url: Option<String>,
}

#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Render the shipping manifest for one group.
    async fn generate_manifest(
        &self,
        request: &ManifestRequest,
    ) -> Result<DocumentReceipt, Box<dyn std::error::Error + Send + Sync>>;

    /// Render the shipping label for one group.
    async fn generate_label(
        &self,
        request: &LabelRequest,
    ) -> Result<DocumentReceipt, Box<dyn std::error::Error + Send + Sync>>;
}
