use cartage_core::documents::{DocumentClient, DocumentReceipt, LabelRequest, ManifestRequest};
use cartage_core::CoreError;
use cartage_shared::models::events::{
    unix_timestamp, FulfillmentCompletedEvent, LabelGeneratedEvent, ManifestGeneratedEvent,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::events::FulfillmentTelemetry;
use crate::grouping::{group_for_manifest, GroupKey, ManifestGroup};
use crate::models::{CourierCandidate, Customer, LineItem, Order, SupplierCandidate};

/// What one successful run did. The caller owns the status write-back and
/// any re-fetch of authoritative order state.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentReport {
    pub groups_processed: usize,
    pub fulfilled_line_ids: Vec<String>,
}

/// Drives manifest and label generation for every pending shipment group.
pub struct FulfillmentOrchestrator {
    documents: Arc<dyn DocumentClient>,
    telemetry: Option<FulfillmentTelemetry>,
}

impl FulfillmentOrchestrator {
    pub fn new(documents: Arc<dyn DocumentClient>) -> Self {
        Self {
            documents,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: FulfillmentTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Generate a manifest and a label for every pending shipment group.
    ///
    /// Groups are processed strictly sequentially, each with two sequential
    /// remote calls, and the first failing call aborts the run. Groups that
    /// completed before the failure keep their external side effects
    /// (at-least-once); re-invoking retries only groups whose lines never
    /// reached terminal status, since grouping excludes terminal lines.
    pub async fn generate_manifests_and_labels(
        &self,
        order: &Order,
        customer: &Customer,
        items: &[LineItem],
    ) -> Result<FulfillmentReport, OrchestrationError> {
        let pending: Vec<LineItem> = items
            .iter()
            .filter(|item| !item.status.is_terminal())
            .cloned()
            .collect();

        if pending.is_empty() {
            tracing::info!(order_id = %order.id, "all line items already fulfilled, nothing to generate");
            return Ok(FulfillmentReport::default());
        }

        let groups = group_for_manifest(&pending);
        tracing::info!(order_id = %order.id, groups = groups.len(), "starting manifest and label generation");

        let mut report = FulfillmentReport::default();
        for group in &groups {
            self.process_group(order, customer, group).await?;
            report.groups_processed += 1;
            report
                .fulfilled_line_ids
                .extend(group.items.iter().map(|item| item.id.clone()));
        }

        if let Some(ref telemetry) = self.telemetry {
            telemetry.log_fulfillment_completed(FulfillmentCompletedEvent {
                order_id: order.id.clone(),
                groups_processed: report.groups_processed,
                line_item_ids: report.fulfilled_line_ids.clone(),
                timestamp: unix_timestamp(),
            });
        }

        Ok(report)
    }

    /// Manifest first, then label. Either failure aborts the whole run so a
    /// label is never produced for a manifest that did not succeed.
    async fn process_group(
        &self,
        order: &Order,
        customer: &Customer,
        group: &ManifestGroup,
    ) -> Result<(), OrchestrationError> {
        let manifest_request = self.build_manifest_request(customer, group);

        let receipt = self
            .documents
            .generate_manifest(&manifest_request)
            .await
            .map_err(|source| OrchestrationError::ManifestFailed {
                group: group.key.clone(),
                source,
            })?;
        self.log_document(group, "manifest", &receipt);
        if let Some(ref telemetry) = self.telemetry {
            telemetry.log_manifest_generated(ManifestGeneratedEvent {
                request_id: manifest_request.request_id,
                order_id: order.id.clone(),
                supplier_id: group.key.supplier_id.clone(),
                courier_id: group.key.courier_id.clone(),
                line_item_ids: group.items.iter().map(|item| item.id.clone()).collect(),
                timestamp: unix_timestamp(),
            });
        }

        let label_request = manifest_request.to_label_request();
        let receipt = self
            .documents
            .generate_label(&label_request)
            .await
            .map_err(|source| OrchestrationError::LabelFailed {
                group: group.key.clone(),
                source,
            })?;
        self.log_document(group, "label", &receipt);
        if let Some(ref telemetry) = self.telemetry {
            telemetry.log_label_generated(LabelGeneratedEvent {
                request_id: label_request.request_id,
                order_id: order.id.clone(),
                supplier_id: group.key.supplier_id.clone(),
                courier_id: group.key.courier_id.clone(),
                line_item_ids: group.items.iter().map(|item| item.id.clone()).collect(),
                timestamp: unix_timestamp(),
            });
        }

        Ok(())
    }

    fn build_manifest_request(&self, customer: &Customer, group: &ManifestGroup) -> ManifestRequest {
        let supplier = resolve_supplier(group);
        if supplier.is_none() {
            tracing::warn!(
                group = %group.key,
                "chosen supplier not found in candidate list, proceeding with empty supplier details"
            );
        }
        let courier = resolve_courier(group);
        if courier.is_none() {
            tracing::warn!(
                group = %group.key,
                "chosen courier not found in candidate list, proceeding with empty courier name"
            );
        }

        ManifestRequest {
            request_id: Uuid::new_v4(),
            requested_at: Utc::now(),
            supplier_id: group.key.supplier_id.clone(),
            supplier_name: supplier.map(|s| s.name.clone()).unwrap_or_default(),
            supplier_address: supplier.map(|s| s.address.clone()).unwrap_or_default(),
            supplier_phone: supplier.map(|s| s.phone.clone()).unwrap_or_default(),
            courier_id: group.key.courier_id.clone(),
            courier_name: courier.map(|c| c.name.clone()).unwrap_or_default(),
            customer: customer.details(),
            line_items: group.items.iter().map(|item| item.manifest_line()).collect(),
        }
    }

    fn log_document(&self, group: &ManifestGroup, stage: &str, receipt: &DocumentReceipt) {
        tracing::info!(
            group = %group.key,
            stage = stage,
            request_id = %receipt.request_id,
            url = receipt.document_url.as_deref().unwrap_or(""),
            "document generated"
        );
    }
}

/// Trimmed comparison: identifiers reach us through different collaborators
/// and may carry incidental whitespace.
fn id_matches(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

fn resolve_supplier(group: &ManifestGroup) -> Option<&SupplierCandidate> {
    let first = group.items.first()?;
    first
        .suppliers
        .iter()
        .find(|s| id_matches(&s.id, &group.key.supplier_id))
}

fn resolve_courier(group: &ManifestGroup) -> Option<&CourierCandidate> {
    let first = group.items.first()?;
    first
        .available_couriers
        .iter()
        .find(|c| id_matches(&c.id, &group.key.courier_id))
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("Manifest generation failed for group {group}: {source}")]
    ManifestFailed {
        group: GroupKey,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Label generation failed for group {group}: {source}")]
    LabelFailed {
        group: GroupKey,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl OrchestrationError {
    /// Which remote call failed.
    pub fn stage(&self) -> &'static str {
        match self {
            OrchestrationError::ManifestFailed { .. } => "manifest",
            OrchestrationError::LabelFailed { .. } => "label",
        }
    }

    pub fn group(&self) -> &GroupKey {
        match self {
            OrchestrationError::ManifestFailed { group, .. }
            | OrchestrationError::LabelFailed { group, .. } => group,
        }
    }
}

/// In-memory document client for tests and local development.
///
/// Records every call in order. Magic supplier ids trigger failures:
/// `FAIL-MANIFEST` fails the manifest call, `FAIL-LABEL` fails the label
/// call.
#[derive(Default)]
pub struct MockDocumentClient {
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub stage: &'static str,
    pub supplier_id: String,
    pub courier_id: String,
}

impl MockDocumentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log lock poisoned").clone()
    }

    fn record(&self, stage: &'static str, supplier_id: &str, courier_id: &str) {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .push(RecordedCall {
                stage,
                supplier_id: supplier_id.to_string(),
                courier_id: courier_id.to_string(),
            });
    }
}

#[async_trait::async_trait]
impl DocumentClient for MockDocumentClient {
    async fn generate_manifest(
        &self,
        request: &ManifestRequest,
    ) -> Result<DocumentReceipt, Box<dyn std::error::Error + Send + Sync>> {
        self.record("manifest", &request.supplier_id, &request.courier_id);

        if request.supplier_id == "FAIL-MANIFEST" {
            return Err(Box::new(CoreError::RemoteError(
                "simulated document service outage".to_string(),
            )));
        }

        Ok(DocumentReceipt {
            request_id: request.request_id,
            document_url: Some(format!(
                "https://documents.local/manifests/{}.pdf",
                request.request_id
            )),
        })
    }

    async fn generate_label(
        &self,
        request: &LabelRequest,
    ) -> Result<DocumentReceipt, Box<dyn std::error::Error + Send + Sync>> {
        self.record("label", &request.supplier_id, &request.courier_id);

        if request.supplier_id == "FAIL-LABEL" {
            return Err(Box::new(CoreError::RemoteError(
                "simulated document service outage".to_string(),
            )));
        }

        Ok(DocumentReceipt {
            request_id: request.request_id,
            document_url: Some(format!(
                "https://documents.local/labels/{}.pdf",
                request.request_id
            )),
        })
    }
}
