use cartage_shared::models::events::{
    CourierQuotesReceivedEvent, FulfillmentCompletedEvent, LabelGeneratedEvent,
    ManifestGeneratedEvent,
};

/// Serializes fulfillment events into the structured log.
///
/// The surrounding deployment forwards these lines to its event pipeline;
/// the engine owns no message transport.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentTelemetry;

impl FulfillmentTelemetry {
    pub fn new() -> Self {
        Self
    }

    pub fn log_quotes_received(&self, event: CourierQuotesReceivedEvent) {
        self.publish("courier_quotes_received", &event);
    }

    pub fn log_manifest_generated(&self, event: ManifestGeneratedEvent) {
        self.publish("manifest_generated", &event);
    }

    pub fn log_label_generated(&self, event: LabelGeneratedEvent) {
        self.publish("label_generated", &event);
    }

    pub fn log_fulfillment_completed(&self, event: FulfillmentCompletedEvent) {
        self.publish("fulfillment_completed", &event);
    }

    fn publish<T: serde::Serialize>(&self, event_type: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => tracing::info!(event = event_type, payload = %json, "fulfillment event"),
            Err(e) => tracing::error!(event = event_type, "failed to serialize event: {}", e),
        }
    }
}
