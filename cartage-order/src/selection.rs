use cartage_core::app_config::FulfillmentRules;
use cartage_core::courier::{CourierQuote, CourierQuoteClient};
use cartage_core::CoreError;
use cartage_shared::models::events::{unix_timestamp, CourierQuotesReceivedEvent};
use std::sync::Arc;

use crate::events::FulfillmentTelemetry;
use crate::models::{CourierCandidate, LineItem, LineItemStatus, OrderAggregate};
use crate::ranking::{rank, CandidateSet};

/// Applies selection events to an order aggregate and guards the terminal-
/// status invariant: a line whose manifest exists can never change its
/// supplier or courier again.
pub struct SelectionManager {
    quotes: Arc<dyn CourierQuoteClient>,
    rules: FulfillmentRules,
    telemetry: Option<FulfillmentTelemetry>,
}

impl SelectionManager {
    pub fn new(quotes: Arc<dyn CourierQuoteClient>, rules: FulfillmentRules) -> Self {
        Self {
            quotes,
            rules,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: FulfillmentTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Record a supplier choice and refresh the line's courier candidates.
    ///
    /// Freight depends on the supplier's origin postal code, so the previous
    /// courier choice for the line is cleared and quotes are fetched anew.
    /// If the quote service fails the supplier choice stands; the caller can
    /// retry the fetch by re-selecting.
    pub async fn choose_supplier(
        &self,
        aggregate: &mut OrderAggregate,
        item_id: &str,
        supplier_id: &str,
    ) -> Result<(), SelectionError> {
        let destination = aggregate.customer.postal_code.clone();

        let item = aggregate
            .line_item_mut(item_id)
            .ok_or_else(|| SelectionError::LineNotFound(item_id.to_string()))?;
        if item.status.is_terminal() {
            return Err(SelectionError::LineAlreadyFulfilled(item_id.to_string()));
        }

        // The quote request needs the candidate's origin and weight, so an
        // unknown supplier cannot get the lenient treatment resolution does.
        let supplier = item
            .suppliers
            .iter()
            .find(|s| s.id.trim() == supplier_id.trim())
            .ok_or_else(|| SelectionError::UnknownSupplier {
                line: item_id.to_string(),
                supplier: supplier_id.to_string(),
            })?;
        let origin = supplier.postal_code.clone();
        let weight_kg = supplier.weight_kg;

        item.supplier_id = Some(supplier_id.to_string());
        item.courier_id = None;

        let quotes = self
            .quotes
            .fetch_candidate_couriers(&origin, &destination, weight_kg, self.rules.cod)
            .await
            .map_err(|source| SelectionError::QuoteFetch {
                line: item_id.to_string(),
                source,
            })?;

        if let Some(ref telemetry) = self.telemetry {
            telemetry.log_quotes_received(CourierQuotesReceivedEvent {
                line_item_id: item_id.to_string(),
                supplier_id: supplier_id.to_string(),
                quote_count: quotes.len(),
                timestamp: unix_timestamp(),
            });
        }

        let candidates: Vec<CourierCandidate> =
            quotes.into_iter().map(CourierCandidate::from).collect();
        item.available_couriers = rank(CandidateSet::from_candidates(candidates)).into_inner();

        Ok(())
    }

    /// Record a courier choice for one line.
    pub fn choose_courier(
        &self,
        aggregate: &mut OrderAggregate,
        item_id: &str,
        courier_id: &str,
    ) -> Result<(), SelectionError> {
        let item = aggregate
            .line_item_mut(item_id)
            .ok_or_else(|| SelectionError::LineNotFound(item_id.to_string()))?;
        if item.status.is_terminal() {
            return Err(SelectionError::LineAlreadyFulfilled(item_id.to_string()));
        }

        item.courier_id = Some(courier_id.to_string());
        Ok(())
    }

    /// Gate callers run before invoking the orchestrator: at least one line
    /// must have both selections and not already be fulfilled.
    pub fn ensure_actionable(items: &[LineItem]) -> Result<(), SelectionError> {
        let actionable = items
            .iter()
            .any(|item| item.has_full_selection() && !item.status.is_terminal());

        if actionable {
            Ok(())
        } else {
            Err(SelectionError::NothingActionable)
        }
    }

    /// Caller-side write-back after a successful orchestration run: the only
    /// legal transition, `Pending` to `ManifestGenerated`.
    pub fn mark_generated(aggregate: &mut OrderAggregate, fulfilled_ids: &[String]) {
        for item in &mut aggregate.line_items {
            if item.status.is_terminal() {
                continue;
            }
            if fulfilled_ids.iter().any(|id| id == &item.id) {
                item.status = LineItemStatus::ManifestGenerated;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Line item not found: {0}")]
    LineNotFound(String),

    #[error("Line item already fulfilled: {0}")]
    LineAlreadyFulfilled(String),

    #[error("Supplier {supplier} is not a candidate for line item {line}")]
    UnknownSupplier { line: String, supplier: String },

    #[error("Courier quote fetch failed for line item {line}: {source}")]
    QuoteFetch {
        line: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No line item has both a supplier and a courier selected")]
    NothingActionable,
}

/// Canned quote source for tests and local development. Returns its quotes
/// verbatim, already ordered best-first the way the real service responds.
pub struct MockCourierQuoteClient {
    quotes: Vec<CourierQuote>,
    fail: bool,
}

impl MockCourierQuoteClient {
    pub fn new(quotes: Vec<CourierQuote>) -> Self {
        Self {
            quotes,
            fail: false,
        }
    }

    /// A client whose every fetch fails, for exercising the error path.
    pub fn failing() -> Self {
        Self {
            quotes: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl CourierQuoteClient for MockCourierQuoteClient {
    async fn fetch_candidate_couriers(
        &self,
        _origin_postal_code: &str,
        _destination_postal_code: &str,
        _weight_kg: f64,
        _cod: bool,
    ) -> Result<Vec<CourierQuote>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail {
            return Err(Box::new(CoreError::RemoteError(
                "simulated quote service outage".to_string(),
            )));
        }

        Ok(self.quotes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Order, SupplierCandidate};
    use cartage_shared::Redacted;
    use chrono::NaiveDate;

    fn quote(id: &str, freight: f64) -> CourierQuote {
        CourierQuote {
            id: id.to_string(),
            name: format!("Courier {}", id),
            estimated_delivery_days: 2,
            rating: 4.4,
            freight_charge: freight,
        }
    }

    fn supplier(id: &str, postal_code: &str) -> SupplierCandidate {
        SupplierCandidate {
            id: id.to_string(),
            name: format!("Supplier {}", id),
            address: "1 Depot Rd".to_string(),
            phone: "555-0100".to_string(),
            postal_code: postal_code.to_string(),
            weight_kg: 2.0,
            rating: 4.5,
            badge: None,
        }
    }

    fn line(id: &str) -> LineItem {
        LineItem {
            id: id.to_string(),
            product: format!("Product {}", id),
            product_id: format!("P-{}", id),
            sku: format!("SKU-{}", id),
            quantity: 1,
            unit_price_cents: 2500,
            status: LineItemStatus::Pending,
            supplier_id: None,
            courier_id: None,
            suppliers: vec![supplier("S1", "560001"), supplier("S2", "400001")],
            available_couriers: Vec::new(),
        }
    }

    fn aggregate() -> OrderAggregate {
        OrderAggregate {
            order: Order {
                id: "ORD-1".to_string(),
                name: "1042".to_string(),
                placed_on: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
                description: "Autumn restock".to_string(),
                total_cents: 2500,
                customer_postal_code: "110001".to_string(),
            },
            customer: Customer {
                id: "CUS-1".to_string(),
                name: "Jane Doe".to_string(),
                email: Redacted::new("jane@example.com".to_string()),
                phone: Redacted::new("555-0199".to_string()),
                postal_code: "110001".to_string(),
                address: "7 Elm St".to_string(),
            },
            line_items: vec![line("L1")],
        }
    }

    #[tokio::test]
    async fn test_choose_supplier_populates_ranked_couriers() {
        let quotes = Arc::new(MockCourierQuoteClient::new(vec![
            quote("C1", 80.0),
            quote("C2", 95.0),
            quote("C3", 120.0),
        ]));
        let manager = SelectionManager::new(quotes, FulfillmentRules::default());
        let mut agg = aggregate();

        manager.choose_supplier(&mut agg, "L1", "S1").await.unwrap();

        let item = agg.line_item("L1").unwrap();
        assert_eq!(item.supplier_id.as_deref(), Some("S1"));

        let labels: Vec<&str> = item
            .available_couriers
            .iter()
            .map(|c| c.badge.as_ref().unwrap().label.as_str())
            .collect();
        assert_eq!(labels, vec!["BEST", "2ND BEST", "3RD BEST"]);
        // Quote order is preserved, not re-sorted.
        assert_eq!(item.available_couriers[0].id, "C1");
    }

    #[tokio::test]
    async fn test_choose_supplier_clears_stale_courier_choice() {
        let quotes = Arc::new(MockCourierQuoteClient::new(vec![quote("C1", 80.0)]));
        let manager = SelectionManager::new(quotes, FulfillmentRules::default());
        let mut agg = aggregate();

        manager.choose_supplier(&mut agg, "L1", "S1").await.unwrap();
        manager.choose_courier(&mut agg, "L1", "C1").unwrap();

        // A different origin invalidates the courier choice.
        manager.choose_supplier(&mut agg, "L1", "S2").await.unwrap();
        assert_eq!(agg.line_item("L1").unwrap().courier_id, None);
    }

    #[tokio::test]
    async fn test_terminal_line_rejects_selection() {
        let quotes = Arc::new(MockCourierQuoteClient::new(vec![quote("C1", 80.0)]));
        let manager = SelectionManager::new(quotes, FulfillmentRules::default());
        let mut agg = aggregate();
        agg.line_items[0].status = LineItemStatus::ManifestGenerated;

        let err = manager
            .choose_supplier(&mut agg, "L1", "S1")
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::LineAlreadyFulfilled(_)));
        assert_eq!(agg.line_item("L1").unwrap().supplier_id, None);

        let err = manager.choose_courier(&mut agg, "L1", "C1").unwrap_err();
        assert!(matches!(err, SelectionError::LineAlreadyFulfilled(_)));
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_an_error() {
        let quotes = Arc::new(MockCourierQuoteClient::new(vec![quote("C1", 80.0)]));
        let manager = SelectionManager::new(quotes, FulfillmentRules::default());
        let mut agg = aggregate();

        let err = manager
            .choose_supplier(&mut agg, "L1", "S-MISSING")
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::UnknownSupplier { .. }));
        assert_eq!(agg.line_item("L1").unwrap().supplier_id, None);
    }

    #[tokio::test]
    async fn test_quote_failure_keeps_supplier_choice() {
        let manager = SelectionManager::new(
            Arc::new(MockCourierQuoteClient::failing()),
            FulfillmentRules::default(),
        );
        let mut agg = aggregate();

        let err = manager
            .choose_supplier(&mut agg, "L1", "S1")
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::QuoteFetch { .. }));

        let item = agg.line_item("L1").unwrap();
        assert_eq!(item.supplier_id.as_deref(), Some("S1"));
        assert_eq!(item.courier_id, None);
    }

    #[test]
    fn test_ensure_actionable() {
        let mut complete = line("L1");
        complete.supplier_id = Some("S1".to_string());
        complete.courier_id = Some("C1".to_string());

        let incomplete = line("L2");

        assert!(SelectionManager::ensure_actionable(&[complete.clone(), incomplete.clone()]).is_ok());
        assert!(matches!(
            SelectionManager::ensure_actionable(&[incomplete]),
            Err(SelectionError::NothingActionable)
        ));

        // A complete but terminal line is not actionable.
        complete.status = LineItemStatus::ManifestGenerated;
        assert!(matches!(
            SelectionManager::ensure_actionable(&[complete]),
            Err(SelectionError::NothingActionable)
        ));
    }

    #[test]
    fn test_mark_generated_touches_only_listed_pending_lines() {
        let mut agg = aggregate();
        agg.line_items.push(line("L2"));
        agg.line_items.push(line("L3"));

        SelectionManager::mark_generated(
            &mut agg,
            &["L1".to_string(), "L3".to_string()],
        );

        assert_eq!(
            agg.line_item("L1").unwrap().status,
            LineItemStatus::ManifestGenerated
        );
        assert_eq!(agg.line_item("L2").unwrap().status, LineItemStatus::Pending);
        assert_eq!(
            agg.line_item("L3").unwrap().status,
            LineItemStatus::ManifestGenerated
        );
    }
}
