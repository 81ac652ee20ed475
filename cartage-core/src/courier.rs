use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One quote from the courier aggregation service.
///
/// Quotes arrive already ordered best-first. The service owns the
/// freight/delivery/rating comparison; this workspace never re-sorts them,
/// it only labels display positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierQuote {
    pub id: String,
    pub name: String,
    pub estimated_delivery_days: u32,
    pub rating: f64,
    pub freight_charge: f64,
}

#[async_trait]
pub trait CourierQuoteClient: Send + Sync {
    /// Fetch candidate couriers for one shipment leg, best first.
    ///
    /// Freight depends on the origin, so callers pass the chosen supplier's
    /// postal code, the customer's postal code, and the shipment weight.
    async fn fetch_candidate_couriers(
        &self,
        origin_postal_code: &str,
        destination_postal_code: &str,
        weight_kg: f64,
        cod: bool,
    ) -> Result<Vec<CourierQuote>, Box<dyn std::error::Error + Send + Sync>>;
}
