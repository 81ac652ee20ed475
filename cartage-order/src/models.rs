use cartage_core::courier::CourierQuote;
use cartage_core::documents::{CustomerDetails, ManifestLine};
use cartage_shared::Redacted;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ranking::{rank, CandidateSet, RankBadge, Rankable};

/// Per-line fulfillment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemStatus {
    Pending,
    ManifestGenerated,
}

impl LineItemStatus {
    /// `ManifestGenerated` is terminal: the line's supplier/courier choice is
    /// frozen once its manifest exists.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LineItemStatus::ManifestGenerated)
    }
}

/// One purchase order as loaded from the order endpoint. Immutable after
/// load; status lives on the line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub name: String,
    pub placed_on: NaiveDate,
    pub description: String,
    pub total_cents: i64,
    pub customer_postal_code: String,
}

/// The customer every manifest for this order ships to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Redacted<String>,
    pub phone: Redacted<String>,
    pub postal_code: String,
    pub address: String,
}

impl Customer {
    /// Wire-shape block for document requests.
    pub fn details(&self) -> CustomerDetails {
        CustomerDetails {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            postal_code: self.postal_code.clone(),
            address: self.address.clone(),
        }
    }
}

/// A possible fulfillment source for one line item, supplied externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCandidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Origin postal code; courier freight is quoted from here.
    pub postal_code: String,
    pub weight_kg: f64,
    pub rating: f64,
    pub badge: Option<RankBadge>,
}

impl Rankable for SupplierCandidate {
    fn badge(&self) -> Option<&RankBadge> {
        self.badge.as_ref()
    }

    fn with_badge(mut self, badge: RankBadge) -> Self {
        self.badge = Some(badge);
        self
    }
}

/// A possible carrier for one line item, valid for the chosen supplier's
/// origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierCandidate {
    pub id: String,
    pub name: String,
    pub estimated_delivery_days: u32,
    pub rating: f64,
    pub freight_charge: f64,
    pub badge: Option<RankBadge>,
}

impl From<CourierQuote> for CourierCandidate {
    fn from(quote: CourierQuote) -> Self {
        Self {
            id: quote.id,
            name: quote.name,
            estimated_delivery_days: quote.estimated_delivery_days,
            rating: quote.rating,
            freight_charge: quote.freight_charge,
            badge: None,
        }
    }
}

impl Rankable for CourierCandidate {
    fn badge(&self) -> Option<&RankBadge> {
        self.badge.as_ref()
    }

    fn with_badge(mut self, badge: RankBadge) -> Self {
        self.badge = Some(badge);
        self
    }
}

/// One orderable unit requiring its own supplier and courier selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub product: String,
    pub product_id: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price_cents: i32,
    pub status: LineItemStatus,
    pub supplier_id: Option<String>,
    pub courier_id: Option<String>,
    pub suppliers: Vec<SupplierCandidate>,
    /// Populated lazily once a supplier is chosen.
    #[serde(default)]
    pub available_couriers: Vec<CourierCandidate>,
}

impl LineItem {
    pub fn has_full_selection(&self) -> bool {
        self.supplier_id.is_some() && self.courier_id.is_some()
    }

    /// Row shape for document requests.
    pub fn manifest_line(&self) -> ManifestLine {
        ManifestLine {
            line_item_id: self.id.clone(),
            product: self.product.clone(),
            sku: self.sku.clone(),
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
        }
    }
}

/// One order, its line items, and the customer it ships to, owned
/// exclusively by the viewing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub order: Order,
    pub customer: Customer,
    pub line_items: Vec<LineItem>,
}

impl OrderAggregate {
    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }

    pub fn line_item_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|li| li.id == id)
    }

    /// Sum of quantities across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.line_items.iter().map(|li| li.quantity).sum()
    }

    /// Sum of quantity × unit price across all lines, in cents.
    pub fn total_amount_cents(&self) -> i64 {
        self.line_items
            .iter()
            .map(|li| li.quantity as i64 * li.unit_price_cents as i64)
            .sum()
    }

    /// True once every line has reached terminal status; callers use this to
    /// disable re-submission.
    pub fn all_generated(&self) -> bool {
        self.line_items.iter().all(|li| li.status.is_terminal())
    }

    /// Label positional rank onto any supplier list that has never been
    /// ranked before. Lists arriving pre-badged from a previous session pass
    /// through untouched.
    pub fn rank_suppliers(&mut self) {
        for item in &mut self.line_items {
            let set = CandidateSet::from_candidates(std::mem::take(&mut item.suppliers));
            item.suppliers = rank(set).into_inner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32, unit_price_cents: i32) -> LineItem {
        LineItem {
            id: id.to_string(),
            product: format!("Product {}", id),
            product_id: format!("P-{}", id),
            sku: format!("SKU-{}", id),
            quantity,
            unit_price_cents,
            status: LineItemStatus::Pending,
            supplier_id: None,
            courier_id: None,
            suppliers: Vec::new(),
            available_couriers: Vec::new(),
        }
    }

    fn aggregate(line_items: Vec<LineItem>) -> OrderAggregate {
        OrderAggregate {
            order: Order {
                id: "ORD-1".to_string(),
                name: "1042".to_string(),
                placed_on: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
                description: "Autumn restock".to_string(),
                total_cents: 0,
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
            line_items,
        }
    }

    #[test]
    fn test_aggregate_totals() {
        let agg = aggregate(vec![line("L1", 2, 1500), line("L2", 3, 200)]);

        assert_eq!(agg.total_quantity(), 5);
        assert_eq!(agg.total_amount_cents(), 2 * 1500 + 3 * 200);
    }

    #[test]
    fn test_all_generated_requires_every_line() {
        let mut agg = aggregate(vec![line("L1", 1, 100), line("L2", 1, 100)]);
        assert!(!agg.all_generated());

        agg.line_items[0].status = LineItemStatus::ManifestGenerated;
        assert!(!agg.all_generated());

        agg.line_items[1].status = LineItemStatus::ManifestGenerated;
        assert!(agg.all_generated());
    }

    #[test]
    fn test_rank_suppliers_labels_each_line_once() {
        let supplier = |id: &str| SupplierCandidate {
            id: id.to_string(),
            name: format!("Supplier {}", id),
            address: "1 Depot Rd".to_string(),
            phone: "555-0100".to_string(),
            postal_code: "560001".to_string(),
            weight_kg: 1.0,
            rating: 4.0,
            badge: None,
        };

        let mut item = line("L1", 1, 100);
        item.suppliers = vec![supplier("S1"), supplier("S2")];
        let mut agg = aggregate(vec![item]);

        agg.rank_suppliers();
        let labels: Vec<String> = agg.line_items[0]
            .suppliers
            .iter()
            .map(|s| s.badge.as_ref().unwrap().label.clone())
            .collect();
        assert_eq!(labels, vec!["BEST", "2ND BEST"]);

        // Second pass is a no-op.
        agg.rank_suppliers();
        let relabeled: Vec<String> = agg.line_items[0]
            .suppliers
            .iter()
            .map(|s| s.badge.as_ref().unwrap().label.clone())
            .collect();
        assert_eq!(labels, relabeled);
    }
}
