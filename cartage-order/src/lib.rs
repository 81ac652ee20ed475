pub mod events;
pub mod grouping;
pub mod models;
pub mod orchestrator;
pub mod ranking;
pub mod selection;

pub use events::FulfillmentTelemetry;
pub use grouping::{group_for_manifest, GroupKey, ManifestGroup};
pub use models::{Customer, LineItem, LineItemStatus, Order, OrderAggregate};
pub use orchestrator::{FulfillmentOrchestrator, FulfillmentReport, OrchestrationError};
pub use ranking::{rank, CandidateSet, RankBadge};
pub use selection::{SelectionError, SelectionManager};
