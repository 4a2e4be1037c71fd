pub mod cache;
pub mod compare;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod period;
pub mod pipeline;
pub mod report;
pub mod source;

pub use error::{PeriodParseError, SchemaError};
pub use filter::FilterSet;
pub use models::{CampaignRecord, Kpi, KpiComparison, RawTable};
pub use period::{DateWindow, PeriodPreset, PeriodSelection};
pub use pipeline::{build_view, DashboardView, ViewRequest};
