pub mod aggregate;
pub mod approvals;
pub mod domain;
pub mod filter;
mod normalize;
pub mod service;
pub mod sources;

pub use domain::{ApprovalRecord, Review, ReviewSource, Totals};
pub use filter::ReviewQuery;
pub use normalize::{normalize, slugify};
pub use service::{ReviewService, ReviewsPayload};
