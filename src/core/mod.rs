pub mod aggregator;
pub mod candidate;
pub mod report;

pub use aggregator::Aggregator;
pub use candidate::{normalize, Admission, CandidateSet, Rejection};
pub use report::{ReportFormat, Reporter};
