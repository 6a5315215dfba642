pub mod attribution;
pub mod decision;
pub mod file_metric;
pub mod metrics;
pub mod overview;
pub mod pull_request;
pub mod snapshot;
pub mod weights;
