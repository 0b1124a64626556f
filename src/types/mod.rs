pub mod job;
pub mod response;

pub use job::{Country, Job, Readiness};
pub use response::ResumeOptimizationResponse;
