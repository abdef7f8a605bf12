mod aggregate;
mod defect;
mod engine;

pub use aggregate::aggregate;
pub use aggregate::SeverityPolicy;
pub use defect::Defect;
pub use defect::Pass;
pub use engine::validate;
pub use engine::ValidateOptions;
