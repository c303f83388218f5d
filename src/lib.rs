pub mod config;
pub mod fetch;
pub mod load;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod table;
pub mod transform;

pub use config::PipelineConfig;
pub use table::{BankRecord, BankTable};
