pub mod access;
pub mod engine;
pub mod enrichment;
pub mod numbering;

pub use engine::{ClaimsEngine, DEFAULT_STATUS, ROW_ID_FIELD};
