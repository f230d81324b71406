pub mod calculations;
pub mod models;
pub mod store;

pub use calculations::CalculationError;
pub use models::*;
pub use store::{SourceError, TableMeta, TableSource, TableStore};
