mod source;
mod table_store;

pub use source::{SourceError, TableSource};
pub use table_store::{DEFAULT_TABLE_SET, TableMeta, TableStore};
