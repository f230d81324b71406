pub mod loader;
pub mod sources;

pub use loader::{TableBracketRecord, TableFormat, TableLoadError, TableLoader};
pub use sources::{FileSource, UrlSource};
