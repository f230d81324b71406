mod activity;
mod annex;
mod bracket;
mod table_set;

pub use activity::{ActivityContext, ActivityKind, CnaeRule};
pub use annex::{Annex, ServiceAnnex};
pub use bracket::{Bracket, BracketTable};
pub use table_set::{IRRF_TABLE_KEY, TableSet};
