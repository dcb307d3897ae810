pub mod statistics;
pub mod transaction;

pub use statistics::{NetPosition, SecurityStatistics, SideTotals};
pub use transaction::{Transaction, TransactionDraft, TransactionType};
