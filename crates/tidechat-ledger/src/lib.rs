pub mod error;
pub mod file;
pub mod ledger;
pub mod memory;
pub mod model;

pub use error::LedgerError;
pub use file::FileLedger;
pub use ledger::ConversationLedger;
pub use memory::MemoryLedger;
pub use model::{ConversationSummary, ConversationTurn};
