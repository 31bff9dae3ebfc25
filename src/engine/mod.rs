//! Pure computation engine(s) for deterministic ledger logic.

pub mod ledger;
pub mod replay;
pub mod summary;

pub use ledger::{
    apply_buy, apply_sell, preview_sale, remove_position, Applied, LedgerError, Positions,
    SalePreview,
};
pub use replay::rebuild_positions;
pub use summary::{summarize, LedgerSummary};
