pub mod frame_pool;
pub mod ledger;
pub mod recorder;
pub mod stats;

pub use frame_pool::FramePool;
pub use ledger::Ledger;
pub use recorder::{record, RunParams};
pub use stats::RunningStats;
