//! 调度模块
//!
//! 此模块包含 SRPT oracle 调度循环、接收端活跃期计账与运行产出。

// 子模块声明
mod ledger;
mod oracle;
mod record;

// 重新导出公共接口
pub use ledger::ReceiverLedger;
pub use oracle::OracleScheduler;
pub use record::{CompletionRecord, ReceiverSummary, SimReport};
