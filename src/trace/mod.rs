//! 输入 trace 模块
//!
//! 此模块包含 trace 规格的（反）序列化与按时序出队的到达流。

// 子模块声明
mod source;
mod spec;

// 重新导出公共接口
pub use source::{Arrival, TrafficSource};
pub use spec::{SenderTrace, TraceMesg, TraceSpec};
