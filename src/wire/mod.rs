//! 线上帧计账
//!
//! 把逻辑消息字节映射为实际占用链路的帧序列。

// 子模块声明
mod framing;

// 重新导出公共接口
pub use framing::{FramedMessage, Framing, WirePacket};
