//! 消息模块
//!
//! 此模块包含消息标识、帧列车与消息状态机。

// 子模块声明
mod id;
mod message;
mod train;

// 重新导出公共接口
pub use id::MsgId;
pub use message::Message;
pub use train::PacketTrain;
