//! 网络结构模块
//!
//! 此模块包含主机编址、拓扑参数与传输路径延迟模型。

// 子模块声明
mod addr;
mod delay;
mod topology;

// 重新导出公共接口
pub use addr::HostAddr;
pub use delay::{Delivery, HopClass, PathProfile, classify};
pub use topology::Topology;
