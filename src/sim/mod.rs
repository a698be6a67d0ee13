//! 仿真核心模块
//!
//! 此模块包含离线回放仿真的基础组件，目前只有仿真时钟类型。

// 子模块声明
mod time;

// 重新导出公共接口
pub use time::SimTime;
