//! 共享库
//!
//! 包含命令行与服务共用的配置加载和日志初始化代码。

pub mod config;
pub mod observability;
