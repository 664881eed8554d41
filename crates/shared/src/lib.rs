//! 共享库
//!
//! 规则匹配服务共用的配置加载与日志初始化。

pub mod config;
pub mod observability;
