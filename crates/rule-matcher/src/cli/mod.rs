//! CLI 模块
//!
//! - `check` - 编译规则定义并输出统计信息
//! - `lookup` - 执行查找，查询来自参数或标准输入（每行一个 JSON 对象）
//! - `explain` - 执行查找并输出每条规则的求值结果
//!
//! # 使用示例
//!
//! ```bash
//! rule-matcher --rules rules.json check
//! rule-matcher --rules rules.json lookup --query '{"cond": 2}'
//! cat queries.jsonl | rule-matcher --rules rules.json lookup
//! rule-matcher --rules rules.json explain --query '{"cond": 2}'
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
