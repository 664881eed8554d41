//! CLI 命令定义

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 规则匹配命令行工具
#[derive(Parser, Debug)]
#[command(name = "rule-matcher")]
#[command(version, about = "规则匹配引擎命令行工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 配置目录（默认读取 CONFIG_DIR 环境变量，否则为 config）
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// 规则定义文件，覆盖配置中的 engine.definition_path
    #[arg(short, long, global = true)]
    pub rules: Option<PathBuf>,

    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 编译规则定义并输出统计信息
    Check,

    /// 查找匹配规则的输出值
    ///
    /// 未指定 `--query` 时从标准输入逐行读取查询，每行输出一个 JSON 数组。
    Lookup {
        /// JSON 查询对象，例如 '{"cond": 2}'
        #[arg(short, long)]
        query: Option<String>,
    },

    /// 输出一次查找中每条规则的求值结果
    Explain {
        /// JSON 查询对象
        #[arg(short, long)]
        query: String,
    },
}
