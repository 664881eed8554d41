//! 规则匹配命令行入口

mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use matcher_shared::config::AppConfig;
use matcher_shared::observability;
use rule_matcher::{RuleCompiler, telemetry};
use tracing::info;

use cli::{Cli, CommandRunner, Commands};

const SERVICE_NAME: &str = "rule-matcher";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config_dir {
        Some(dir) => AppConfig::load_from(dir, SERVICE_NAME),
        None => AppConfig::load(SERVICE_NAME),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    observability::init(&config.observability)?;
    telemetry::describe();

    let Some(path) = cli.rules.as_ref().or(config.engine.definition_path.as_ref()) else {
        bail!("未指定规则定义文件，请使用 --rules 或配置 engine.definition_path");
    };

    let engine = RuleCompiler::new()
        .with_index(config.engine.index_enabled)
        .compile_from_path(path)?;
    info!(path = %path.display(), rules = engine.len(), "规则定义已加载");

    let runner = CommandRunner::new(engine);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Check => runner.run_check(&mut out)?,
        Commands::Lookup { query } => {
            runner.run_lookup(query.as_deref(), std::io::stdin().lock(), &mut out)?
        }
        Commands::Explain { query } => runner.run_explain(&query, &mut out)?,
    }

    Ok(())
}
