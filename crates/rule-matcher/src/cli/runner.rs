//! 命令执行器
//!
//! 输出值类型固定为任意 JSON 值，结果写入调用方提供的输出流。

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use rule_matcher::{ConditionSet, Engine};

pub struct CommandRunner {
    engine: Engine<serde_json::Value>,
}

impl CommandRunner {
    pub fn new(engine: Engine<serde_json::Value>) -> Self {
        Self { engine }
    }

    /// 执行 check 命令
    pub fn run_check(&self, out: &mut impl Write) -> Result<()> {
        let stats = self.engine.stats();
        let report = json!({
            "rules": stats.rules_count,
            "distinct_conditions": stats.distinct_conditions,
            "avg_conditions_per_rule": stats.avg_conditions_per_rule,
            "conditions": self.engine.condition_names(),
            "predicate": self.engine.predicate().to_string(),
            "quantifier": self.engine.quantifier().to_string(),
            "indexed": self.engine.is_indexed(),
        });

        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }

    /// 执行 lookup 命令
    ///
    /// 未提供查询时从 `input` 逐行读取，空行跳过。
    pub fn run_lookup(
        &self,
        query: Option<&str>,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        if let Some(query) = query {
            return self.lookup_one(query, out);
        }

        let mut count = 0usize;
        for (line_no, line) in input.lines().enumerate() {
            let line = line.context("读取标准输入失败")?;
            if line.trim().is_empty() {
                continue;
            }
            self.lookup_one(&line, out)
                .with_context(|| format!("第 {} 行查询失败", line_no + 1))?;
            count += 1;
        }

        info!(queries = count, "批量查找完成");
        Ok(())
    }

    /// 执行 explain 命令
    pub fn run_explain(&self, query: &str, out: &mut impl Write) -> Result<()> {
        let query = parse_query(query)?;
        let report = self.engine.explain(&query)?;

        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }

    fn lookup_one(&self, query: &str, out: &mut impl Write) -> Result<()> {
        let query = parse_query(query)?;
        let values = self.engine.lookup(&query)?;

        writeln!(out, "{}", serde_json::to_string(&values)?)?;
        Ok(())
    }
}

fn parse_query(query: &str) -> Result<ConditionSet> {
    let json: serde_json::Value = serde_json::from_str(query).context("查询不是合法的 JSON")?;
    Ok(ConditionSet::from_json(json)?)
}
