//! 查找指标
//!
//! 基于 metrics 门面记录，由宿主应用安装具体的 recorder。

use std::time::Duration;

pub const LOOKUPS_TOTAL: &str = "rule_matcher_lookups_total";
pub const LOOKUP_DURATION_SECONDS: &str = "rule_matcher_lookup_duration_seconds";
pub const MATCHED_RULES: &str = "rule_matcher_matched_rules";

/// 注册指标描述
pub fn describe() {
    metrics::describe_counter!(LOOKUPS_TOTAL, "Total number of rule lookups");
    metrics::describe_histogram!(
        LOOKUP_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Rule lookup duration in seconds"
    );
    metrics::describe_histogram!(MATCHED_RULES, "Number of rules matched per lookup");
}

/// 记录一次查找
#[inline]
pub fn record_lookup(status: &'static str, matched_rules: usize, duration: Duration) {
    metrics::counter!(LOOKUPS_TOTAL, "status" => status).increment(1);
    metrics::histogram!(LOOKUP_DURATION_SECONDS, "status" => status).record(duration.as_secs_f64());

    if status == "ok" {
        metrics::histogram!(MATCHED_RULES).record(matched_rules as f64);
    }
}
