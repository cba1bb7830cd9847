//! 过滤执行器
//!
//! 与 `Predicate::evaluate` 共用同一个折叠和结果计数（同样的错误、不短路），
//! 额外返回每个子表达式的结果和可选的评估追踪信息。

use crate::compiler::{Predicate, record_outcome};
use crate::error::Result;
use crate::resolver::KeyIndex;
use crate::value::Key;
use serde::Serialize;
use std::time::Instant;

/// 评估结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    /// 按顺序记录每个子表达式自身的结果（折叠前）
    pub sub_results: Vec<bool>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: i64,
}

impl EvaluationResult {
    fn new(capacity: usize) -> Self {
        Self {
            matched: true,
            sub_results: Vec::with_capacity(capacity),
            evaluation_trace: Vec::new(),
            evaluation_time_us: 0,
        }
    }
}

/// 过滤执行器
pub struct FilterExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl FilterExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行过滤评估
    ///
    /// 耗时直方图和结果计数在成功和失败时都会记录。
    pub fn execute(&self, predicate: &Predicate, record: &[Key]) -> Result<EvaluationResult> {
        let start = Instant::now();

        let index = KeyIndex::build(record);
        let condition = predicate.condition();
        let mut result = EvaluationResult::new(condition.len());

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "开始评估 {} 个子表达式 (记录包含 {} 个键)",
                condition.len(),
                index.len()
            ));
        }

        let outcome = predicate.fold(&index, |step| {
            result.sub_results.push(step.sub_result);

            if self.trace_enabled {
                result.evaluation_trace.push(format!(
                    "[{}] {} {} => {} (累积 {} -> {})",
                    step.position,
                    step.sub.logical_op,
                    step.sub.expr,
                    if step.sub_result { "MATCHED" } else { "NOT_MATCHED" },
                    step.before,
                    step.accumulator
                ));
            }
        });

        let elapsed = start.elapsed();
        metrics::histogram!("filter_evaluation_duration_seconds").record(elapsed.as_secs_f64());
        record_outcome(&outcome);

        result.matched = outcome?;
        result.evaluation_time_us = elapsed.as_micros() as i64;

        Ok(result)
    }
}

impl Default for FilterExecutor {
    fn default() -> Self {
        Self::new()
    }
}
