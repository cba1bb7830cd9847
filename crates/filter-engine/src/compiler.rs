//! 条件编译器
//!
//! 把过滤条件编译成不可变、可复用的谓词。编译不检查任何记录，
//! 键是否存在、类型是否匹配都只能在求值时发现，因此编译永不失败。

use crate::arithmetic::ArithmeticEvaluator;
use crate::comparison::ComparisonEvaluator;
use crate::error::{FilterError, Result};
use crate::models::{Condition, Expression, SubExpression};
use crate::operators::LogicalOperator;
use crate::resolver::KeyIndex;
use crate::value::Key;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// 编译后的谓词
///
/// 持有条件的不可变副本，克隆只增加引用计数。每次求值只使用调用内的局部状态，
/// 因此同一个谓词可以在多个线程上并发求值。
#[derive(Debug, Clone)]
pub struct Predicate {
    condition: Arc<Condition>,
    /// 条件中引用的所有键名
    required_keys: Arc<HashSet<String>>,
}

impl Predicate {
    /// 在记录上求值
    pub fn evaluate(&self, record: &[Key]) -> Result<bool> {
        let index = KeyIndex::build(record);
        self.evaluate_with_index(&index)
    }

    /// 使用调用方预先构建的索引求值，适合同一条记录匹配多个谓词
    pub fn evaluate_with_index(&self, index: &KeyIndex<'_>) -> Result<bool> {
        let outcome = self.fold(index, |_| {});
        record_outcome(&outcome);
        outcome
    }

    /// 从左到右折叠所有子表达式，每完成一步调用一次 `observe`
    ///
    /// 任何子表达式出错都会立即中止，后续子表达式不再求值。
    pub(crate) fn fold<F>(&self, index: &KeyIndex<'_>, mut observe: F) -> Result<bool>
    where
        F: FnMut(&FoldStep<'_>),
    {
        let mut accumulator = true;

        for (position, sub) in self.condition.iter().enumerate() {
            let sub_result = evaluate_expression(&sub.expr, index)?;
            let before = accumulator;
            accumulator = combine(accumulator, sub.logical_op, sub_result)?;
            trace!(
                position,
                expr = %sub.expr,
                logical_op = %sub.logical_op,
                sub_result,
                accumulator,
                "sub-expression evaluated"
            );
            observe(&FoldStep {
                position,
                sub,
                sub_result,
                before,
                accumulator,
            });
        }

        Ok(accumulator)
    }

    /// 获取条件
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// 条件引用的所有键名
    pub fn required_keys(&self) -> &HashSet<String> {
        &self.required_keys
    }
}

/// 折叠中的一步
pub(crate) struct FoldStep<'a> {
    pub position: usize,
    pub sub: &'a SubExpression,
    pub sub_result: bool,
    /// 并入本步之前的累积值
    pub before: bool,
    pub accumulator: bool,
}

/// 记录一次求值的结果计数
pub(crate) fn record_outcome(outcome: &Result<bool>) {
    match outcome {
        Ok(matched) => {
            let label = if *matched { "matched" } else { "not_matched" };
            metrics::counter!("filter_evaluations_total", "outcome" => label).increment(1);
        }
        Err(e) => {
            debug!(error = %e, code = e.code(), "filter evaluation failed");
            metrics::counter!("filter_evaluations_total", "outcome" => "error").increment(1);
            metrics::counter!("filter_evaluation_errors_total", "code" => e.code()).increment(1);
        }
    }
}

/// 求值单个表达式
fn evaluate_expression(expr: &Expression, index: &KeyIndex<'_>) -> Result<bool> {
    match expr {
        Expression::Unary(e) => {
            let value = index.resolve(&e.key)?;
            ComparisonEvaluator::apply(value, e.op, &e.value)
        }
        Expression::Binary(e) => {
            let left = index.resolve(&e.left_key)?;
            let right = index.resolve(&e.right_key)?;
            let arith = ArithmeticEvaluator::apply(left, e.arith_op, right)?;
            ComparisonEvaluator::apply(&arith, e.comp_op, &e.value)
        }
    }
}

/// 把子表达式结果并入累积值
///
/// NONE 直接覆盖累积值，即使它不在第一个位置。
fn combine(accumulator: bool, op: LogicalOperator, sub_result: bool) -> Result<bool> {
    match op {
        LogicalOperator::None => Ok(sub_result),
        LogicalOperator::And => Ok(accumulator && sub_result),
        LogicalOperator::Or => Ok(accumulator || sub_result),
        LogicalOperator::Not => Err(FilterError::UnsupportedOperation(format!(
            "不支持的逻辑操作: {}",
            op
        ))),
    }
}

/// 条件编译器
pub struct FilterCompiler;

impl FilterCompiler {
    /// 编译条件
    pub fn compile(condition: Condition) -> Predicate {
        let required_keys = Self::extract_keys(&condition);

        Predicate {
            condition: Arc::new(condition),
            required_keys: Arc::new(required_keys),
        }
    }

    /// 从 JSON 字符串编译条件，只会因 JSON 格式错误失败
    pub fn compile_from_json(json: &str) -> Result<Predicate> {
        let condition: Condition = serde_json::from_str(json)?;
        Ok(Self::compile(condition))
    }

    /// 提取条件中引用的所有键名
    fn extract_keys(condition: &Condition) -> HashSet<String> {
        condition
            .iter()
            .flat_map(|sub| sub.expr.keys())
            .map(str::to_string)
            .collect()
    }
}

/// 编译条件，等同于 [`FilterCompiler::compile`]
pub fn compile(condition: Condition) -> Predicate {
    FilterCompiler::compile(condition)
}
