//! 比较求值器
//!
//! 两个操作数必须是同一变体，比较时不做任何数值提升（与算术不同）。
//! 整数、浮点、文本支持全部六个操作符；布尔只支持相等和不等。
//!
//! 浮点按 IEEE 754 比较：涉及 NaN 的比较除 `NOT_EQUAL` 外均为 false。

use crate::error::{FilterError, Result};
use crate::operators::ComparisonOperator;
use crate::value::Value;

/// 比较求值器
pub struct ComparisonEvaluator;

impl ComparisonEvaluator {
    /// 计算 `left op right`
    pub fn apply(left: &Value, op: ComparisonOperator, right: &Value) -> Result<bool> {
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => Ok(Self::ordered(l, op, r)),
            (Value::Float(l), Value::Float(r)) => Ok(Self::ordered(l, op, r)),
            (Value::Text(l), Value::Text(r)) => Ok(Self::ordered(l.as_bytes(), op, r.as_bytes())),
            (Value::Boolean(l), Value::Boolean(r)) => Self::boolean(*l, op, *r),
            _ => Err(FilterError::TypeMismatch {
                expected: left.type_name().to_string(),
                actual: right.type_name().to_string(),
            }),
        }
    }

    /// 基于 PartialOrd 的比较，浮点的 NaN 语义由标准库运算符保证
    fn ordered<T: PartialOrd + ?Sized>(l: &T, op: ComparisonOperator, r: &T) -> bool {
        match op {
            ComparisonOperator::Equal => l == r,
            ComparisonOperator::NotEqual => l != r,
            ComparisonOperator::GreaterThan => l > r,
            ComparisonOperator::LessThan => l < r,
            ComparisonOperator::GreaterEqual => l >= r,
            ComparisonOperator::LessEqual => l <= r,
        }
    }

    fn boolean(l: bool, op: ComparisonOperator, r: bool) -> Result<bool> {
        match op {
            ComparisonOperator::Equal => Ok(l == r),
            ComparisonOperator::NotEqual => Ok(l != r),
            _ => Err(FilterError::UnsupportedOperation(format!(
                "布尔值不支持比较操作符 {}",
                op
            ))),
        }
    }
}
