//! 算术求值器
//!
//! 两个整数在 i64 域内计算，结果仍为整数；任一操作数为浮点时两边都提升为 f64。
//! 文本和布尔不参与算术，也不做任何字符串或布尔到数值的转换。

use crate::error::{FilterError, Result};
use crate::operators::ArithmeticOperator;
use crate::value::Value;

/// 算术求值器
pub struct ArithmeticEvaluator;

impl ArithmeticEvaluator {
    /// 计算 `left op right`
    pub fn apply(left: &Value, op: ArithmeticOperator, right: &Value) -> Result<Value> {
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => Self::integer(*l, op, *r).map(Value::Integer),
            (Value::Integer(l), Value::Float(r)) => Self::float(*l as f64, op, *r).map(Value::Float),
            (Value::Float(l), Value::Integer(r)) => Self::float(*l, op, *r as f64).map(Value::Float),
            (Value::Float(l), Value::Float(r)) => Self::float(*l, op, *r).map(Value::Float),
            _ => {
                let offending = if left.is_numeric() { right } else { left };
                Err(FilterError::TypeMismatch {
                    expected: "numeric".to_string(),
                    actual: offending.type_name().to_string(),
                })
            }
        }
    }

    /// 整数域运算，溢出返回 ArithmeticOverflow
    fn integer(l: i64, op: ArithmeticOperator, r: i64) -> Result<i64> {
        let result = match op {
            ArithmeticOperator::Add => l.checked_add(r),
            ArithmeticOperator::Subtract => l.checked_sub(r),
            ArithmeticOperator::Multiply => l.checked_mul(r),
            ArithmeticOperator::Divide => {
                if r == 0 {
                    return Err(FilterError::DivisionByZero);
                }
                // i64::MIN / -1 溢出
                l.checked_div(r)
            }
        };

        result.ok_or_else(|| FilterError::ArithmeticOverflow {
            op: format!("{} {} {}", l, op, r),
        })
    }

    /// 浮点域运算，除以 0.0 或 -0.0 返回 DivisionByZero 而不是无穷大
    fn float(l: f64, op: ArithmeticOperator, r: f64) -> Result<f64> {
        match op {
            ArithmeticOperator::Add => Ok(l + r),
            ArithmeticOperator::Subtract => Ok(l - r),
            ArithmeticOperator::Multiply => Ok(l * r),
            ArithmeticOperator::Divide => {
                if r == 0.0 {
                    Err(FilterError::DivisionByZero)
                } else {
                    Ok(l / r)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(left: impl Into<Value>, op: ArithmeticOperator, right: impl Into<Value>) -> Result<Value> {
        ArithmeticEvaluator::apply(&left.into(), op, &right.into())
    }

    #[test]
    fn test_integer_operations() {
        assert_eq!(apply(7, ArithmeticOperator::Add, 6).unwrap(), Value::Integer(13));
        assert_eq!(apply(7, ArithmeticOperator::Subtract, 6).unwrap(), Value::Integer(1));
        assert_eq!(apply(7, ArithmeticOperator::Multiply, 6).unwrap(), Value::Integer(42));
        assert_eq!(apply(7, ArithmeticOperator::Divide, 2).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_integer_division_truncates_toward_zero() {
        assert_eq!(apply(-7, ArithmeticOperator::Divide, 2).unwrap(), Value::Integer(-3));
    }

    #[test]
    fn test_mixed_promotes_to_float() {
        assert_eq!(apply(2.5, ArithmeticOperator::Add, 3).unwrap(), Value::Float(5.5));
        assert_eq!(apply(3, ArithmeticOperator::Multiply, 0.5).unwrap(), Value::Float(1.5));
        assert_eq!(apply(1, ArithmeticOperator::Divide, 4.0).unwrap(), Value::Float(0.25));
    }

    #[test]
    fn test_float_operations() {
        assert_eq!(apply(1.5, ArithmeticOperator::Subtract, 0.5).unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert!(matches!(
            apply(10, ArithmeticOperator::Divide, 0),
            Err(FilterError::DivisionByZero)
        ));
    }

    #[test]
    fn test_float_division_by_zero() {
        assert!(matches!(
            apply(10.0, ArithmeticOperator::Divide, 0.0),
            Err(FilterError::DivisionByZero)
        ));
        assert!(matches!(
            apply(10, ArithmeticOperator::Divide, -0.0),
            Err(FilterError::DivisionByZero)
        ));
        assert!(matches!(
            apply(1.5, ArithmeticOperator::Divide, 0),
            Err(FilterError::DivisionByZero)
        ));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            apply(i64::MAX, ArithmeticOperator::Add, 1),
            Err(FilterError::ArithmeticOverflow { .. })
        ));
        assert!(matches!(
            apply(i64::MIN, ArithmeticOperator::Divide, -1),
            Err(FilterError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_non_numeric_rejected() {
        for op in [
            ArithmeticOperator::Add,
            ArithmeticOperator::Subtract,
            ArithmeticOperator::Multiply,
            ArithmeticOperator::Divide,
        ] {
            assert!(matches!(
                apply("1", op, 1),
                Err(FilterError::TypeMismatch { .. })
            ));
            assert!(matches!(
                apply(1.0, op, true),
                Err(FilterError::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_type_mismatch_reports_offending_type() {
        match apply(1, ArithmeticOperator::Add, "x") {
            Err(FilterError::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, "numeric");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
