//! 过滤操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 算术操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        };
        write!(f, "{}", s)
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterEqual,
        Self::LessEqual,
    ];

    /// 是否为顺序比较（布尔值不支持）
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
        };
        write!(f, "{}", s)
    }
}

/// 逻辑操作符
///
/// 描述当前子表达式如何与之前所有子表达式的累积结果合并。
/// `Not` 可以出现在条件中，但求值时会被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
    Not,
    #[default]
    None,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
            Self::None => write!(f, "NONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_serde_names() {
        assert_eq!(
            serde_json::to_string(&ComparisonOperator::GreaterEqual).unwrap(),
            "\"GREATER_EQUAL\""
        );
        assert_eq!(
            serde_json::to_string(&ArithmeticOperator::Divide).unwrap(),
            "\"DIVIDE\""
        );
        assert_eq!(
            serde_json::from_str::<LogicalOperator>("\"NONE\"").unwrap(),
            LogicalOperator::None
        );
    }

    #[test]
    fn test_is_ordering() {
        assert!(!ComparisonOperator::Equal.is_ordering());
        assert!(!ComparisonOperator::NotEqual.is_ordering());
        assert!(ComparisonOperator::LessEqual.is_ordering());
    }

    #[test]
    fn test_default_logical_operator() {
        assert_eq!(LogicalOperator::default(), LogicalOperator::None);
    }
}
