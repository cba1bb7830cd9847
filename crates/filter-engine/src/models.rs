//! 过滤条件领域模型

use crate::operators::{ArithmeticOperator, ComparisonOperator, LogicalOperator};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一元表达式：单个键与字面量比较
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub op: ComparisonOperator,
    pub key: String,
    pub value: Value,
}

impl UnaryExpression {
    pub fn new(key: impl Into<String>, op: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self {
            op,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 二元表达式：对两个键做算术运算，再把结果与字面量比较
///
/// `left_key` 和 `right_key` 总是按键名在记录中解析，没有内联常量形式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub left_key: String,
    pub arith_op: ArithmeticOperator,
    pub right_key: String,
    pub comp_op: ComparisonOperator,
    pub value: Value,
}

impl BinaryExpression {
    pub fn new(
        left_key: impl Into<String>,
        arith_op: ArithmeticOperator,
        right_key: impl Into<String>,
        comp_op: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            left_key: left_key.into(),
            arith_op,
            right_key: right_key.into(),
            comp_op,
            value: value.into(),
        }
    }
}

/// 表达式（一元或二元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Unary(UnaryExpression),
    Binary(BinaryExpression),
}

impl Expression {
    /// 表达式引用的键名
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Unary(expr) => vec![expr.key.as_str()],
            Self::Binary(expr) => vec![expr.left_key.as_str(), expr.right_key.as_str()],
        }
    }
}

impl From<UnaryExpression> for Expression {
    fn from(expr: UnaryExpression) -> Self {
        Self::Unary(expr)
    }
}

impl From<BinaryExpression> for Expression {
    fn from(expr: BinaryExpression) -> Self {
        Self::Binary(expr)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary(e) => write!(f, "{} {} {}", e.key, e.op, e.value),
            Self::Binary(e) => write!(
                f,
                "({} {} {}) {} {}",
                e.left_key, e.arith_op, e.right_key, e.comp_op, e.value
            ),
        }
    }
}

/// 子表达式：表达式加上把它并入累积结果的逻辑操作符
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubExpression {
    pub expr: Expression,
    #[serde(default)]
    pub logical_op: LogicalOperator,
}

impl SubExpression {
    pub fn new(expr: impl Into<Expression>, logical_op: LogicalOperator) -> Self {
        Self {
            expr: expr.into(),
            logical_op,
        }
    }

    /// 以 NONE 开始，用自身结果覆盖累积值
    pub fn first(expr: impl Into<Expression>) -> Self {
        Self::new(expr, LogicalOperator::None)
    }

    pub fn and(expr: impl Into<Expression>) -> Self {
        Self::new(expr, LogicalOperator::And)
    }

    pub fn or(expr: impl Into<Expression>) -> Self {
        Self::new(expr, LogicalOperator::Or)
    }
}

/// 过滤条件：有序的子表达式序列
///
/// 顺序有语义：从左到右依次折叠，没有优先级。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub sub_expressions: Vec<SubExpression>,
}

impl Condition {
    pub fn new(sub_expressions: Vec<SubExpression>) -> Self {
        Self { sub_expressions }
    }

    /// 追加一个子表达式
    pub fn with(mut self, sub_expression: SubExpression) -> Self {
        self.sub_expressions.push(sub_expression);
        self
    }

    pub fn len(&self) -> usize {
        self.sub_expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_expressions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubExpression> {
        self.sub_expressions.iter()
    }
}
