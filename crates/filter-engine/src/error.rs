//! 过滤引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("键不存在: {0}")]
    KeyNotFound(String),

    #[error("除数为零")]
    DivisionByZero,

    #[error("不支持的操作: {0}")]
    UnsupportedOperation(String),

    #[error("整数运算溢出: {op}")]
    ArithmeticOverflow { op: String },

    #[error("过滤器未找到: {0}")]
    FilterNotFound(String),

    #[error("无效的过滤器定义: {0}")]
    InvalidDefinition(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::KeyNotFound(_) => "KEY_NOT_FOUND",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Self::ArithmeticOverflow { .. } => "ARITHMETIC_OVERFLOW",
            Self::FilterNotFound(_) => "FILTER_NOT_FOUND",
            Self::InvalidDefinition(_) => "INVALID_DEFINITION",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}
