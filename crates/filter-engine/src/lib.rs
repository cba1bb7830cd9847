//! 过滤条件引擎
//!
//! 将预先构建好的过滤条件编译成可复用的谓词，支持：
//! - 四种类型化的值（整数、浮点、文本、布尔）
//! - 一元比较与先算术后比较的二元子表达式
//! - 从左到右、无短路的逻辑折叠
//! - 带追踪的执行器与线程安全的谓词存储

pub mod arithmetic;
pub mod comparison;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod models;
pub mod operators;
pub mod resolver;
pub mod store;
pub mod value;

pub use arithmetic::ArithmeticEvaluator;
pub use comparison::ComparisonEvaluator;
pub use compiler::{FilterCompiler, Predicate, compile};
pub use error::{FilterError, Result};
pub use executor::{EvaluationResult, FilterExecutor};
pub use models::{BinaryExpression, Condition, Expression, SubExpression, UnaryExpression};
pub use operators::{ArithmeticOperator, ComparisonOperator, LogicalOperator};
pub use resolver::KeyIndex;
pub use store::{FilterDefinition, PredicateStore, PredicateStoreStats, StoredPredicate};
pub use value::{Key, Value, record_from_json};
