//! 谓词存储管理
//!
//! 使用 DashMap 提供线程安全的编译后谓词缓存，支持过滤器的加载、更新、删除，
//! 以及把一条记录同时路由到所有已加载的过滤器。存储只在内存中，不做持久化。

use crate::compiler::{FilterCompiler, Predicate};
use crate::error::{FilterError, Result};
use crate::models::Condition;
use crate::resolver::KeyIndex;
use crate::value::Key;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 过滤器定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDefinition {
    #[serde(default = "generate_id")]
    pub id: String,
    pub name: String,
    pub condition: Condition,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl FilterDefinition {
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            condition,
            created_at: Utc::now(),
        }
    }

    /// 指定 ID 创建
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, condition: Condition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
            created_at: Utc::now(),
        }
    }
}

/// 已加载的过滤器
#[derive(Debug, Clone)]
pub struct StoredPredicate {
    pub id: String,
    pub name: String,
    pub predicate: Predicate,
    pub loaded_at: DateTime<Utc>,
}

/// 谓词存储
#[derive(Clone, Default)]
pub struct PredicateStore {
    predicates: Arc<DashMap<String, StoredPredicate>>,
}

impl PredicateStore {
    /// 创建新的谓词存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前存储的过滤器数量
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// 加载过滤器
    #[instrument(skip(self, definition), fields(filter_id = %definition.id, filter_name = %definition.name))]
    pub fn load(&self, definition: FilterDefinition) -> Result<()> {
        let stored = Self::prepare(definition)?;
        let id = stored.id.clone();
        self.predicates.insert(id.clone(), stored);

        info!("过滤器已加载: {}", id);
        Ok(())
    }

    /// 加载过滤器（从 JSON 字符串），返回过滤器 ID
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<String> {
        let definition: FilterDefinition = serde_json::from_str(json)?;
        let id = definition.id.clone();
        self.load(definition)?;
        Ok(id)
    }

    /// 更新过滤器
    ///
    /// 存在性检查和替换在同一个分片锁内完成，并发删除不会被重新插入。
    #[instrument(skip(self, definition), fields(filter_id = %definition.id))]
    pub fn update(&self, definition: FilterDefinition) -> Result<()> {
        let stored = Self::prepare(definition)?;

        match self.predicates.get_mut(&stored.id) {
            Some(mut entry) => {
                info!("过滤器已更新: {}", stored.id);
                *entry = stored;
                Ok(())
            }
            None => {
                warn!("更新不存在的过滤器: {}", stored.id);
                Err(FilterError::FilterNotFound(stored.id))
            }
        }
    }

    /// 删除过滤器
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.predicates.remove(id).is_some() {
            info!("过滤器已删除: {}", id);
            Ok(())
        } else {
            warn!("删除不存在的过滤器: {}", id);
            Err(FilterError::FilterNotFound(id.to_string()))
        }
    }

    /// 获取过滤器
    pub fn get(&self, id: &str) -> Option<StoredPredicate> {
        self.predicates.get(id).map(|p| p.clone())
    }

    /// 检查过滤器是否存在
    pub fn contains(&self, id: &str) -> bool {
        self.predicates.contains_key(id)
    }

    /// 获取所有过滤器 ID（已排序）
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.predicates.iter().map(|p| p.key().clone()).collect();
        ids.sort();
        ids
    }

    /// 批量加载过滤器，返回成功加载的 ID
    #[instrument(skip(self, definitions))]
    pub fn load_batch(&self, definitions: Vec<FilterDefinition>) -> Vec<String> {
        let mut loaded_ids = Vec::with_capacity(definitions.len());
        let mut errors = Vec::new();

        for definition in definitions {
            let id = definition.id.clone();
            match self.load(definition) {
                Ok(()) => loaded_ids.push(id),
                Err(e) => errors.push((id, e)),
            }
        }

        if !errors.is_empty() {
            warn!("批量加载部分失败: {:?}", errors);
        }

        info!("批量加载完成: {} 成功, {} 失败", loaded_ids.len(), errors.len());
        loaded_ids
    }

    /// 清空所有过滤器
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let count = self.predicates.len();
        self.predicates.clear();
        info!("已清空 {} 个过滤器", count);
    }

    /// 在同一条记录上评估所有过滤器
    ///
    /// 记录索引只构建一次，由所有谓词共享。结果按过滤器 ID 排序。
    pub fn evaluate_all(&self, record: &[Key]) -> Vec<(String, Result<bool>)> {
        let index = KeyIndex::build(record);

        let mut outcomes: Vec<(String, Result<bool>)> = self
            .predicates
            .iter()
            .map(|p| (p.key().clone(), p.predicate.evaluate_with_index(&index)))
            .collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        outcomes
    }

    /// 返回匹配记录的过滤器 ID，求值失败的过滤器被跳过
    pub fn matching_ids(&self, record: &[Key]) -> Vec<String> {
        self.evaluate_all(record)
            .into_iter()
            .filter_map(|(id, outcome)| match outcome {
                Ok(true) => Some(id),
                Ok(false) => None,
                Err(e) => {
                    warn!(filter_id = %id, error = %e, code = e.code(), "过滤器求值失败，已跳过");
                    None
                }
            })
            .collect()
    }

    /// 获取存储统计信息
    pub fn stats(&self) -> PredicateStoreStats {
        let filters_count = self.predicates.len();
        let total_sub_expressions: usize = self
            .predicates
            .iter()
            .map(|p| p.predicate.condition().len())
            .sum();
        let total_keys: usize = self
            .predicates
            .iter()
            .map(|p| p.predicate.required_keys().len())
            .sum();

        PredicateStoreStats {
            filters_count,
            total_sub_expressions,
            total_keys,
            avg_keys_per_filter: if filters_count > 0 {
                total_keys as f64 / filters_count as f64
            } else {
                0.0
            },
        }
    }

    /// 校验并编译定义
    fn prepare(definition: FilterDefinition) -> Result<StoredPredicate> {
        Self::validate(&definition)?;

        let FilterDefinition {
            id, name, condition, ..
        } = definition;
        Ok(StoredPredicate {
            id,
            name,
            predicate: FilterCompiler::compile(condition),
            loaded_at: Utc::now(),
        })
    }

    fn validate(definition: &FilterDefinition) -> Result<()> {
        if definition.id.is_empty() {
            return Err(FilterError::InvalidDefinition(
                "过滤器 ID 不能为空".to_string(),
            ));
        }

        if definition.name.is_empty() {
            return Err(FilterError::InvalidDefinition(format!(
                "过滤器 '{}' 的名称不能为空",
                definition.id
            )));
        }

        Ok(())
    }
}

/// 谓词存储统计信息
#[derive(Debug, Clone)]
pub struct PredicateStoreStats {
    /// 过滤器总数
    pub filters_count: usize,
    /// 所有过滤器的子表达式总数
    pub total_sub_expressions: usize,
    /// 所有过滤器引用的键总数（每个过滤器内去重）
    pub total_keys: usize,
    /// 平均每个过滤器引用的键数
    pub avg_keys_per_filter: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubExpression, UnaryExpression};
    use crate::operators::ComparisonOperator;

    fn sample_definition(id: &str, name: &str) -> FilterDefinition {
        FilterDefinition::with_id(
            id,
            name,
            Condition::new(vec![
                SubExpression::first(UnaryExpression::new(
                    "tier",
                    ComparisonOperator::Equal,
                    "gold",
                )),
                SubExpression::and(UnaryExpression::new(
                    "amount",
                    ComparisonOperator::GreaterEqual,
                    500,
                )),
            ]),
        )
    }

    fn threshold_definition(id: &str, threshold: i64) -> FilterDefinition {
        FilterDefinition::with_id(
            id,
            format!("amount >= {}", threshold),
            Condition::new(vec![SubExpression::first(UnaryExpression::new(
                "amount",
                ComparisonOperator::GreaterEqual,
                threshold,
            ))]),
        )
    }

    fn sample_definition_json(id: &str, name: &str) -> String {
        format!(
            r#"
            {{
                "id": "{}",
                "name": "{}",
                "condition": {{
                    "sub_expressions": [
                        {{
                            "expr": {{"type": "unary", "op": "EQUAL", "key": "tier", "value": "gold"}},
                            "logical_op": "NONE"
                        }},
                        {{
                            "expr": {{"type": "unary", "op": "GREATER_EQUAL", "key": "amount", "value": 500}},
                            "logical_op": "AND"
                        }}
                    ]
                }}
            }}
            "#,
            id, name
        )
    }

    #[test]
    fn test_load_filter() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test")).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.contains("filter-001"));
    }

    #[test]
    fn test_load_from_json() {
        let store = PredicateStore::new();
        let id = store
            .load_from_json(&sample_definition_json("filter-001", "test"))
            .unwrap();

        assert_eq!(id, "filter-001");
        assert!(store.contains("filter-001"));
    }

    #[test]
    fn test_load_from_json_generates_id() {
        let store = PredicateStore::new();
        let id = store
            .load_from_json(r#"{"name": "all", "condition": {}}"#)
            .unwrap();

        assert!(!id.is_empty());
        assert!(store.contains(&id));
    }

    #[test]
    fn test_load_empty_id_rejected() {
        let store = PredicateStore::new();
        let result = store.load(sample_definition("", "test"));

        assert!(matches!(result, Err(FilterError::InvalidDefinition(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_empty_name_rejected() {
        let store = PredicateStore::new();
        let result = store.load(sample_definition("filter-001", ""));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("名称不能为空"));
    }

    #[test]
    fn test_get_filter() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test")).unwrap();

        let stored = store.get("filter-001").unwrap();
        assert_eq!(stored.id, "filter-001");
        assert_eq!(stored.name, "test");
        assert_eq!(stored.predicate.condition().len(), 2);
    }

    #[test]
    fn test_get_nonexistent_filter() {
        let store = PredicateStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_update_filter() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test")).unwrap();

        store.update(sample_definition("filter-001", "updated")).unwrap();

        assert_eq!(store.get("filter-001").unwrap().name, "updated");
    }

    #[test]
    fn test_update_nonexistent_filter() {
        let store = PredicateStore::new();
        let result = store.update(sample_definition("filter-001", "test"));

        assert!(matches!(result, Err(FilterError::FilterNotFound(_))));
    }

    #[test]
    fn test_update_never_resurrects_deleted_filter() {
        use std::thread;

        for round in 0..200 {
            let store = PredicateStore::new();
            store.load(threshold_definition("filter-001", 1)).unwrap();

            let deleter = store.clone();
            let handle = thread::spawn(move || deleter.delete("filter-001"));
            let updated = store.update(threshold_definition("filter-001", round));

            assert!(handle.join().unwrap().is_ok());
            // 无论谁先执行，删除之后都不应再存在
            assert!(!store.contains("filter-001"), "round {}: {:?}", round, updated);
        }
    }

    #[test]
    fn test_update_rejects_invalid_definition() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test")).unwrap();

        let result = store.update(sample_definition("filter-001", ""));

        assert!(matches!(result, Err(FilterError::InvalidDefinition(_))));
        assert_eq!(store.get("filter-001").unwrap().name, "test");
    }

    #[test]
    fn test_delete_filter() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test")).unwrap();

        store.delete("filter-001").unwrap();

        assert!(!store.contains("filter-001"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_nonexistent_filter() {
        let store = PredicateStore::new();
        assert!(store.delete("nonexistent").is_err());
    }

    #[test]
    fn test_list_ids_sorted() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-002", "b")).unwrap();
        store.load(sample_definition("filter-001", "a")).unwrap();

        assert_eq!(store.list_ids(), vec!["filter-001", "filter-002"]);
    }

    #[test]
    fn test_load_batch_partial_failure() {
        let store = PredicateStore::new();
        let loaded = store.load_batch(vec![
            sample_definition("filter-001", "test1"),
            sample_definition("", "invalid"),
            sample_definition("filter-003", "test3"),
        ]);

        assert_eq!(loaded, vec!["filter-001", "filter-003"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test1")).unwrap();
        store.load(sample_definition("filter-002", "test2")).unwrap();

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_matching_ids() {
        let store = PredicateStore::new();
        store.load(threshold_definition("over-100", 100)).unwrap();
        store.load(threshold_definition("over-500", 500)).unwrap();
        store.load(threshold_definition("over-1000", 1000)).unwrap();

        let record = vec![Key::new("amount", 600)];
        assert_eq!(store.matching_ids(&record), vec!["over-100", "over-500"]);
    }

    #[test]
    fn test_matching_ids_skips_failures() {
        let store = PredicateStore::new();
        store.load(threshold_definition("over-100", 100)).unwrap();
        store.load(sample_definition("gold", "gold tier")).unwrap();

        // 记录中没有 tier 键，gold 过滤器求值失败
        let record = vec![Key::new("amount", 600)];
        assert_eq!(store.matching_ids(&record), vec!["over-100"]);

        let outcomes = store.evaluate_all(&record);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, "gold");
        assert!(matches!(outcomes[0].1, Err(FilterError::KeyNotFound(_))));
        assert!(matches!(outcomes[1].1, Ok(true)));
    }

    #[test]
    fn test_stats() {
        let store = PredicateStore::new();
        store.load(sample_definition("filter-001", "test1")).unwrap();
        store.load(threshold_definition("filter-002", 10)).unwrap();

        let stats = store.stats();

        assert_eq!(stats.filters_count, 2);
        assert_eq!(stats.total_sub_expressions, 3);
        assert_eq!(stats.total_keys, 3);
        assert_eq!(stats.avg_keys_per_filter, 1.5);
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let store = PredicateStore::new();
        let store_clone = store.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                store_clone
                    .load(threshold_definition(&format!("filter-{}", i), i))
                    .unwrap();
            }
        });

        for i in 100..200 {
            store
                .load(threshold_definition(&format!("filter-{}", i), i))
                .unwrap();
        }

        handle.join().unwrap();

        assert_eq!(store.len(), 200);
    }
}
