//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 收集指标。
//! 只安装记录器，不启动 HTTP 服务器；快照通过 handle 渲染。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 安装 Prometheus 记录器并注册指标描述
pub fn init(service_name: &str) -> Result<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    Ok(handle)
}

/// 注册过滤引擎的指标描述
///
/// 这些描述会出现在渲染结果的 HELP 注释中。
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "filter_evaluations_total",
        "Total number of filter evaluations by outcome"
    );
    metrics::describe_counter!(
        "filter_evaluation_errors_total",
        "Total number of failed filter evaluations by error code"
    );
    metrics::describe_histogram!(
        "filter_evaluation_duration_seconds",
        "Traced filter evaluation duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}
