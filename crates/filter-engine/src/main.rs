//! 过滤条件求值命令行工具
//!
//! 编译一个 JSON 过滤条件，并在一个或多个 JSON 记录文件上求值。

use anyhow::{Context, Result};
use clap::Parser;
use filter_engine::{FilterCompiler, FilterExecutor, Predicate, record_from_json};
use filter_shared::config::AppConfig;
use filter_shared::observability;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, warn};

const SERVICE_NAME: &str = "filter-eval";

/// Evaluate a compiled filter condition against JSON records.
#[derive(Parser)]
#[command(name = "filter-eval", version, about = "Evaluate a filter condition against records")]
struct Cli {
    /// Path to the condition JSON file
    #[arg(long)]
    condition: PathBuf,

    /// Paths to record JSON files (objects of name -> scalar value)
    #[arg(required = true)]
    records: Vec<PathBuf>,

    /// Print the per-sub-expression evaluation trace
    #[arg(long)]
    trace: bool,

    /// Print a Prometheus metrics snapshot after evaluation
    #[arg(long)]
    print_metrics: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 统一加载配置：config/default.toml、config/{env}.toml、config/filter-eval.toml 和 FILTER_ 环境变量
    let mut config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    if cli.print_metrics {
        config.observability.metrics_enabled = true;
    }

    let guard = observability::init(&config.service_name, &config.observability)?;

    let predicate = load_predicate(&cli.condition)?;
    info!(
        condition = %cli.condition.display(),
        sub_expressions = predicate.condition().len(),
        required_keys = predicate.required_keys().len(),
        "Condition compiled"
    );

    let executor = if cli.trace || config.evaluation.trace_enabled {
        FilterExecutor::new().with_trace()
    } else {
        FilterExecutor::new()
    };

    let mut failures = 0usize;
    for path in &cli.records {
        if !evaluate_record(&executor, &predicate, path) {
            failures += 1;
        }
    }

    if cli.print_metrics {
        if let Some(rendered) = guard.render_metrics() {
            println!("{}", rendered);
        }
    }

    info!(records = cli.records.len(), failures, "Evaluation complete");

    if failures > 0 {
        drop(guard);
        process::exit(1);
    }
    Ok(())
}

/// 读取并编译条件文件
fn load_predicate(path: &Path) -> Result<Predicate> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read condition file {}", path.display()))?;
    FilterCompiler::compile_from_json(&json)
        .with_context(|| format!("failed to parse condition file {}", path.display()))
}

/// 在单个记录文件上求值并打印结果，返回是否成功
fn evaluate_record(executor: &FilterExecutor, predicate: &Predicate, path: &Path) -> bool {
    let record = match std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record file {}", path.display()))
        .and_then(|json| record_from_json(&json).map_err(anyhow::Error::from))
    {
        Ok(record) => record,
        Err(e) => {
            warn!(record = %path.display(), error = %e, "Failed to load record");
            println!("{}: error {:#}", path.display(), e);
            return false;
        }
    };

    match executor.execute(predicate, &record) {
        Ok(result) => {
            println!("{}: {}", path.display(), result.matched);
            for line in &result.evaluation_trace {
                println!("  {}", line);
            }
            true
        }
        Err(e) => {
            println!("{}: error [{}] {}", path.display(), e.code(), e);
            false
        }
    }
}
