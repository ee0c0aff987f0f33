//! 事件流合并命令行
//!
//! 从标准输入逐行读取 JSON 记录，按规则定义文件分组后，
//! 每个输出元素以一行 JSON 写到标准输出。

use anyhow::{Context, Result};
use coalesce::{Grouper, GrouperDefinition, compile_grouper};
use coalesce_shared::config::AppConfig;
use coalesce_shared::observability;
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use tracing::{info, warn};

fn main() -> Result<()> {
    // 统一加载配置：从 config/{service_name}.toml 加载，包含可观测性配置
    let config = AppConfig::load("coalesce").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config)?;

    let grouper = load_grouper(&config)?;
    info!(
        rules = grouper.rules().len(),
        enabled = grouper.is_enabled(),
        "Grouper ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let emitted = run(&grouper, stdin.lock(), BufWriter::new(stdout.lock()))?;

    info!(emitted, "Grouping complete");
    Ok(())
}

/// 逐行读取 JSON 记录并输出分组结果，返回输出条数
///
/// 输入出错时立即中止：被截断的批次不会写出。
fn run<B: BufRead, W: Write>(grouper: &Grouper<Value>, input: B, mut out: W) -> Result<usize> {
    let input_error: RefCell<Option<anyhow::Error>> = RefCell::new(None);
    let records = input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) if line.trim().is_empty() => {
                warn!(line = index + 1, "跳过空行");
                None
            }
            Ok(line) => Some(
                serde_json::from_str::<Value>(&line)
                    .with_context(|| format!("第 {} 行不是合法的 JSON", index + 1)),
            ),
            Err(e) => Some(Err(anyhow::Error::from(e).context("读取标准输入失败"))),
        })
        .map_while(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                *input_error.borrow_mut() = Some(e);
                None
            }
        });

    let mut emitted = 0usize;
    for output in grouper.each(records) {
        if let Some(e) = input_error.borrow_mut().take() {
            return Err(e);
        }
        let output = output.context("分组失败")?;
        serde_json::to_writer(&mut out, &output.to_json())?;
        out.write_all(b"\n")?;
        emitted += 1;
    }
    out.flush()?;

    if let Some(e) = input_error.into_inner() {
        return Err(e);
    }

    Ok(emitted)
}

/// 读取并编译规则定义文件
fn load_grouper(config: &AppConfig) -> Result<Grouper<Value>> {
    let path = &config.grouper.rules_path;
    let json = fs::read_to_string(path)
        .with_context(|| format!("无法读取规则定义文件: {}", path))?;

    let mut definition: GrouperDefinition = serde_json::from_str(&json)
        .with_context(|| format!("规则定义文件格式错误: {}", path))?;

    if let Some(enabled) = config.grouper.enabled {
        definition.enabled = enabled;
    }

    Ok(compile_grouper(&definition)?)
}
