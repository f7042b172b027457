use std::collections::HashSet;
use std::path::Path;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::InputError;
use crate::models::{
    BatchResult, BatchStats, InputRecord, PassThroughColumns, RecordStatus, RepoRecord,
};

/// 不适用时的占位符
pub const NOT_APPLICABLE: &str = "N/A";

/// 读取并校验输入记录（JSON 数组）
pub fn load_records(path: &Path) -> Result<Vec<RepoRecord>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound { path: path.to_path_buf() });
    }

    let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let inputs: Vec<InputRecord> = serde_json::from_str(&content).map_err(|source| {
        InputError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let records = validate_records(inputs)?;
    tracing::info!("从 {} 读取到 {} 个待分析仓库", path.display(), records.len());
    Ok(records)
}

/// 校验输入记录并转换为 pending 状态的记录
///
/// ID 和地址都为空的行视为空行直接跳过。
pub fn validate_records(inputs: Vec<InputRecord>) -> Result<Vec<RepoRecord>, InputError> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        let id = input.id_text();

        if id.is_empty() {
            if input.url_text().is_empty() {
                tracing::debug!("跳过第 {} 行空记录", index);
                continue;
            }
            return Err(InputError::MissingId { index });
        }

        if !is_safe_dir_name(&id) {
            return Err(InputError::UnsafeId { id });
        }

        if !seen.insert(id.clone()) {
            return Err(InputError::DuplicateId { id });
        }

        records.push(RepoRecord::from_input(input));
    }

    Ok(records)
}

/// ID 会用作工作区目录名，必须是单个路径组成部分
fn is_safe_dir_name(id: &str) -> bool {
    id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

#[derive(Serialize)]
struct ResultReport<'a> {
    threshold: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    stats: &'a BatchStats,
    records: Vec<OutputRow<'a>>,
}

/// 输出行，未分析的记录数值列为 null
#[derive(Serialize)]
struct OutputRow<'a> {
    id: &'a str,
    repo_url: &'a str,
    status: RecordStatus,
    #[serde(flatten)]
    columns: &'a PassThroughColumns,
    error: Option<&'a str>,
    head_commit: Option<&'a str>,
    head_branch: Option<&'a str>,
    total_lines: Option<u64>,
    small_file_lines: Option<u64>,
    grade: Option<f64>,
}

impl<'a> From<&'a RepoRecord> for OutputRow<'a> {
    fn from(record: &'a RepoRecord) -> Self {
        let analyzed = record.is_analyzed();
        Self {
            id: &record.id,
            repo_url: &record.repo_url,
            status: record.status,
            columns: &record.columns,
            error: record.error.as_deref(),
            head_commit: record.head_commit.as_deref(),
            head_branch: record.head_branch.as_deref(),
            total_lines: analyzed.then_some(record.total_lines),
            small_file_lines: analyzed.then_some(record.small_file_lines),
            grade: analyzed.then_some(record.grade),
        }
    }
}

/// 把批次结果序列化为 JSON 文本
pub fn results_to_json(result: &BatchResult) -> Result<String> {
    let report = ResultReport {
        threshold: result.threshold,
        started_at: result.started_at,
        finished_at: result.finished_at,
        stats: &result.stats,
        records: result.records.iter().map(OutputRow::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// 导出结果到 JSON 文件
pub fn export_results(result: &BatchResult, path: &Path) -> Result<()> {
    let content = results_to_json(result)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, content)
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
    tracing::info!("结果已导出到 {}", path.display());
    Ok(())
}

/// 渲染表格形式的结果
pub fn render_table(result: &BatchResult) -> String {
    let small_header = format!("Lines in Small Files (<{})", result.threshold);
    let id_width = result.records.iter()
        .map(|r| r.id.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut lines = vec![format!(
        "{:<id_w$}  {:<12}  {:>11}  {:>sw$}  {:>9}  {}",
        "ID", "Status", "Total Lines", small_header, "Grade (%)", "Repo URL",
        id_w = id_width,
        sw = small_header.len(),
    )];

    for record in &result.records {
        let (total, small, grade) = if record.is_analyzed() {
            (
                record.total_lines.to_string(),
                record.small_file_lines.to_string(),
                format!("{:.2}", record.grade),
            )
        } else {
            (NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string())
        };

        lines.push(format!(
            "{:<id_w$}  {:<12}  {:>11}  {:>sw$}  {:>9}  {}",
            record.id, record.status.as_str(), total, small, grade, record.repo_url,
            id_w = id_width,
            sw = small_header.len(),
        ));
    }

    lines.join("\n")
}
