use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 记录状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// 刚加载，尚未处理
    Pending,
    /// 没有仓库地址（终态）
    NoUrl,
    /// 克隆成功，等待分析
    Cloned,
    /// 克隆失败（终态）
    CloneFailed,
    /// 分析完成
    Analyzed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::NoUrl => "no_url",
            RecordStatus::Cloned => "cloned",
            RecordStatus::CloneFailed => "clone_failed",
            RecordStatus::Analyzed => "analyzed",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原样透传到输出的附加列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassThroughColumns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_criteria: Option<Value>,
}

/// 输入文件中的一行
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    /// 字符串或数字
    #[serde(default)]
    pub id: Value,

    #[serde(default, alias = "github_url")]
    pub repo_url: Option<String>,

    #[serde(flatten)]
    pub columns: PassThroughColumns,
}

impl InputRecord {
    /// 把 id 单元格转换为字符串，空值返回空串
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::Null => String::new(),
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    }

    pub fn url_text(&self) -> String {
        self.repo_url.as_deref().map(str::trim).unwrap_or_default().to_string()
    }
}

/// 一个仓库在克隆与分析过程中的完整状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    /// 批次内唯一的记录 ID
    pub id: String,

    /// 仓库地址（可能为空）
    pub repo_url: String,

    pub status: RecordStatus,

    /// 克隆后的工作区，仅在 cloned / analyzed 时存在
    pub workspace_path: Option<PathBuf>,

    /// 总行数
    pub total_lines: u64,

    /// 小文件中的行数
    pub small_file_lines: u64,

    /// 小文件行数占比（百分比，保留两位小数）
    pub grade: f64,

    /// 克隆失败时的诊断信息
    pub error: Option<String>,

    /// 工作区 HEAD 提交
    pub head_commit: Option<String>,

    /// 工作区当前分支
    pub head_branch: Option<String>,

    #[serde(flatten)]
    pub columns: PassThroughColumns,
}

impl RepoRecord {
    /// 创建处于 pending 状态的新记录
    pub fn new(id: impl Into<String>, repo_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repo_url: repo_url.into(),
            status: RecordStatus::Pending,
            workspace_path: None,
            total_lines: 0,
            small_file_lines: 0,
            grade: 0.0,
            error: None,
            head_commit: None,
            head_branch: None,
            columns: PassThroughColumns::default(),
        }
    }

    pub fn from_input(input: InputRecord) -> Self {
        let mut record = Self::new(input.id_text(), input.url_text());
        record.columns = input.columns;
        record
    }

    pub fn has_url(&self) -> bool {
        !self.repo_url.trim().is_empty()
    }

    pub fn is_analyzed(&self) -> bool {
        self.status == RecordStatus::Analyzed
    }

    pub fn mark_no_url(&mut self) {
        self.status = RecordStatus::NoUrl;
        self.workspace_path = None;
    }

    pub fn mark_cloned(&mut self, workspace: &Path) {
        self.status = RecordStatus::Cloned;
        self.workspace_path = Some(workspace.to_path_buf());
        self.error = None;
    }

    pub fn mark_clone_failed(&mut self, diagnostic: impl Into<String>) {
        self.status = RecordStatus::CloneFailed;
        self.workspace_path = None;
        self.error = Some(diagnostic.into());
    }

    /// 写入分析结果并进入 analyzed 状态
    pub fn mark_analyzed(&mut self, total_lines: u64, small_file_lines: u64, grade: f64) {
        debug_assert!(small_file_lines <= total_lines);
        self.total_lines = total_lines;
        self.small_file_lines = small_file_lines;
        self.grade = grade;
        self.status = RecordStatus::Analyzed;
    }
}
