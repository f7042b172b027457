use std::collections::HashSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::config::{AnalysisConfig, DefaultConfig};
use crate::models::{RecordStatus, RepoRecord};
use crate::scanner::{compute_grade, GitAnalyzer, LineCounter};

/// 仓库遍历器 - 统计工作区内的总行数与小文件行数
#[derive(Debug, Clone)]
pub struct RepoWalker {
    /// 小文件阈值（严格小于）
    threshold: u64,

    /// 跳过的版本控制目录名
    vcs_dirs: HashSet<String>,
}

/// 一次遍历的累计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTally {
    /// 参与统计的文件数（行数大于 0）
    pub files: u64,

    /// 总行数
    pub total_lines: u64,

    /// 小文件中的行数
    pub small_file_lines: u64,
}

impl LineTally {
    /// 累加一个文件的行数，0 行文件不参与统计
    pub fn add_file(&mut self, line_count: u64, threshold: u64) {
        if line_count == 0 {
            return;
        }

        self.files += 1;
        self.total_lines += line_count;
        if line_count < threshold {
            self.small_file_lines += line_count;
        }
    }

    pub fn grade(&self) -> f64 {
        compute_grade(self.small_file_lines, self.total_lines)
    }
}

impl RepoWalker {
    /// 使用默认阈值和默认版本控制目录创建遍历器
    pub fn new(threshold: usize) -> Self {
        Self::with_vcs_dirs(threshold, DefaultConfig::default_vcs_dirs())
    }

    pub fn with_vcs_dirs(threshold: usize, vcs_dirs: HashSet<String>) -> Self {
        Self {
            threshold: threshold as u64,
            vcs_dirs,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::with_vcs_dirs(config.threshold, config.vcs_dirs.clone())
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// 遍历目录并累计行数
    pub fn measure(&self, root: &Path) -> LineTally {
        let mut tally = LineTally::default();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_vcs_dir(entry));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        continue;
                    }
                    let line_count = LineCounter::count_file(entry.path());
                    tally.add_file(line_count, self.threshold);
                }
                Err(err) => {
                    tracing::debug!("遍历目录时出错: {}", err);
                }
            }
        }

        tally
    }

    /// 分析一条记录，只处理 cloned 状态，其余状态原样返回
    pub fn analyze_record(&self, record: &mut RepoRecord) {
        if record.status != RecordStatus::Cloned {
            return;
        }

        let Some(workspace) = record.workspace_path.clone() else {
            return;
        };

        tracing::info!("[{}] 开始分析代码", record.id);

        let tally = self.measure(&workspace);
        record.mark_analyzed(tally.total_lines, tally.small_file_lines, tally.grade());
        if let Some(info) = GitAnalyzer::new().inspect(&workspace) {
            record.head_commit = Some(info.head_commit);
            record.head_branch = info.branch;
        }

        tracing::info!(
            "[{}] 分析完成: 共 {} 行，小文件 (<{} 行) {} 行，评分 {}%",
            record.id,
            tally.total_lines,
            self.threshold,
            tally.small_file_lines,
            record.grade
        );
    }

    /// 检查是否是版本控制元数据目录
    fn is_vcs_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        entry.file_name()
            .to_str()
            .map(|name| self.vcs_dirs.contains(name))
            .unwrap_or(false)
    }
}
