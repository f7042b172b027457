use std::path::Path;
use git2::Repository;

/// 工作区的 Git 信息
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceInfo {
    /// HEAD 指向的提交
    pub head_commit: String,

    /// 当前分支
    pub branch: Option<String>,
}

/// Git 仓库分析器 - 读取克隆工作区的 HEAD 信息
pub struct GitAnalyzer;

impl GitAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 读取工作区信息，不是 Git 仓库或没有提交时返回 None
    ///
    /// 只打开工作区本身，不向上查找父目录中的仓库。
    pub fn inspect(&self, workspace: &Path) -> Option<WorkspaceInfo> {
        let repo = match Repository::open(workspace) {
            Ok(repo) => repo,
            Err(err) => {
                tracing::debug!("不是 Git 仓库 {}: {}", workspace.display(), err);
                return None;
            }
        };

        let head = repo.head().ok()?;
        let commit = head.peel_to_commit().ok()?;

        Some(WorkspaceInfo {
            head_commit: commit.id().to_string(),
            branch: head.shorthand().map(|name| name.to_string()),
        })
    }
}

impl Default for GitAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
