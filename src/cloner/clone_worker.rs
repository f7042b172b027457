use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use tokio::sync::Semaphore;

use crate::cloner::{CloneOutcome, CloneTool};
use crate::models::RepoRecord;

/// 克隆工作者 - 在并发上限内把一条记录克隆到独立的工作区
#[derive(Clone)]
pub struct CloneWorker {
    tool: Arc<dyn CloneTool>,

    /// 所有克隆共享的并发许可
    permits: Arc<Semaphore>,

    /// 工作区根目录
    temp_root: PathBuf,
}

impl CloneWorker {
    pub fn new(tool: Arc<dyn CloneTool>, concurrency_limit: usize, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            permits: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            temp_root: temp_root.into(),
        }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// 记录对应的工作区路径
    pub fn workspace_for(&self, id: &str) -> PathBuf {
        self.temp_root.join(id)
    }

    /// 克隆一条记录，任何失败都写入记录状态而不是返回错误
    pub async fn clone_record(&self, mut record: RepoRecord) -> RepoRecord {
        if !record.has_url() {
            tracing::info!("[{}] 跳过 - 没有仓库地址", record.id);
            record.mark_no_url();
            return record;
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(err) => {
                record.mark_clone_failed(format!("无法获取克隆许可: {}", err));
                return record;
            }
        };

        let workspace = self.workspace_for(&record.id);
        if let Err(err) = prepare_workspace(&workspace).await {
            tracing::warn!("[{}] 无法准备工作区: {:#}", record.id, err);
            record.mark_clone_failed(format!("{:#}", err));
            return record;
        }

        tracing::info!("[{}] 正在克隆 {}", record.id, record.repo_url);

        match self.tool.clone_repo(record.repo_url.trim(), &workspace).await {
            CloneOutcome::Success => {
                tracing::info!("[{}] 克隆成功", record.id);
                record.mark_cloned(&workspace);
            }
            CloneOutcome::Failed { diagnostic } => {
                tracing::warn!("[{}] 克隆失败: {}", record.id, diagnostic);
                record.mark_clone_failed(diagnostic);
            }
        }

        record
    }
}

/// 重建空的工作区目录，已存在的内容全部删除
async fn prepare_workspace(workspace: &Path) -> Result<()> {
    if tokio::fs::try_exists(workspace).await.unwrap_or(false) {
        tokio::fs::remove_dir_all(workspace)
            .await
            .with_context(|| format!("无法删除旧工作区 {}", workspace.display()))?;
    }

    tokio::fs::create_dir_all(workspace)
        .await
        .with_context(|| format!("无法创建工作区 {}", workspace.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::models::RecordStatus;

    /// 记录调用参数的克隆工具替身
    #[derive(Default)]
    struct StubTool {
        calls: Mutex<Vec<(String, PathBuf)>>,
        fail: bool,
    }

    #[async_trait]
    impl CloneTool for StubTool {
        async fn clone_repo(&self, url: &str, target: &Path) -> CloneOutcome {
            self.calls.lock().unwrap().push((url.to_string(), target.to_path_buf()));
            if self.fail {
                return CloneOutcome::Failed { diagnostic: "fatal: unreachable".to_string() };
            }
            fs::write(target.join("lib.rs"), "fn a() {}\n").unwrap();
            CloneOutcome::Success
        }
    }

    #[tokio::test]
    async fn test_empty_url_short_circuits() {
        let temp_dir = tempdir().unwrap();
        let tool = Arc::new(StubTool::default());
        let worker = CloneWorker::new(tool.clone(), 5, temp_dir.path());

        let record = worker.clone_record(RepoRecord::new("r1", "   ")).await;

        assert_eq!(record.status, RecordStatus::NoUrl);
        assert!(record.workspace_path.is_none());
        assert!(tool.calls.lock().unwrap().is_empty());
        assert!(!temp_dir.path().join("r1").exists());
    }

    #[tokio::test]
    async fn test_successful_clone_sets_workspace() {
        let temp_dir = tempdir().unwrap();
        let tool = Arc::new(StubTool::default());
        let worker = CloneWorker::new(tool.clone(), 5, temp_dir.path().join("ws"));

        let record = worker.clone_record(RepoRecord::new("r1", "https://example.com/r1.git")).await;

        let expected = temp_dir.path().join("ws").join("r1");
        assert_eq!(worker.temp_root(), temp_dir.path().join("ws").as_path());
        assert_eq!(record.status, RecordStatus::Cloned);
        assert_eq!(record.workspace_path.as_deref(), Some(expected.as_path()));
        assert!(expected.join("lib.rs").exists());

        let calls = tool.calls.lock().unwrap();
        assert_eq!(calls[0], ("https://example.com/r1.git".to_string(), expected.clone()));
    }

    #[tokio::test]
    async fn test_existing_workspace_is_rebuilt() {
        let temp_dir = tempdir().unwrap();
        let stale = temp_dir.path().join("r1");
        fs::create_dir_all(stale.join("old")).unwrap();
        fs::write(stale.join("old").join("leftover.txt"), "stale\n").unwrap();

        let worker = CloneWorker::new(Arc::new(StubTool::default()), 5, temp_dir.path());
        let record = worker.clone_record(RepoRecord::new("r1", "https://example.com/r1.git")).await;

        assert_eq!(record.status, RecordStatus::Cloned);
        assert!(!stale.join("old").exists());
        assert!(stale.join("lib.rs").exists());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_not_raised() {
        let temp_dir = tempdir().unwrap();
        let tool = Arc::new(StubTool { fail: true, ..Default::default() });
        let worker = CloneWorker::new(tool, 5, temp_dir.path());

        let record = worker.clone_record(RepoRecord::new("r1", "https://example.com/r1.git")).await;

        assert_eq!(record.status, RecordStatus::CloneFailed);
        assert!(record.workspace_path.is_none());
        assert_eq!(record.error.as_deref(), Some("fatal: unreachable"));
    }
}
