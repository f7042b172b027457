use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// 超时后等待 stderr 读完的最长时间
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 一次克隆的结果，失败是数据而不是错误
#[derive(Debug, Clone, PartialEq)]
pub enum CloneOutcome {
    Success,
    Failed { diagnostic: String },
}

/// 克隆工具 - 把远程仓库浅克隆到目标目录
#[async_trait]
pub trait CloneTool: Send + Sync {
    async fn clone_repo(&self, url: &str, target: &Path) -> CloneOutcome;
}

/// 调用外部 git 进程执行 `clone --depth 1`
#[derive(Debug, Clone)]
pub struct GitCloneTool {
    /// git 可执行文件
    program: String,

    /// 单次克隆超时
    timeout: Option<Duration>,
}

impl GitCloneTool {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, url: &str, target: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(url)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for GitCloneTool {
    fn default() -> Self {
        Self::new("git", None)
    }
}

#[async_trait]
impl CloneTool for GitCloneTool {
    async fn clone_repo(&self, url: &str, target: &Path) -> CloneOutcome {
        let mut child = match self.command(url, target).spawn() {
            Ok(child) => child,
            Err(err) => {
                return CloneOutcome::Failed {
                    diagnostic: format!("无法启动 {}: {}", self.program, err),
                };
            }
        };

        // 单独读取 stderr，超时后也能保留已输出的诊断信息
        let stderr = child.stderr.take();
        let mut stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf).await;
            }
            buf
        });

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => Some(status),
                Err(_) => {
                    if let Err(err) = child.kill().await {
                        tracing::warn!("无法终止克隆进程: {}", err);
                    }
                    None
                }
            },
            None => Some(child.wait().await),
        };

        // 子进程可能把 stderr 继承给了孙进程，不能无限等待
        let stderr_bytes = match tokio::time::timeout(STDERR_DRAIN_TIMEOUT, &mut stderr_task).await {
            Ok(Ok(buf)) => buf,
            Ok(Err(_)) => Vec::new(),
            Err(_) => {
                stderr_task.abort();
                Vec::new()
            }
        };
        let stderr_text = String::from_utf8_lossy(&stderr_bytes).trim().to_string();

        match status {
            Some(Ok(status)) if status.success() => CloneOutcome::Success,
            Some(Ok(status)) => {
                let diagnostic = if stderr_text.is_empty() {
                    format!("{} 退出码 {}", self.program, status.code().unwrap_or(-1))
                } else {
                    stderr_text
                };
                CloneOutcome::Failed { diagnostic }
            }
            Some(Err(err)) => CloneOutcome::Failed {
                diagnostic: format!("等待克隆进程失败: {}", err),
            },
            None => {
                let limit = crate::utils::format_duration(self.timeout.unwrap_or_default());
                let mut diagnostic = format!("clone timed out after {}", limit);
                if !stderr_text.is_empty() {
                    diagnostic.push('\n');
                    diagnostic.push_str(&stderr_text);
                }
                CloneOutcome::Failed { diagnostic }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// 写一个替代 git 的脚本，参数为 `clone --depth 1 <url> <target>`
    fn fake_git(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-git");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_success_populates_target() {
        let temp_dir = tempdir().unwrap();
        let script = fake_git(temp_dir.path(), "mkdir -p \"$5\" && printf 'a\\nb\\n' > \"$5/file.txt\"");
        let target = temp_dir.path().join("ws").join("r1");

        let tool = GitCloneTool::new(script.to_string_lossy(), None);
        let outcome = tool.clone_repo("https://example.com/r1.git", &target).await;

        assert_eq!(outcome, CloneOutcome::Success);
        assert_eq!(fs::read_to_string(target.join("file.txt")).unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        let temp_dir = tempdir().unwrap();
        let script = fake_git(temp_dir.path(), "echo \"fatal: repository '$4' not found\" >&2\nexit 1");

        let tool = GitCloneTool::new(script.to_string_lossy(), None);
        let outcome = tool.clone_repo("https://example.com/gone.git", &temp_dir.path().join("t")).await;

        match outcome {
            CloneOutcome::Failed { diagnostic } => {
                assert_eq!(diagnostic, "fatal: repository 'https://example.com/gone.git' not found");
            }
            other => panic!("应该克隆失败: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_failure() {
        let temp_dir = tempdir().unwrap();
        let script = fake_git(temp_dir.path(), "echo 'Cloning...' >&2\nexec sleep 10");

        let tool = GitCloneTool::new(script.to_string_lossy(), Some(Duration::from_millis(300)));
        let started = std::time::Instant::now();
        let outcome = tool.clone_repo("https://example.com/slow.git", &temp_dir.path().join("t")).await;

        assert!(started.elapsed() < Duration::from_secs(8));
        match outcome {
            CloneOutcome::Failed { diagnostic } => {
                assert!(diagnostic.starts_with("clone timed out after 300ms"), "{}", diagnostic);
                assert!(diagnostic.contains("Cloning..."));
            }
            other => panic!("应该超时失败: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_failure() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("no-such-git");

        let tool = GitCloneTool::new(missing.to_string_lossy(), None);
        let outcome = tool.clone_repo("https://example.com/x.git", &temp_dir.path().join("t")).await;

        assert!(matches!(outcome, CloneOutcome::Failed { .. }));
    }
}
