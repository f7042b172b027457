use std::io::ErrorKind;
use std::path::Path;

/// 删除整个工作区根目录
///
/// 目录不存在时什么也不做；删除失败只记录警告，不向上传播。
/// 返回是否真的删除了目录。
pub fn remove_workspace_root(temp_root: &Path) -> bool {
    match std::fs::remove_dir_all(temp_root) {
        Ok(()) => {
            tracing::info!("已清理临时目录 {}", temp_root.display());
            true
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("临时目录不存在，无需清理: {}", temp_root.display());
            false
        }
        Err(err) => {
            tracing::warn!("清理临时目录失败 {}: {}", temp_root.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_removes_nested_tree() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("TempFiles");
        fs::create_dir_all(root.join("r1/.git/objects")).unwrap();
        fs::write(root.join("r1/main.rs"), "fn main() {}\n").unwrap();

        assert!(remove_workspace_root(&root));
        assert!(!root.exists());
    }

    #[test]
    fn test_missing_root_is_noop() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("never-created");

        assert!(!remove_workspace_root(&root));
        // 重复调用同样安全
        assert!(!remove_workspace_root(&root));
    }
}
