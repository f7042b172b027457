use std::collections::HashSet;
use std::path::PathBuf;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 小文件阈值（行数严格小于该值才算小文件）
    pub const SMALL_FILE_THRESHOLD: usize = 150;

    /// 同时运行的克隆进程上限
    pub const CONCURRENCY_LIMIT: usize = 5;

    /// 默认的克隆工作区根目录
    pub fn default_temp_root() -> PathBuf {
        PathBuf::from("TempFiles")
    }

    /// 默认的克隆工具
    pub fn default_git_program() -> String {
        "git".to_string()
    }

    /// 遍历时跳过的版本控制元数据目录
    pub fn default_vcs_dirs() -> HashSet<String> {
        let mut dirs = HashSet::new();
        dirs.insert(".git".to_string());
        dirs
    }
}
