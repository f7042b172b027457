use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分析配置
    pub analysis: AnalysisConfig,

    /// 输出配置
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 小文件阈值
    pub threshold: usize,

    /// 克隆工作区根目录
    pub temp_root: PathBuf,

    /// 最大并发克隆数
    pub concurrency_limit: usize,

    /// 分析完成后是否删除工作区
    pub cleanup: bool,

    /// 单次克隆超时（秒），不设置则不限时
    pub clone_timeout_secs: Option<u64>,

    /// 克隆使用的 git 可执行文件
    pub git_program: String,

    /// 遍历时跳过的版本控制目录名
    pub vcs_dirs: HashSet<String>,

    /// 是否用 rayon 并行分析
    pub parallel_analysis: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 默认输出格式
    pub format: ReportFormat,

    /// 默认结果文件路径
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: DefaultConfig::SMALL_FILE_THRESHOLD,
            temp_root: DefaultConfig::default_temp_root(),
            concurrency_limit: DefaultConfig::CONCURRENCY_LIMIT,
            cleanup: true,
            clone_timeout_secs: None,
            git_program: DefaultConfig::default_git_program(),
            vcs_dirs: DefaultConfig::default_vcs_dirs(),
            parallel_analysis: false,
        }
    }
}

impl AnalysisConfig {
    /// 克隆超时时长
    pub fn clone_timeout(&self) -> Option<Duration> {
        self.clone_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("repo-grader");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果文件不存在则创建默认配置
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<()> {
        if self.analysis.threshold == 0 {
            anyhow::bail!("threshold 必须大于 0");
        }
        if self.analysis.concurrency_limit == 0 {
            anyhow::bail!("concurrency_limit 必须大于 0");
        }
        Ok(())
    }
}
