use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repo_grader::config::ReportFormat;

#[derive(Parser)]
#[command(name = "repo-grader")]
#[command(about = "批量克隆代码仓库并计算小文件模块化评分")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 克隆并分析输入文件中的全部仓库
    Run {
        /// 输入记录文件 (JSON 数组，每项包含 id 和 repo_url)
        #[arg(short, long)]
        input: PathBuf,

        /// 保存结果到文件 (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 克隆工作区根目录
        #[arg(long)]
        temp_root: Option<PathBuf>,

        /// 小文件阈值（行数）
        #[arg(short, long)]
        threshold: Option<usize>,

        /// 最大并发克隆数
        #[arg(long)]
        concurrency: Option<usize>,

        /// 单次克隆超时（秒）
        #[arg(long)]
        timeout: Option<u64>,

        /// 分析后保留克隆的工作区
        #[arg(long)]
        keep_workspace: bool,

        /// 报告格式
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// 分析本地目录（不克隆）
    Measure {
        /// 目录路径
        #[arg(default_value = ".")]
        path: PathBuf,

        /// 小文件阈值（行数）
        #[arg(short, long)]
        threshold: Option<usize>,
    },

    /// 管理配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示当前配置
    Show,

    /// 重置为默认配置
    Reset,

    /// 显示配置文件路径
    Path,
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum OutputFormat {
    /// 表格格式
    Table,
    /// JSON 格式
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => ReportFormat::Table,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}
