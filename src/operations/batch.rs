use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::cloner::{CloneTool, CloneWorker, GitCloneTool};
use crate::config::AnalysisConfig;
use crate::models::{BatchResult, RepoRecord};
use crate::operations::{cleanup, record_io};
use crate::scanner::RepoWalker;

/// 批次协调器 - 并发克隆全部记录，再逐条分析
pub struct BatchCoordinator {
    settings: AnalysisConfig,
    worker: CloneWorker,
    walker: RepoWalker,
    show_progress: bool,
}

/// 一次完整批次运行的参数
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// 输入记录文件
    pub input: PathBuf,

    /// 结果文件，不设置则不导出
    pub output: Option<PathBuf>,

    pub settings: AnalysisConfig,

    /// 是否显示克隆进度条
    pub show_progress: bool,
}

impl BatchCoordinator {
    /// 使用外部 git 进程创建协调器
    pub fn new(settings: AnalysisConfig) -> Self {
        let tool = GitCloneTool::new(settings.git_program.clone(), settings.clone_timeout());
        Self::with_tool(settings, Arc::new(tool))
    }

    /// 使用指定的克隆工具创建协调器
    pub fn with_tool(settings: AnalysisConfig, tool: Arc<dyn CloneTool>) -> Self {
        let worker = CloneWorker::new(tool, settings.concurrency_limit, settings.temp_root.clone());
        let walker = RepoWalker::from_config(&settings);
        Self {
            settings,
            worker,
            walker,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 克隆 → 分析 → 清理（可选），返回按输入顺序排列的结果
    pub async fn run(&self, records: Vec<RepoRecord>) -> Result<BatchResult> {
        let mut result = BatchResult::new(self.settings.threshold);

        let records = self.clone_all(records).await;
        let records = self.analyze_all(records).await?;

        if self.settings.cleanup {
            cleanup::remove_workspace_root(self.worker.temp_root());
        }

        result.finish(records);
        Ok(result)
    }

    /// 并发克隆所有记录，全部完成后才返回
    pub async fn clone_all(&self, records: Vec<RepoRecord>) -> Vec<RepoRecord> {
        tracing::info!(
            "开始并发克隆 {} 个仓库（最多同时 {} 个）",
            records.len(),
            self.settings.concurrency_limit
        );

        let progress = if self.show_progress {
            self.create_progress_bar(records.len() as u64)
        } else {
            ProgressBar::hidden()
        };

        let tasks = records.into_iter().map(|record| {
            let progress = progress.clone();
            async move {
                let record = self.worker.clone_record(record).await;
                progress.inc(1);
                record
            }
        });

        // join_all 保持输入顺序
        let records = join_all(tasks).await;
        progress.finish_with_message("克隆完成");
        records
    }

    /// 分析所有已克隆的记录，其余记录原样保留
    pub async fn analyze_all(&self, mut records: Vec<RepoRecord>) -> Result<Vec<RepoRecord>> {
        tracing::info!("开始分析仓库");

        let walker = self.walker.clone();
        let parallel = self.settings.parallel_analysis;

        let records = tokio::task::spawn_blocking(move || {
            if parallel {
                records.par_iter_mut().for_each(|record| walker.analyze_record(record));
            } else {
                for record in records.iter_mut() {
                    walker.analyze_record(record);
                }
            }
            records
        })
        .await?;

        Ok(records)
    }

    /// 创建进度条
    fn create_progress_bar(&self, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-")
        );
        pb.set_message("克隆中");
        pb
    }
}

/// 读取输入、运行批次并导出结果
///
/// 输入错误会在任何克隆开始前返回，且不会写出任何结果。
pub async fn run_batch(request: BatchRequest) -> Result<BatchResult> {
    let records = record_io::load_records(&request.input)?;

    let coordinator = BatchCoordinator::new(request.settings)
        .show_progress(request.show_progress);
    let result = coordinator.run(records).await?;

    if let Some(output) = &request.output {
        record_io::export_results(&result, output)?;
    }

    Ok(result)
}
