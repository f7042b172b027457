use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{RecordStatus, RepoRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// 按输入顺序排列的最终记录
    pub records: Vec<RepoRecord>,

    /// 汇总统计
    pub stats: BatchStats,

    /// 本次使用的小文件阈值
    pub threshold: usize,

    /// 批次开始时间
    pub started_at: DateTime<Utc>,

    /// 批次结束时间
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// 记录总数
    pub total: usize,

    /// 分析完成的数量
    pub analyzed: usize,

    /// 克隆失败的数量
    pub clone_failed: usize,

    /// 没有地址的数量
    pub no_url: usize,

    /// 已分析仓库的平均行数
    pub average_lines: Option<u64>,

    /// 批次耗时
    pub duration: Option<Duration>,
}

impl BatchResult {
    /// 创建新的批次结果
    pub fn new(threshold: usize) -> Self {
        Self {
            records: Vec::new(),
            stats: BatchStats::default(),
            threshold,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 完成批次并写入最终记录
    pub fn finish(&mut self, records: Vec<RepoRecord>) {
        self.records = records;
        self.finished_at = Some(Utc::now());
        self.update_stats();

        if let Some(end_time) = self.finished_at {
            self.stats.duration = Some(
                end_time.signed_duration_since(self.started_at)
                    .to_std()
                    .unwrap_or_default()
            );
        }
    }

    /// 更新统计信息
    fn update_stats(&mut self) {
        let count = |status: RecordStatus| {
            self.records.iter().filter(|r| r.status == status).count()
        };

        let analyzed = count(RecordStatus::Analyzed);
        let clone_failed = count(RecordStatus::CloneFailed);
        let no_url = count(RecordStatus::NoUrl);

        let average_lines = if analyzed > 0 {
            let sum: u64 = self.records.iter()
                .filter(|r| r.is_analyzed())
                .map(|r| r.total_lines)
                .sum();
            Some(sum / analyzed as u64)
        } else {
            None
        };

        self.stats.total = self.records.len();
        self.stats.analyzed = analyzed;
        self.stats.clone_failed = clone_failed;
        self.stats.no_url = no_url;
        self.stats.average_lines = average_lines;
    }

    /// 克隆失败的记录及其诊断信息
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.records.iter()
            .filter(|r| r.status == RecordStatus::CloneFailed)
            .map(|r| (r.id.as_str(), r.error.as_deref().unwrap_or("")))
            .collect()
    }

    /// 获取批次耗时的友好显示
    pub fn duration_display(&self) -> String {
        match self.stats.duration {
            Some(duration) => crate::utils::format_duration(duration),
            None => "进行中...".to_string(),
        }
    }

    /// 生成汇总报告文本
    pub fn summary(&self) -> String {
        let rule = "=".repeat(70);
        let mut lines = vec![
            rule.clone(),
            "分析汇总".to_string(),
            rule,
            format!("仓库总数: {}", self.stats.total),
            format!("分析成功: {}", self.stats.analyzed),
            format!("克隆失败: {}", self.stats.clone_failed),
            format!("没有地址: {}", self.stats.no_url),
            format!("开始时间: {}", crate::utils::format_time(self.started_at)),
            format!("耗时: {}", self.duration_display()),
        ];

        if let Some(avg) = self.stats.average_lines {
            lines.push(format!("平均每个仓库行数: {}", avg));
        }

        let failures = self.failures();
        if !failures.is_empty() {
            lines.push(String::new());
            lines.push("克隆失败详情:".to_string());
            for (id, diagnostic) in failures {
                lines.push(format!("  [{}] {}", id, diagnostic));
            }
        }

        lines.join("\n")
    }
}
