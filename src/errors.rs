//! 输入错误：任何一种都会在克隆开始前中止整个批次

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("输入文件不存在: {path}")]
    NotFound { path: PathBuf },

    #[error("无法读取输入文件 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("输入文件格式错误 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("第 {index} 条记录缺少 ID")]
    MissingId { index: usize },

    #[error("记录 ID 重复: {id}")]
    DuplicateId { id: String },

    #[error("记录 ID 不能用作目录名: {id}")]
    UnsafeId { id: String },
}
