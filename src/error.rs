//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片对象与转换库中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! ## 实现思路
//!
//! - 参数类错误（`Construction` / `Argument`）属于调用方编程错误，重试没有意义。
//! - 环境类错误（`Fetch` / `Io`）来自网络或磁盘，调用方可自行决定是否重试。
//! - 所有错误均携带上下文文案，库内部不做任何重试或吞错。

/// 图片处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 来源数量不为 1，或来源本身不可读。
    #[error("构造错误：{0}")]
    Construction(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    /// 网络错误、超时或非 2xx 响应。
    #[error("网络错误：{0}")]
    Fetch(String),

    /// 互斥参数同时给出、或列表数量不匹配。
    #[error("参数错误：{0}")]
    Argument(String),

    #[error("文件错误：{0}")]
    Io(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ImageError {
    /// 是否为环境类错误（网络 / 磁盘），调用方可据此决定是否重试。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Io(_))
    }
}

/// 本 crate 的统一返回类型。
pub type Result<T> = std::result::Result<T, ImageError>;
