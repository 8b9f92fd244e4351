//! # 数据源模型
//!
//! ## 设计思路
//!
//! 将“外部输入”与“已校验的单一来源”解耦：
//! - `ImageSources` 对应调用方的可选参数集合，可能为空也可能给多了
//! - `ImageSource` 表示恰好一种来源，由类型保证唯一性

use std::path::PathBuf;

use image::RgbImage;

use crate::error::{ImageError, Result};

/// 图片输入来源（恰好一种）。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 本地文件路径。
    FilePath(PathBuf),
    /// 网络地址。
    Url(String),
    /// 编码后的图片字节（JPEG / PNG 等）。
    Binary(Vec<u8>),
    /// Base64 文本（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 已有的 RGB 像素数组，直接采用。
    Array(RgbImage),
}

impl ImageSource {
    /// 来源标识（用于日志与诊断）。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FilePath(_) => "file",
            Self::Url(_) => "url",
            Self::Binary(_) => "binary",
            Self::Base64(_) => "base64",
            Self::Array(_) => "array",
        }
    }
}

/// 构造参数集合：调用方填写其中恰好一项。
///
/// # 示例
/// ```rust
/// use deepimage::{ImageError, ImageSources};
///
/// let result = ImageSources::default().into_single();
/// assert!(matches!(result, Err(ImageError::Construction(_))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageSources {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub binary: Option<Vec<u8>>,
    pub base64: Option<String>,
    pub array: Option<RgbImage>,
}

impl ImageSources {
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_binary(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.binary = Some(bytes.into());
        self
    }

    pub fn with_base64(mut self, text: impl Into<String>) -> Self {
        self.base64 = Some(text.into());
        self
    }

    pub fn with_array(mut self, array: RgbImage) -> Self {
        self.array = Some(array);
        self
    }

    /// 收敛为单一来源；未提供或提供多于一项时返回 `Construction` 错误。
    pub fn into_single(self) -> Result<ImageSource> {
        let candidates: Vec<ImageSource> = [
            self.path.map(ImageSource::FilePath),
            self.url.map(ImageSource::Url),
            self.binary.map(ImageSource::Binary),
            self.base64.map(ImageSource::Base64),
            self.array.map(ImageSource::Array),
        ]
        .into_iter()
        .flatten()
        .collect();

        match candidates.len() {
            0 => Err(ImageError::Construction(
                "未提供图片来源（需要 path / url / binary / base64 / array 之一）".to_string(),
            )),
            1 => candidates
                .into_iter()
                .next()
                .ok_or_else(|| ImageError::Construction("图片来源为空".to_string())),
            _ => {
                let kinds: Vec<&str> = candidates.iter().map(ImageSource::kind).collect();
                Err(ImageError::Construction(format!(
                    "只能提供一种图片来源，实际提供了 {} 种：{}",
                    kinds.len(),
                    kinds.join(" / ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_are_rejected() {
        let result = ImageSources::default().into_single();

        assert!(matches!(result, Err(ImageError::Construction(_))));
    }

    #[test]
    fn single_source_is_accepted() {
        let source = ImageSources::default()
            .with_url("https://example.com/cat.jpg")
            .into_single()
            .expect("single source should pass");

        assert_eq!(source.kind(), "url");
    }

    #[test]
    fn multiple_sources_are_rejected_with_their_kinds() {
        let result = ImageSources::default()
            .with_path("cat.jpg")
            .with_base64("AAAA")
            .into_single();

        match result {
            Err(ImageError::Construction(message)) => {
                assert!(message.contains("file"));
                assert!(message.contains("base64"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
