//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，每个图片对象持有自己的一份配置，
//! 不存在进程级共享的默认状态。
//!
//! ## 实现思路
//!
//! - `Default` 提供与常见图像库一致的默认值（JPEG、质量 75、10 秒下载超时）。
//! - 支持 serde，便于调用方嵌入自己的配置文件；缺省字段回落到默认值。
//! - `validate` 在构造入口统一校验，尽早拒绝不合理的参数组合。

use std::time::Duration;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::convert::{
    DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_JPEG_QUALITY,
    DEFAULT_USER_AGENT,
    ExportFormat,
    FetchOptions,
    ResizeFilter,
};
use crate::error::{ImageError, Result};

/// 图片对象配置。
///
/// 字段覆盖了下载、解码、重新编码、缩放与标注五个阶段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// 网络下载超时时间（秒）。
    pub fetch_timeout_secs: u64,
    /// 下载请求携带的 User-Agent。
    pub user_agent: String,
    /// 下载/读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 导出二进制 / Base64 时使用的容器格式。
    ///
    /// Data URI 的 MIME 声明始终为 JPEG，不随此字段变化。
    pub export_format: ExportFormat,
    /// JPEG 编码质量（1~100）。
    pub jpeg_quality: u8,
    /// 缩放时使用的重采样滤镜。
    pub resize_filter: ResizeFilter,
    /// 未指定颜色时标注框使用的颜色（RGB）。
    pub default_box_color: [u8; 3],
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            export_format: ExportFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resize_filter: ResizeFilter::Triangle,
            default_box_color: [255, 0, 0],
        }
    }
}

impl ImageConfig {
    /// 转换为下载参数。
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            user_agent: self.user_agent.clone(),
            max_file_size: self.max_file_size,
        }
    }

    pub(crate) fn default_color(&self) -> Rgb<u8> {
        Rgb(self.default_box_color)
    }

    /// 校验参数范围。
    pub fn validate(&self) -> Result<()> {
        if !(1..=120).contains(&self.fetch_timeout_secs) {
            return Err(ImageError::Argument(
                "fetch_timeout_secs 必须在 1~120 秒之间".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ImageError::Argument("jpeg_quality 必须在 1~100 之间".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(ImageError::Argument("max_file_size 不能为 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::Argument("max_decoded_pixels 不能为 0".to_string()));
        }
        Ok(())
    }

    /// 校验像素数量是否超过配置上限。
    pub(crate) fn validate_pixel_limits(&self, width: u32, height: u32) -> Result<()> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_decoded_pixels
            )));
        }

        Ok(())
    }

    /// 校验原始字节体积。
    pub(crate) fn validate_file_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                size as f64 / 1024.0 / 1024.0,
                self.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ImageConfig::default().validate().is_ok());
    }

    #[test]
    fn fetch_options_follow_config() {
        let config = ImageConfig {
            fetch_timeout_secs: 3,
            user_agent: "probe/1.0".to_string(),
            ..ImageConfig::default()
        };

        let options = config.fetch_options();

        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.user_agent, "probe/1.0");
        assert_eq!(options.max_file_size, config.max_file_size);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let zero_timeout = ImageConfig {
            fetch_timeout_secs: 0,
            ..ImageConfig::default()
        };
        let bad_quality = ImageConfig {
            jpeg_quality: 0,
            ..ImageConfig::default()
        };

        assert!(matches!(zero_timeout.validate(), Err(ImageError::Argument(_))));
        assert!(matches!(bad_quality.validate(), Err(ImageError::Argument(_))));
    }

    #[test]
    fn pixel_limit_rejects_large_images() {
        let config = ImageConfig {
            max_decoded_pixels: 1_000_000,
            ..ImageConfig::default()
        };

        assert!(config.validate_pixel_limits(1000, 1000).is_ok());
        assert!(matches!(
            config.validate_pixel_limits(2000, 2000),
            Err(ImageError::ResourceLimit(_))
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ImageConfig =
            serde_json::from_str(r#"{ "export_format": "png", "resize_filter": "lanczos3" }"#)
                .expect("parse config failed");

        assert_eq!(config.export_format, ExportFormat::Png);
        assert_eq!(config.resize_filter, ResizeFilter::Lanczos3);
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn config_survives_json_round_trip() {
        let config = ImageConfig {
            default_box_color: [0, 255, 0],
            ..ImageConfig::default()
        };

        let json = serde_json::to_string(&config).expect("serialize failed");
        let parsed: ImageConfig = serde_json::from_str(&json).expect("deserialize failed");

        assert_eq!(parsed, config);
    }
}
