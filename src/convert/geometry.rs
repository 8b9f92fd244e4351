//! # 尺寸与重采样模块
//!
//! ## 设计思路
//!
//! 约束尺寸计算是纯整数运算：把较长边压到 `max_dim`，另一边按比例向下取整。
//! 重采样优先使用 `fast_image_resize`（SIMD 卷积），失败时回退 `image::imageops::resize`。

use std::str::FromStr;

use fast_image_resize as fr;
use image::RgbImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};

/// 重采样滤镜。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    /// 双线性插值。
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmullrom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }

    fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }

    fn to_fast_alg(self) -> fr::ResizeAlg {
        match self {
            Self::Nearest => fr::ResizeAlg::Nearest,
            Self::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            Self::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            Self::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            Self::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ImageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "bilinear" | "linear" => Ok(Self::Triangle),
            "catmullrom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            other => Err(ImageError::Argument(format!(
                "未知重采样滤镜：{}（可选：nearest / triangle / catmullrom / gaussian / lanczos3）",
                other
            ))),
        }
    }
}

/// 计算“最长边不超过 `max_dim`”约束下的新尺寸，返回 `(new_width, new_height)`。
///
/// - 两边都不超过 `max_dim` 时原样返回；
/// - 否则较长边等于 `max_dim`，另一边按比例向下取整（至少为 1）；
/// - 正方形图片两边同时变为 `max_dim`；
/// - `max_dim` 为 0 时按 1 处理。
///
/// # 示例
/// ```rust
/// use deepimage::convert::compute_constrained_dimensions;
///
/// assert_eq!(compute_constrained_dimensions(1000, 700, 500), (500, 350));
/// assert_eq!(compute_constrained_dimensions(300, 200, 500), (300, 200));
/// ```
pub fn compute_constrained_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let max_dim = max_dim.max(1);
    if width.max(height) <= max_dim {
        return (width, height);
    }

    let scale = |side: u32, longest: u32| -> u32 {
        let scaled = side as u64 * max_dim as u64 / longest as u64;
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_dim, scale(height, width))
    } else {
        (scale(width, height), max_dim)
    }
}

/// 将数组重采样到 `width x height`。
pub fn resize_rgb(array: &RgbImage, width: u32, height: u32, filter: ResizeFilter) -> Result<RgbImage> {
    if width == 0 || height == 0 {
        return Err(ImageError::Argument(format!(
            "目标尺寸无效：{}x{}",
            width, height
        )));
    }
    if array.width() == 0 || array.height() == 0 {
        return Err(ImageError::Argument("无法缩放空图片".to_string()));
    }
    if array.dimensions() == (width, height) {
        return Ok(array.clone());
    }

    log::debug!(
        "🧩 重采样：{}x{} -> {}x{}（filter={}）",
        array.width(),
        array.height(),
        width,
        height,
        filter.as_str()
    );

    match resize_with_fast_image_resize(array, width, height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 重采样失败，回退 imageops::resize：{}", err);
            Ok(image::imageops::resize(array, width, height, filter.to_image_filter()))
        }
    }
}

fn resize_with_fast_image_resize(
    array: &RgbImage,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<RgbImage> {
    let (src_width, src_height) = array.dimensions();
    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        array.as_raw().clone(),
        fr::PixelType::U8x3,
    )
    .map_err(|e| ImageError::Encode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(width, height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(filter.to_fast_alg());
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Encode(format!("fast_image_resize 执行失败：{}", e)))?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| ImageError::Encode("fast_image_resize 输出缓冲长度异常".to_string()))
}
