//! # 编解码模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGB 数组”与“RGB 数组 → 固定格式字节”集中管理。
//! 输出容器格式只有一条固定路径（默认 JPEG），无论原始来源是什么格式，
//! 数组往返后都会以同一种编码输出。这是有意的有损：原本无损编码的图片，
//! 经过数组往返后可能以有损格式返回。
//!
//! ## 实现思路
//!
//! 1. 通过文件签名（magic bytes）尽早拒绝非图片内容
//! 2. 交给 `image` crate 猜测格式并完整解码
//! 3. 转换为 RGB8（或显式要求时的灰度）

use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};

/// JPEG 编码质量，与常见图像库的默认值保持一致。
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// 数组重新编码时使用的容器格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// 输出为稳定字符串，供日志与配置文件使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// 写文件时默认使用的扩展名。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub(crate) fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ImageError;

    /// 从外部字符串解析格式。
    ///
    /// # 示例
    /// ```rust
    /// use deepimage::convert::ExportFormat;
    ///
    /// let format: ExportFormat = " JPG ".parse()?;
    /// assert_eq!(format, ExportFormat::Jpeg);
    /// # Ok::<(), deepimage::ImageError>(())
    /// ```
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(ImageError::Argument(format!(
                "未知导出格式：{}（可选：jpeg / png）",
                other
            ))),
        }
    }
}

/// 解码得到的像素数组。
///
/// `Rgb` 为规范形态，形状 `(height, width, 3)`；`Gray` 仅在显式要求灰度时产生。
#[derive(Debug, Clone, PartialEq)]
pub enum PixelArray {
    Rgb(RgbImage),
    Gray(GrayImage),
}

impl PixelArray {
    /// 返回 `(height, width, channels)`。
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.height() as usize,
            self.width() as usize,
            self.channels(),
        )
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb(_) => 3,
            Self::Gray(_) => 1,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Self::Rgb(img) => img.width(),
            Self::Gray(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Rgb(img) => img.height(),
            Self::Gray(img) => img.height(),
        }
    }

    /// 按行优先、通道交错排列的原始样本。
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Rgb(img) => img.as_raw(),
            Self::Gray(img) => img.as_raw(),
        }
    }

    /// 转为规范 RGB 形态；灰度会复制到三个通道。
    pub fn into_rgb(self) -> RgbImage {
        match self {
            Self::Rgb(img) => img,
            Self::Gray(img) => DynamicImage::ImageLuma8(img).to_rgb8(),
        }
    }
}

/// 将编码后的图片字节解码为像素数组。
///
/// `grayscale` 为 `true` 时输出单通道灰度，否则输出 RGB。
pub fn decode_to_array(blob: &[u8], grayscale: bool) -> Result<PixelArray> {
    let decoded = decode_dynamic(blob)?;
    let array = if grayscale {
        PixelArray::Gray(decoded.to_luma8())
    } else {
        PixelArray::Rgb(decoded.to_rgb8())
    };

    log::debug!(
        "🧩 图片解码完成 - 尺寸: {}x{} 通道: {}",
        array.width(),
        array.height(),
        array.channels()
    );
    Ok(array)
}

/// 解码为规范 RGB 数组。
pub fn decode_to_rgb(blob: &[u8]) -> Result<RgbImage> {
    Ok(decode_dynamic(blob)?.to_rgb8())
}

/// 以固定格式（JPEG，质量 75）重新编码数组。
pub fn encode_from_array(array: &RgbImage) -> Result<Vec<u8>> {
    encode_with_format(array, ExportFormat::Jpeg, DEFAULT_JPEG_QUALITY)
}

/// 以指定格式重新编码数组。`quality` 仅对 JPEG 生效。
pub fn encode_with_format(array: &RgbImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    if array.width() == 0 || array.height() == 0 {
        return Err(ImageError::Encode(format!(
            "无法编码空图片：{}x{}",
            array.width(),
            array.height()
        )));
    }

    let mut buffer = Vec::new();
    match format {
        ExportFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            encoder
                .encode_image(array)
                .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;
        }
        ExportFormat::Png => {
            array
                .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;
        }
    }

    Ok(buffer)
}

/// 由交错排列的 RGB 样本构建规范数组，长度必须为 `width * height * 3`。
pub fn rgb_from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<RgbImage> {
    let actual = samples.len();
    RgbImage::from_raw(width, height, samples).ok_or_else(|| {
        ImageError::Argument(format!(
            "像素数据长度异常：{} 字节（期望 {}x{}x3）",
            actual, width, height
        ))
    })
}

pub fn rgb_to_dynamic(array: &RgbImage) -> DynamicImage {
    DynamicImage::ImageRgb8(array.clone())
}

pub fn rgb_from_dynamic(image: DynamicImage) -> RgbImage {
    image.to_rgb8()
}

pub fn rgb_to_gray(array: &RgbImage) -> GrayImage {
    image::imageops::grayscale(array)
}

/// 输出 BGR 通道顺序的交错字节，供只接受 BGR 的下游使用。
pub fn rgb_to_bgr_bytes(array: &RgbImage) -> Vec<u8> {
    array
        .pixels()
        .flat_map(|pixel| {
            let [r, g, b] = pixel.0;
            [b, g, r]
        })
        .collect()
}

/// 仅通过图片头信息读取宽高。
///
/// 用于在完整解码前做像素上限检查。
pub(crate) fn inspect_dimensions(blob: &[u8]) -> Result<(u32, u32)> {
    validate_image_signature(blob)?;
    ImageReader::new(Cursor::new(blob))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn decode_dynamic(blob: &[u8]) -> Result<DynamicImage> {
    validate_image_signature(blob)?;
    image::guess_format(blob)
        .map_err(|e| ImageError::Decode(format!("不支持的图片格式：{}", e)))?;
    image::load_from_memory(blob).map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
///
/// 签名无法识别时交给 `image` 的格式猜测继续判断，
/// 只有明确识别为非图片类型时才在这里拒绝。
fn validate_image_signature(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }
    }

    Ok(())
}
