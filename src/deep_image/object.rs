//! # 图片对象
//!
//! ## 设计思路
//!
//! `DeepImage` 独占一份规范 RGB 像素数组，外加一个缓存的引用字符串（Data URI）。
//! 构造只有一次状态迁移：要么完整成功（数组就绪、引用已缓存），要么返回错误，
//! 不存在半初始化的对象。
//!
//! ## 实现思路
//!
//! - 构造时按来源路由到转换库：文件 / 二进制 / Base64 走解码，URL 先下载再解码，数组直接采用。
//! - 所有导出（二进制 / Base64 / Data URI / 哈希）都是当前数组的纯函数，每次调用重新编码。
//! - 引用字符串只在构造时计算。原地缩放（或经 `to_array_mut` 修改）不会自动刷新它，
//!   而是标记为过期；需要时调用 `refresh_reference` 显式重算。
//! - 标注总是返回新对象，原对象保持不变。

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GrayImage, RgbImage};

use super::draw::{BoxRect, BoxStyle, draw_boxes_on};
use super::viewer::{ImageViewer, SystemViewer};
use super::{ImageConfig, ImageSource, ImageSources};
use crate::convert::{
    ExportFormat,
    base64_to_binary_with_limit,
    base64_to_data_uri,
    binary_to_base64,
    compute_constrained_dimensions,
    content_hash,
    decode_to_rgb,
    encode_with_format,
    fetch_from_url_async,
    fetch_from_url_with,
    inspect_dimensions,
    resize_rgb,
    rgb_to_bgr_bytes,
    rgb_to_dynamic,
    rgb_to_gray,
    write_array,
};
use crate::error::{ImageError, Result};

/// 缩放目标：显式尺寸或最长边约束，二者取其一。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// 目标高度与宽度。
    Exact { height: u32, width: u32 },
    /// 最长边上限，另一边按比例缩放。
    MaxDim(u32),
}

impl ResizeTarget {
    /// 由两个可选参数构建，未提供或同时提供时返回 `Argument` 错误。
    ///
    /// `new_size` 为 `(height, width)`。
    pub fn from_options(new_size: Option<(u32, u32)>, max_dim: Option<u32>) -> Result<Self> {
        match (new_size, max_dim) {
            (Some((height, width)), None) => Ok(Self::Exact { height, width }),
            (None, Some(max_dim)) => Ok(Self::MaxDim(max_dim)),
            (None, None) => Err(ImageError::Argument(
                "缩放需要提供 new_size 或 max_dim 之一".to_string(),
            )),
            (Some(_), Some(_)) => Err(ImageError::Argument(
                "new_size 与 max_dim 不能同时提供".to_string(),
            )),
        }
    }
}

/// 图片对象。
///
/// `Clone` 会深拷贝像素数组，两个对象之间不存在共享的可变像素状态。
#[derive(Debug, Clone)]
pub struct DeepImage {
    /// 规范像素数组：`(height, width, 3)`，RGB 顺序。
    array: RgbImage,
    /// 构造时计算的 Data URI。
    reference: String,
    reference_stale: bool,
    config: ImageConfig,
}

impl DeepImage {
    // -- 构造 -----------------------------------------------------------------

    /// 从参数集合构造，使用默认配置。
    ///
    /// # 示例
    /// ```rust
    /// use deepimage::{DeepImage, ImageSources};
    /// use image::{Rgb, RgbImage};
    ///
    /// let array = RgbImage::from_pixel(4, 3, Rgb([200, 10, 10]));
    /// let img = DeepImage::new(ImageSources::default().with_array(array))?;
    /// assert_eq!((img.width(), img.height()), (4, 3));
    /// assert!(img.reference().starts_with("data:image/jpeg;base64,"));
    /// # Ok::<(), deepimage::ImageError>(())
    /// ```
    pub fn new(sources: ImageSources) -> Result<Self> {
        Self::from_sources_with_config(sources, ImageConfig::default())
    }

    pub fn from_sources_with_config(sources: ImageSources, config: ImageConfig) -> Result<Self> {
        Self::from_source(sources.into_single()?, config)
    }

    /// 从单一来源构造。
    pub fn from_source(source: ImageSource, config: ImageConfig) -> Result<Self> {
        config.validate()?;
        let kind = source.kind();
        let load_start = Instant::now();

        let array = match source {
            ImageSource::FilePath(path) => Self::load_file(&path, &config)?,
            ImageSource::Url(url) => {
                let fetched = fetch_from_url_with(&url, &config.fetch_options())?;
                Self::decode_checked(&fetched.bytes, &config)?
            }
            ImageSource::Binary(bytes) => Self::decode_checked(&bytes, &config)?,
            ImageSource::Base64(text) => {
                let bytes = base64_to_binary_with_limit(&text, config.max_file_size)?;
                Self::decode_checked(&bytes, &config)?
            }
            ImageSource::Array(array) => {
                config.validate_pixel_limits(array.width(), array.height())?;
                array
            }
        };

        Self::from_canonical(array, config, kind, load_start)
    }

    /// 异步下载后构造，供已运行在 tokio 中的调用方使用。
    pub async fn from_url_async(url: &str, config: ImageConfig) -> Result<Self> {
        config.validate()?;
        let load_start = Instant::now();

        let fetched = fetch_from_url_async(url, &config.fetch_options()).await?;
        let array = Self::decode_checked(&fetched.bytes, &config)?;

        Self::from_canonical(array, config, "url", load_start)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_source(
            ImageSource::FilePath(path.as_ref().to_path_buf()),
            ImageConfig::default(),
        )
    }

    /// 阻塞下载后构造。
    ///
    /// 内部使用 `reqwest::blocking`，不能在 tokio 运行时内调用；
    /// 异步调用方请使用 [`Self::from_url_async`]。
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::from_source(ImageSource::Url(url.into()), ImageConfig::default())
    }

    pub fn from_binary(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_source(ImageSource::Binary(bytes.into()), ImageConfig::default())
    }

    pub fn from_base64(text: impl Into<String>) -> Result<Self> {
        Self::from_source(ImageSource::Base64(text.into()), ImageConfig::default())
    }

    pub fn from_array(array: RgbImage) -> Result<Self> {
        Self::from_source(ImageSource::Array(array), ImageConfig::default())
    }

    fn from_canonical(
        array: RgbImage,
        config: ImageConfig,
        kind: &'static str,
        load_start: Instant,
    ) -> Result<Self> {
        let load_elapsed = load_start.elapsed();

        let reference_start = Instant::now();
        let reference = Self::derive_reference(&array, &config)
            .map_err(|e| ImageError::Construction(format!("无法生成图片引用：{}", e)))?;
        let reference_elapsed = reference_start.elapsed();

        log::info!(
            "✅ 图片对象就绪 - 来源: {} 尺寸: {}x{} load={}ms reference={}ms",
            kind,
            array.width(),
            array.height(),
            load_elapsed.as_millis(),
            reference_elapsed.as_millis()
        );

        Ok(Self {
            array,
            reference,
            reference_stale: false,
            config,
        })
    }

    /// 从本地路径读取并解码。文件缺失或不可读属于构造错误。
    fn load_file(path: &Path, config: &ImageConfig) -> Result<RgbImage> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(ImageError::Construction(format!(
                "文件不存在：{}",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| ImageError::Construction(format!("无法读取文件信息：{}", e)))?;
        config.validate_file_size(metadata.len())?;

        let bytes = std::fs::read(path)
            .map_err(|e| ImageError::Construction(format!("无法读取图片文件：{}", e)))?;
        Self::decode_checked(&bytes, config)
    }

    /// 先读头部尺寸做像素上限检查，再完整解码。
    fn decode_checked(bytes: &[u8], config: &ImageConfig) -> Result<RgbImage> {
        config.validate_file_size(bytes.len() as u64)?;
        let (width, height) = inspect_dimensions(bytes)?;
        config.validate_pixel_limits(width, height)?;
        decode_to_rgb(bytes)
    }

    fn derive_reference(array: &RgbImage, config: &ImageConfig) -> Result<String> {
        let blob = encode_with_format(array, config.export_format, config.jpeg_quality)?;
        Ok(base64_to_data_uri(&binary_to_base64(&blob)))
    }

    // -- 查询 -----------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.array.width()
    }

    pub fn height(&self) -> u32 {
        self.array.height()
    }

    /// 返回 `(height, width, channels)`。
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.array.height() as usize, self.array.width() as usize, 3)
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 构造时缓存的引用（Data URI）。
    ///
    /// 原地修改后它不会自动更新，见 [`Self::is_reference_stale`]。
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn is_reference_stale(&self) -> bool {
        self.reference_stale
    }

    /// 按当前数组重新计算引用。
    pub fn refresh_reference(&mut self) -> Result<&str> {
        self.reference = Self::derive_reference(&self.array, &self.config)?;
        self.reference_stale = false;
        Ok(&self.reference)
    }

    // -- 导出 -----------------------------------------------------------------

    /// 借用规范像素数组。
    pub fn to_array(&self) -> &RgbImage {
        &self.array
    }

    /// 可变借用像素数组。
    ///
    /// 直接修改数组会绕过缩放 / 标注的不变量维护，由调用方负责；
    /// 调用后引用字符串被标记为过期。
    pub fn to_array_mut(&mut self) -> &mut RgbImage {
        self.reference_stale = true;
        &mut self.array
    }

    pub fn into_array(self) -> RgbImage {
        self.array
    }

    /// 以配置的导出格式重新编码。
    ///
    /// 重新编码可能有损：导出再解码得到的数组与原数组只保证在编码误差内一致。
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        encode_with_format(&self.array, self.config.export_format, self.config.jpeg_quality)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(binary_to_base64(&self.to_binary()?))
    }

    /// 当前数组的 Data URI，每次调用重新计算。
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(base64_to_data_uri(&self.to_base64()?))
    }

    /// 对无损（PNG）编码的 Base64 文本求 SHA-256，作为内容寻址的键。
    ///
    /// 不使用配置的导出格式：JPEG 量化会吞掉单个像素的细微差异，
    /// 而任意一个像素不同的两个数组必须得到不同的哈希。
    pub fn content_hash(&self) -> Result<String> {
        Ok(content_hash(binary_to_base64(&self.lossless_binary()?).as_bytes()))
    }

    /// 对无损（PNG）编码的原始字节求 SHA-256。与 [`Self::content_hash`] 的结果不同，不能混用。
    pub fn binary_hash(&self) -> Result<String> {
        Ok(content_hash(&self.lossless_binary()?))
    }

    fn lossless_binary(&self) -> Result<Vec<u8>> {
        encode_with_format(&self.array, ExportFormat::Png, self.config.jpeg_quality)
    }

    pub fn to_gray(&self) -> GrayImage {
        rgb_to_gray(&self.array)
    }

    /// BGR 顺序的交错字节。
    pub fn to_bgr_bytes(&self) -> Vec<u8> {
        rgb_to_bgr_bytes(&self.array)
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        rgb_to_dynamic(&self.array)
    }

    /// 编码并写入文件，已存在的文件会被覆盖。格式由扩展名决定。
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        write_array(
            &self.array,
            path,
            self.config.export_format,
            self.config.jpeg_quality,
        )
    }

    // -- 变换 -----------------------------------------------------------------

    /// 原地缩放。不会刷新引用字符串，只将其标记为过期。
    pub fn resize(&mut self, target: ResizeTarget) -> Result<()> {
        let (width, height) = match target {
            ResizeTarget::Exact { height, width } => (width, height),
            ResizeTarget::MaxDim(0) => {
                return Err(ImageError::Argument("max_dim 必须大于 0".to_string()));
            }
            ResizeTarget::MaxDim(max_dim) => {
                compute_constrained_dimensions(self.width(), self.height(), max_dim)
            }
        };

        log::debug!(
            "📐 缩放图片：{}x{} -> {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );

        self.array = resize_rgb(&self.array, width, height, self.config.resize_filter)?;
        self.reference_stale = true;
        Ok(())
    }

    /// 以可选参数形式缩放：`new_size` 为 `(height, width)`，与 `max_dim` 二选一。
    pub fn resize_with(&mut self, new_size: Option<(u32, u32)>, max_dim: Option<u32>) -> Result<()> {
        self.resize(ResizeTarget::from_options(new_size, max_dim)?)
    }

    /// 绘制标注框，返回新的图片对象，原对象不变。
    ///
    /// `labels` 为空时不绘制文字，否则数量必须与 `boxes` 一致。
    pub fn draw_boxes(&self, boxes: &[BoxRect], style: &BoxStyle, labels: &[&str]) -> Result<Self> {
        let mut canvas = self.array.clone();
        draw_boxes_on(&mut canvas, boxes, style, labels, self.config.default_color())?;

        log::debug!("🖍️ 已绘制 {} 个标注框", boxes.len());
        Self::from_canonical(canvas, self.config.clone(), "annotation", Instant::now())
    }

    // -- 显示 -----------------------------------------------------------------

    /// 用系统默认查看器显示。
    pub fn show(&self, title: &str) -> Result<()> {
        self.show_with(&SystemViewer::default(), title)
    }

    /// 将数组与标题原样交给显示协作者。
    pub fn show_with(&self, viewer: &dyn ImageViewer, title: &str) -> Result<()> {
        viewer.show(&self.array, title)
    }
}
