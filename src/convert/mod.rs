//! # 转换库模块（convert）
//!
//! ## 设计思路
//!
//! 图片在流水线中会以多种形态出现：磁盘文件、网络地址、二进制字节、Base64 文本、
//! Data URI 与像素数组。本模块把这些形态之间的转换收敛为一组无状态函数，
//! 每次调用相互独立，除显式的文件 / 网络读取外没有副作用。
//!
//! - `codec`：字节 ⇄ 像素数组（解码、固定格式编码、颜色通道转换）
//! - `text`：二进制 ⇄ Base64 ⇄ Data URI，以及内容哈希
//! - `fetch`：HTTP 下载（固定 User-Agent + 超时）
//! - `geometry`：约束尺寸计算与重采样
//! - `files`：文件读写与按扩展名列目录
//!
//! ## 实现思路
//!
//! 所有像素数据统一以 RGB 8 位（`image::RgbImage`）作为规范形态，
//! 灰度只在调用方显式要求时产生，不作为存储形态。
//!
//! ```text
//! 文件 / URL / Base64 / 二进制
//!        ↓ decode_to_array
//!    RgbImage（规范像素数组）
//!        ↓ encode_from_array（固定 JPEG）
//!    二进制 → Base64 → Data URI / 内容哈希
//! ```

mod codec;
mod fetch;
mod files;
mod geometry;
mod text;

pub use codec::{
    DEFAULT_JPEG_QUALITY,
    ExportFormat,
    PixelArray,
    decode_to_array,
    decode_to_rgb,
    encode_from_array,
    encode_with_format,
    rgb_from_dynamic,
    rgb_from_raw,
    rgb_to_bgr_bytes,
    rgb_to_dynamic,
    rgb_to_gray,
};
pub(crate) use codec::inspect_dimensions;
pub use fetch::{
    DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
    FetchOptions,
    FetchedImage,
    fetch_from_url,
    fetch_from_url_async,
    fetch_from_url_with,
};
pub use files::{list_files_by_extension, read_array, read_base64, read_binary, write_array};
pub use geometry::{ResizeFilter, compute_constrained_dimensions, resize_rgb};
pub use text::{
    DATA_URI_PREFIX,
    base64_to_binary,
    base64_to_binary_with_limit,
    base64_to_data_uri,
    binary_to_base64,
    content_hash,
};
