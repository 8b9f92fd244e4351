//! # deepimage — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 deep_image（有状态图片对象）              │
//! │                                                          │
//! │  ImageSources ──→ ImageSource ──→ DeepImage              │
//! │   (参数集合)       (恰好一种)       ├─ resize            │
//! │                                    ├─ to_binary/base64   │
//! │  ImageConfig (每个对象独立持有)     ├─ content_hash      │
//! │                                    ├─ draw_boxes → 新对象│
//! │                                    └─ show → ImageViewer │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ 仅调用无状态函数
//! ┌───────┴──────────────────────────────────────────────────┐
//! │                 convert（无状态转换库）                   │
//! │                                                          │
//! │  codec ──── 字节 ⇄ RgbImage（infer 校验 + image 解码）    │
//! │  text ───── 二进制 ⇄ Base64 ⇄ Data URI，SHA-256 哈希     │
//! │  fetch ──── reqwest 下载（User-Agent + 超时）             │
//! │  geometry ─ 约束尺寸 + fast_image_resize 重采样           │
//! │  files ──── 文件读写 + 按扩展名列目录                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `ImageError` |
//! | [`convert`] | 格式之间的无状态转换、下载与文件工具 |
//! | [`deep_image`] | 图片对象：构造、缩放、导出、哈希、标注、显示 |

pub mod convert;
pub mod deep_image;
pub mod error;

pub use deep_image::{
    BoxColors,
    BoxRect,
    BoxStyle,
    DeepImage,
    ImageConfig,
    ImageSource,
    ImageSources,
    ImageViewer,
    ResizeTarget,
    SystemViewer,
};
pub use error::{ImageError, Result};
