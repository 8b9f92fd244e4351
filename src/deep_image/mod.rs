//! # 图片对象模块（deep_image）
//!
//! ## 设计思路
//!
//! 在无状态的转换库之上提供一个有状态的图片对象：
//! 调用方只需给出一种来源，之后的缩放、导出、哈希、标注与显示都围绕同一份像素数组进行。
//!
//! - `config`：每个对象独立持有的策略配置
//! - `source`：来源参数集合与“恰好一种来源”的校验
//! - `draw`：标注框与文字绘制
//! - `viewer`：显示协作者
//! - `object`：`DeepImage` 本体

mod config;
mod draw;
mod object;
mod source;
mod viewer;

pub use config::ImageConfig;
pub use draw::{BoxColors, BoxRect, BoxStyle};
pub use object::{DeepImage, ResizeTarget};
pub use source::{ImageSource, ImageSources};
pub use viewer::{ImageViewer, SystemViewer};
