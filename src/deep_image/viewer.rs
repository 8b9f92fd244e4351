//! # 显示协作者
//!
//! 图片对象只负责把像素数组与标题原样交给 `ImageViewer`，
//! 具体如何展示由实现方决定。默认实现 `SystemViewer` 先写出临时 PNG，
//! 再交给操作系统的默认图片查看器打开。

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbImage;

use crate::convert::{DEFAULT_JPEG_QUALITY, ExportFormat, write_array};
use crate::error::{ImageError, Result};

/// 显示协作者。
pub trait ImageViewer {
    fn show(&self, array: &RgbImage, title: &str) -> Result<()>;
}

/// 通过系统默认查看器显示图片。
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    /// 临时文件目录，未设置时使用系统临时目录。
    pub temp_dir: Option<PathBuf>,
}

impl SystemViewer {
    /// 写出预览文件并返回路径，文件名包含经过清洗的标题。
    pub fn write_preview(&self, array: &RgbImage, title: &str) -> Result<PathBuf> {
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = dir.join(format!(
            "{}-{}-{}.png",
            sanitize_title(title),
            std::process::id(),
            stamp
        ));

        write_array(array, &path, ExportFormat::Png, DEFAULT_JPEG_QUALITY)?;
        Ok(path)
    }
}

impl ImageViewer for SystemViewer {
    fn show(&self, array: &RgbImage, title: &str) -> Result<()> {
        let path = self.write_preview(array, title)?;
        log::info!("🖼️ 打开图片预览 - 标题: {} 文件: {}", title, path.display());

        open_command(&path)
            .spawn()
            .map(|_| ())
            .map_err(|e| ImageError::Io(format!("无法启动系统图片查看器：{}", e)))
    }
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(48)
        .collect();

    if cleaned.is_empty() {
        "deepimage".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn sanitize_title_replaces_path_characters() {
        assert_eq!(sanitize_title("../cat pic"), "___cat_pic");
        assert_eq!(sanitize_title("   "), "deepimage");
    }

    #[test]
    fn write_preview_creates_png_in_temp_dir() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let viewer = SystemViewer {
            temp_dir: Some(dir.path().to_path_buf()),
        };
        let array = RgbImage::from_pixel(3, 2, Rgb([9, 8, 7]));

        let path = viewer.write_preview(&array, "test image").expect("preview failed");

        assert!(path.starts_with(dir.path()));
        assert!(
            path.file_name()
                .map(|n| n.to_string_lossy().starts_with("test_image-"))
                .unwrap_or(false)
        );
        let bytes = std::fs::read(&path).expect("read preview failed");
        assert_eq!(image::load_from_memory(&bytes).expect("decode failed").to_rgb8(), array);
    }
}
