//! # 文件读写模块
//!
//! 整文件读入内存、整缓冲写出（截断创建），以及按扩展名列目录。
//!
//! `list_files_by_extension` 比较宽松：目录不存在或不可读时返回空列表而不是错误，
//! 调用方需要区分“目录为空”与“目录不存在”时应自行检查路径。

use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use regex::Regex;

use super::codec::{ExportFormat, decode_to_rgb, encode_with_format};
use super::text::binary_to_base64;
use crate::error::{ImageError, Result};

/// 读取整个文件的原始字节。
pub fn read_binary(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        ImageError::Io(format!("无法读取图片文件 {}：{}", path.display(), e))
    })
}

/// 读取文件并解码为 RGB 数组。
pub fn read_array(path: impl AsRef<Path>) -> Result<RgbImage> {
    decode_to_rgb(&read_binary(path)?)
}

/// 读取文件并编码为 Base64 文本（不经过重新编码，保留原始字节）。
pub fn read_base64(path: impl AsRef<Path>) -> Result<String> {
    Ok(binary_to_base64(&read_binary(path)?))
}

/// 编码数组并写入文件，已存在的文件会被直接覆盖。
///
/// 输出格式由扩展名决定；没有可识别扩展名时使用 `fallback` 格式。
pub fn write_array(
    array: &RgbImage,
    path: impl AsRef<Path>,
    fallback: ExportFormat,
    jpeg_quality: u8,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = match ImageFormat::from_path(path).ok() {
        Some(format) => match ExportFormat::from_image_format(format) {
            Some(export) => encode_with_format(array, export, jpeg_quality)?,
            None => encode_other_format(array, format)?,
        },
        None => encode_with_format(array, fallback, jpeg_quality)?,
    };

    std::fs::write(path, &bytes).map_err(|e| {
        ImageError::Io(format!("无法写入图片文件 {}：{}", path.display(), e))
    })?;

    log::info!(
        "💾 图片已写入 - 路径: {} 大小: {} 字节",
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// 列出目录下匹配任一模式（如 `*.jpg`）的文件，大小写不敏感，结果去重。
///
/// 只匹配文件名，不递归子目录。目录不存在时返回空列表。
pub fn list_files_by_extension(directory: impl AsRef<Path>, patterns: &[&str]) -> Vec<PathBuf> {
    let directory = directory.as_ref();
    let matchers: Vec<Regex> = patterns
        .iter()
        .filter_map(|pattern| match glob_to_regex(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::warn!("⚠️ 忽略无效的文件模式 {}：{}", pattern, err);
                None
            }
        })
        .collect();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("目录不可读，返回空列表 - 路径: {} 错误: {}", directory.display(), err);
            return Vec::new();
        }
    };

    let mut found = BTreeSet::new();
    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if matchers.iter().any(|regex| regex.is_match(&name)) {
            found.insert(entry.path());
        }
    }

    found.into_iter().collect()
}

fn glob_to_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let mut expr = String::from("(?i)^");
    for ch in pattern.trim().chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr)
}

fn encode_other_format(array: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    array
        .write_to(&mut Cursor::new(&mut buffer), format)
        .map_err(|e| ImageError::Encode(format!("{:?} 编码失败：{}", format, e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DEFAULT_JPEG_QUALITY;
    use image::Rgb;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").expect("write fixture failed");
    }

    #[test]
    fn list_files_matches_extensions_case_insensitively() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "B.JPG");
        touch(dir.path(), "c.Png");
        touch(dir.path(), "notes.txt");

        let mut names: Vec<String> = list_files_by_extension(dir.path(), &["*.jpg", "*.png"])
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();

        assert_eq!(names, vec!["B.JPG", "a.jpg", "c.Png"]);
    }

    #[test]
    fn list_files_deduplicates_overlapping_patterns() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        touch(dir.path(), "cat.jpg");

        let found = list_files_by_extension(dir.path(), &["*.jpg", "*.JPG", "cat.*"]);

        assert_eq!(found.len(), 1);
    }

    #[test]
    fn list_files_skips_directories() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        fs::create_dir(dir.path().join("album.jpg")).expect("mkdir failed");

        assert!(list_files_by_extension(dir.path(), &["*.jpg"]).is_empty());
    }

    #[test]
    fn list_files_returns_empty_for_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir failed");

        let found = list_files_by_extension(dir.path().join("missing"), &["*.jpg"]);

        assert!(found.is_empty());
    }

    #[test]
    fn write_array_picks_format_from_extension() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let array = RgbImage::from_pixel(8, 6, Rgb([1, 2, 3]));
        let png_path = dir.path().join("out.png");
        let jpg_path = dir.path().join("out.jpeg");

        write_array(&array, &png_path, ExportFormat::Jpeg, DEFAULT_JPEG_QUALITY).expect("write png failed");
        write_array(&array, &jpg_path, ExportFormat::Png, DEFAULT_JPEG_QUALITY).expect("write jpeg failed");

        let png_bytes = read_binary(&png_path).expect("read png failed");
        let jpg_bytes = read_binary(&jpg_path).expect("read jpeg failed");
        assert_eq!(image::guess_format(&png_bytes).expect("guess failed"), ImageFormat::Png);
        assert_eq!(image::guess_format(&jpg_bytes).expect("guess failed"), ImageFormat::Jpeg);
        assert_eq!(read_array(&png_path).expect("decode failed"), array);
    }

    #[test]
    fn write_array_uses_fallback_without_extension() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("snapshot");

        write_array(&RgbImage::new(4, 4), &path, ExportFormat::Png, DEFAULT_JPEG_QUALITY)
            .expect("write failed");

        let bytes = read_binary(&path).expect("read failed");
        assert_eq!(image::guess_format(&bytes).expect("guess failed"), ImageFormat::Png);
    }

    #[test]
    fn write_array_reports_unwritable_path() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("no-such-dir").join("out.png");

        let result = write_array(&RgbImage::new(2, 2), &path, ExportFormat::Png, DEFAULT_JPEG_QUALITY);

        assert!(matches!(result, Err(ImageError::Io(_))));
    }

    #[test]
    fn read_base64_keeps_original_bytes() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"raw bytes").expect("write failed");

        assert_eq!(read_base64(&path).expect("read failed"), binary_to_base64(b"raw bytes"));
    }

    #[test]
    fn read_binary_reports_missing_file() {
        assert!(matches!(
            read_binary("/definitely/not/here.jpg"),
            Err(ImageError::Io(_))
        ));
    }
}
