//! # 文本形态转换模块
//!
//! 二进制 ⇄ Base64 ⇄ Data URI，以及内容哈希。
//!
//! 注意：内容哈希计算的是调用方传入的那一种表示。图片对象约定对 Base64 文本求哈希，
//! 同一张图片对原始二进制求哈希会得到不同的摘要，调用方必须始终对同一种表示求哈希。

use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

use crate::error::{ImageError, Result};

/// Data URI 前缀。MIME 固定声明为 JPEG，不随实际编码格式变化，
/// 调用方不能据此推断真实内容类型。
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// 标准字母表、无换行的 Base64 编码。
pub fn binary_to_base64(blob: &[u8]) -> String {
    general_purpose::STANDARD.encode(blob)
}

/// 解析 Base64 输入（支持 Data URL / 纯 Base64）。
pub fn base64_to_binary(text: &str) -> Result<Vec<u8>> {
    base64_to_binary_with_limit(text, u64::MAX)
}

/// 解析 Base64 输入，并在解码前按预计体积拒绝超限数据。
pub fn base64_to_binary_with_limit(text: &str, max_size: u64) -> Result<Vec<u8>> {
    let payload = strip_data_uri_prefix(text.trim())?;

    let estimated_len = estimate_decoded_upper_bound_len(payload)?;
    if estimated_len > max_size {
        return Err(ImageError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
}

/// 纯文本拼接，不校验内容的真实类型。
pub fn base64_to_data_uri(text: &str) -> String {
    format!("{}{}", DATA_URI_PREFIX, text)
}

/// SHA-256 摘要，小写十六进制。
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn strip_data_uri_prefix(text: &str) -> Result<&str> {
    if !text.starts_with("data:") {
        return Ok(text);
    }

    let marker = text
        .find(";base64,")
        .ok_or_else(|| ImageError::Decode("Data URI 缺少 base64 标记".to_string()))?;
    Ok(&text[marker + ";base64,".len()..])
}

fn estimate_decoded_upper_bound_len(payload: &str) -> Result<u64> {
    let len = payload.len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}
