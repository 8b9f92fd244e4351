//! # 网络加载模块
//!
//! ## 设计思路
//!
//! 每次 URL 构造只发起一次 HTTP GET，携带固定的 User-Agent 与有上限的超时。
//! 超时、无法连接、非 2xx 响应均作为普通失败返回，不会无限阻塞，也不会静默退化为空图片。
//!
//! ## 实现思路
//!
//! - 核心路径为阻塞调用（`reqwest::blocking`），与图片对象的同步模型一致。
//! - 另提供异步版本，供已运行在 tokio 中的调用方使用；两者共享响应校验逻辑。
//! - 失败在发生处记录日志后原样上抛，不做重试。
//! - 扩展名提示来自响应声明的 `Content-Type`，尽力而为，可能为空。

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, USER_AGENT};

use crate::error::{ImageError, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.9.0.7) Gecko/2009021910 Firefox/3.0.7";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// 下载参数。
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// 整个请求（连接 + 读取）的超时时间。
    pub timeout: Duration,
    pub user_agent: String,
    /// 允许下载的最大字节数。
    pub max_file_size: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// 下载结果：原始字节与扩展名提示（不含点号，如 `jpg`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub extension: Option<String>,
}

/// 使用默认参数（固定 User-Agent，10 秒超时）下载图片字节。
pub fn fetch_from_url(url: &str) -> Result<FetchedImage> {
    fetch_from_url_with(url, &FetchOptions::default())
}

/// 使用指定参数下载图片字节（阻塞）。
pub fn fetch_from_url_with(url: &str, options: &FetchOptions) -> Result<FetchedImage> {
    log::info!("🌐 开始下载图片 - URL: {}", redact_url_for_log(url));

    let result = fetch_blocking(url, options);
    log_outcome(url, &result);
    result
}

/// 异步下载图片字节，语义与 [`fetch_from_url_with`] 相同。
pub async fn fetch_from_url_async(url: &str, options: &FetchOptions) -> Result<FetchedImage> {
    log::info!("🌐 开始异步下载图片 - URL: {}", redact_url_for_log(url));

    let result = fetch_async(url, options).await;
    log_outcome(url, &result);
    result
}

fn fetch_blocking(url: &str, options: &FetchOptions) -> Result<FetchedImage> {
    let parsed = parse_http_url(url)?;
    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|e| ImageError::Fetch(format!("初始化 HTTP 客户端失败：{}", e)))?;

    let response = client
        .get(parsed)
        .header(USER_AGENT, options.user_agent.as_str())
        .send()
        .map_err(|e| map_reqwest_error(e, url, options))?;

    let extension = validate_response(response.status(), response.headers(), options)?;
    let bytes = response
        .bytes()
        .map_err(|e| map_reqwest_error(e, url, options))?;
    ensure_within_limit(bytes.len() as u64, options)?;

    Ok(FetchedImage {
        bytes: bytes.to_vec(),
        extension,
    })
}

async fn fetch_async(url: &str, options: &FetchOptions) -> Result<FetchedImage> {
    let parsed = parse_http_url(url)?;
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|e| ImageError::Fetch(format!("初始化 HTTP 客户端失败：{}", e)))?;

    let response = client
        .get(parsed)
        .header(USER_AGENT, options.user_agent.as_str())
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, url, options))?;

    let extension = validate_response(response.status(), response.headers(), options)?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(e, url, options))?;
    ensure_within_limit(bytes.len() as u64, options)?;

    Ok(FetchedImage {
        bytes: bytes.to_vec(),
        extension,
    })
}

fn log_outcome(url: &str, result: &Result<FetchedImage>) {
    match result {
        Ok(fetched) => log::info!(
            "✅ 图片下载完成 - URL: {} 大小: {} 字节 扩展名: {}",
            redact_url_for_log(url),
            fetched.bytes.len(),
            fetched.extension.as_deref().unwrap_or("<unknown>")
        ),
        Err(err) => log::error!(
            "❌ 图片下载失败 - URL: {} 错误: {}",
            redact_url_for_log(url),
            err
        ),
    }
}

fn parse_http_url(url: &str) -> Result<reqwest::Url> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| ImageError::Fetch(format!("无效的 URL：{}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ImageError::Fetch(format!("不支持的协议：{}", other))),
    }
}

/// 校验状态码与声明体积，返回扩展名提示。
fn validate_response(
    status: StatusCode,
    headers: &HeaderMap,
    options: &FetchOptions,
) -> Result<Option<String>> {
    if !status.is_success() {
        return Err(ImageError::Fetch(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status_message(status.as_u16())
        )));
    }

    let declared_len = headers
        .get(CONTENT_LENGTH)
        .and_then(|cl| cl.to_str().ok())
        .and_then(|cl| cl.parse::<u64>().ok());
    if let Some(size) = declared_len {
        ensure_within_limit(size, options)?;
    }

    Ok(headers
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(extension_from_content_type)
        .map(str::to_string))
}

fn ensure_within_limit(size: u64, options: &FetchOptions) -> Result<()> {
    if size > options.max_file_size {
        return Err(ImageError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            size as f64 / 1024.0 / 1024.0,
            options.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// 由 `Content-Type` 推断扩展名，忽略参数部分与大小写。
fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let extension = match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => return None,
    };
    Some(extension)
}

/// 统一映射 reqwest 错误到业务错误。
fn map_reqwest_error(e: reqwest::Error, url: &str, options: &FetchOptions) -> ImageError {
    let redacted = redact_url_for_log(url);
    let err_msg = e.to_string().replace(url, &redacted);

    if e.is_timeout() {
        ImageError::Fetch(format!(
            "下载超时（{}毫秒）：{}",
            options.timeout.as_millis(),
            err_msg
        ))
    } else if e.is_connect() {
        ImageError::Fetch(format!("无法连接：{}", err_msg))
    } else {
        ImageError::Fetch(format!("请求失败：{}", err_msg))
    }
}

/// 常见 HTTP 状态码文案。
fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        403 => "访问被拒绝",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

/// 日志中去掉查询串与片段，避免泄露令牌。
fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let path = parsed.path();

    format!("{}://{}{}{}", parsed.scheme(), host, port, path)
}
