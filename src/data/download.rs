//! MNIST 文件下载
//!
//! 响应体按块写入 `<dest>.part`，同时增量计算 MD5；校验通过后再重命名为目标文件，
//! 因此缓存目录里不会留下半截或损坏的 `.gz`。

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use super::error::DataError;

const CHUNK_SIZE: usize = 64 * 1024;

/// 下载 `url` 到 `dest_path`
///
/// 提供 `expected_md5` 时校验下载内容，不匹配返回 [`DataError::ChecksumMismatch`]。
/// 任何失败都会删除临时文件，`dest_path` 保持不存在。
pub fn download_file(
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    tracing::info!(%url, "正在下载");
    let part_path = partial_path(dest_path);

    let result = fetch_to(url, &part_path).and_then(|(digest, bytes)| {
        if let Some(expected) = expected_md5 {
            check_digest(expected, digest)?;
            tracing::debug!(md5 = expected, "MD5 校验通过");
        }
        std::fs::rename(&part_path, dest_path)?;
        Ok(bytes)
    });

    match result {
        Ok(bytes) => {
            tracing::info!(path = %dest_path.display(), bytes, "下载完成");
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&part_path);
            tracing::warn!(%url, error = %e, "下载失败");
            Err(e)
        }
    }
}

/// 流式写入文件，返回 (MD5 十六进制, 字节数)
fn fetch_to(url: &str, path: &Path) -> Result<(String, u64), DataError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::DownloadError(format!("HTTP 请求失败: {e}")))?;
    if response.status() != 200 {
        return Err(DataError::DownloadError(format!(
            "{url} 返回状态码 {}",
            response.status()
        )));
    }

    let mut reader = response.into_reader();
    let mut writer = BufWriter::new(File::create(path)?);
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| DataError::DownloadError(format!("读取响应失败: {e}")))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;

    Ok((format!("{:x}", hasher.finalize()), total))
}

fn partial_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn check_digest(expected: &str, actual: String) -> Result<(), DataError> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(DataError::ChecksumMismatch {
            expected: expected.to_string(),
            got: actual,
        })
    }
}

/// 校验内存中数据的 MD5
pub fn verify_md5(data: &[u8], expected: &str) -> Result<(), DataError> {
    check_digest(expected, compute_md5(data))
}

/// 计算 MD5，返回小写十六进制
pub fn compute_md5(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}
