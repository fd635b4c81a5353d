/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : IDX 二进制格式读写（支持 .gz 压缩）
 *
 * IDX 图像文件：
 * - [0-3] magic number (0x00000803 = 2051)
 * - [4-7] 图像数量
 * - [8-11] 行数
 * - [12-15] 列数
 * - [16+] 像素数据 (unsigned byte)
 *
 * IDX 标签文件：
 * - [0-3] magic number (0x00000801 = 2049)
 * - [4-7] 标签数量
 * - [8+] 标签数据 (unsigned byte)
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use ndarray::{Array1, Array3, ArrayBase, Data, Ix1, Ix3};

use super::error::DataError;

pub const IMAGES_MAGIC: u32 = 2051;
pub const LABELS_MAGIC: u32 = 2049;

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn open_reader(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    let reader: Box<dyn Read> = if is_gz(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// 写出字节流，`.gz` 扩展名时压缩
fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    let file = File::create(path)?;
    if is_gz(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(bytes)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    Ok(())
}

/// 读取大端序 u32 头部字段
fn read_header<const N: usize>(reader: &mut dyn Read) -> Result<[u32; N], DataError> {
    let mut fields = [0u32; N];
    for field in &mut fields {
        let mut bytes = [0u8; 4];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| DataError::FormatError(format!("读取头部失败: {e}")))?;
        *field = u32::from_be_bytes(bytes);
    }
    Ok(fields)
}

/// 读取恰好 `expected` 字节的数据体
///
/// 按实际读到的字节增长缓冲区，头部声明的长度不会被预先分配。
fn read_body(reader: &mut dyn Read, expected: usize, what: &str) -> Result<Vec<u8>, DataError> {
    let mut body = Vec::new();
    reader
        .take(expected as u64)
        .read_to_end(&mut body)
        .map_err(|e| DataError::FormatError(format!("读取{what}数据失败: {e}")))?;
    if body.len() != expected {
        return Err(DataError::FormatError(format!(
            "{what}数据被截断: 头部声明 {expected} 字节, 实际 {} 字节",
            body.len()
        )));
    }
    Ok(body)
}

fn check_magic(magic: u32, expected: u32) -> Result<(), DataError> {
    if magic != expected {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {expected})"
        )));
    }
    Ok(())
}

/// 解析 IDX 图像文件，返回形状 [N, H, W] 的原始像素
pub fn read_images(path: &Path) -> Result<Array3<u8>, DataError> {
    let mut reader = open_reader(path)?;
    let [magic, count, rows, cols] = read_header::<4>(reader.as_mut())?;
    check_magic(magic, IMAGES_MAGIC)?;

    let (count, rows, cols) = (count as usize, rows as usize, cols as usize);
    let expected = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| {
            DataError::FormatError(format!("头部尺寸溢出: {count} x {rows} x {cols}"))
        })?;
    let pixels = read_body(reader.as_mut(), expected, "像素")?;

    Array3::from_shape_vec((count, rows, cols), pixels)
        .map_err(|e| DataError::FormatError(format!("像素数据形状错误: {e}")))
}

/// 解析 IDX 标签文件，返回形状 [N] 的原始标签
pub fn read_labels(path: &Path) -> Result<Array1<u8>, DataError> {
    let mut reader = open_reader(path)?;
    let [magic, count] = read_header::<2>(reader.as_mut())?;
    check_magic(magic, LABELS_MAGIC)?;

    let labels = read_body(reader.as_mut(), count as usize, "标签")?;
    Ok(Array1::from(labels))
}

/// 写出 IDX 图像文件（扩展名为 .gz 时自动压缩）
pub fn write_images<S>(path: &Path, images: &ArrayBase<S, Ix3>) -> Result<(), DataError>
where
    S: Data<Elem = u8>,
{
    let (count, rows, cols) = images.dim();
    let mut bytes = Vec::with_capacity(16 + images.len());
    for field in [IMAGES_MAGIC, count as u32, rows as u32, cols as u32] {
        bytes.extend_from_slice(&field.to_be_bytes());
    }
    bytes.extend(images.iter().copied());
    write_bytes(path, &bytes)
}

/// 写出 IDX 标签文件（扩展名为 .gz 时自动压缩）
pub fn write_labels<S>(path: &Path, labels: &ArrayBase<S, Ix1>) -> Result<(), DataError>
where
    S: Data<Elem = u8>,
{
    let mut bytes = Vec::with_capacity(8 + labels.len());
    for field in [LABELS_MAGIC, labels.len() as u32] {
        bytes.extend_from_slice(&field.to_be_bytes());
    }
    bytes.extend(labels.iter().copied());
    write_bytes(path, &bytes)
}
