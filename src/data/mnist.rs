//! MNIST 手写数字数据源
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 本地缓存目录
//! - 可选自动下载（带 MD5 校验）

use std::path::{Path, PathBuf};

use super::download::{compute_md5, download_file};
use super::error::DataError;
use super::idx::{read_images, read_labels};
use super::split::{DatasetSource, RawSplit, SplitKind};

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// MNIST 文件名及其 .gz 文件的 MD5
const MNIST_FILES: [(&str, &str); 4] = [
    ("train-images-idx3-ubyte", "f68b3c2dcbeaaa9fbdd348bbdeb94873"),
    ("train-labels-idx1-ubyte", "d53e105ee54ea40749a09fcbcd1e9432"),
    ("t10k-images-idx3-ubyte", "9fb629c4189551a2d022fa330f9573f3"),
    ("t10k-labels-idx1-ubyte", "ec29112dd5afa0611ce80d1b7f02629c"),
];

/// 图像边长
pub const MNIST_IMAGE_SIZE: usize = 28;
/// 标签取值个数（数字 0-9）
pub const MNIST_NUM_LABELS: usize = 10;

/// MNIST 数据源
///
/// 包含 60,000 个训练样本和 10,000 个测试样本。
/// 每个样本是 28x28 的灰度图像，标签为 0-9。
#[derive(Debug, Clone)]
pub struct MnistSource {
    root: PathBuf,
    download: bool,
}

impl MnistSource {
    /// # 参数
    /// - `root`: 数据目录，None 则使用默认 (`<cache>/mnist_trainer/datasets/mnist`)
    /// - `download`: true=自动下载缺失文件
    pub fn new(root: Option<&Path>, download: bool) -> Self {
        let root = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_data_dir().join("mnist"));
        Self { root, download }
    }

    /// 默认路径，自动下载
    pub fn with_defaults() -> Self {
        Self::new(None, true)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 加载单个划分
    pub fn load_split(&self, kind: SplitKind) -> Result<RawSplit, DataError> {
        let (images_file, labels_file) = match kind {
            SplitKind::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            SplitKind::Test => ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte"),
        };

        let images_path = self.ensure_file(images_file)?;
        let labels_path = self.ensure_file(labels_file)?;

        let images = read_images(&images_path)?;
        let labels = read_labels(&labels_path)?;

        let (_, rows, cols) = images.dim();
        if rows != MNIST_IMAGE_SIZE || cols != MNIST_IMAGE_SIZE {
            return Err(DataError::FormatError(format!(
                "无效的图像尺寸: {rows}x{cols} (期望 {MNIST_IMAGE_SIZE}x{MNIST_IMAGE_SIZE})"
            )));
        }

        tracing::debug!(split = %kind, samples = labels.len(), "MNIST 划分已解析");
        RawSplit::new(kind, images, labels)
    }

    /// 确保文件存在，必要时下载
    fn ensure_file(&self, base_name: &str) -> Result<PathBuf, DataError> {
        // 优先检查解压后的文件
        let uncompressed_path = self.root.join(base_name);
        let gz_path = self.root.join(format!("{base_name}.gz"));
        for cached in [&uncompressed_path, &gz_path] {
            if cached.exists() {
                match check_cached_file(base_name, cached)? {
                    CacheCheck::Verified => {
                        tracing::debug!(path = %cached.display(), "缓存 MD5 校验通过")
                    }
                    CacheCheck::Unverified => {
                        tracing::warn!(path = %cached.display(), "使用未经校验的缓存文件")
                    }
                    CacheCheck::Mismatch { expected, got } => tracing::warn!(
                        path = %cached.display(),
                        expected,
                        %got,
                        "缓存文件 MD5 与官方发布不一致，仍继续使用"
                    ),
                }
                return Ok(cached.clone());
            }
        }

        if !self.download {
            return Err(DataError::FileNotFound(uncompressed_path));
        }

        std::fs::create_dir_all(&self.root)?;
        let url = format!("{MNIST_BASE_URL}{base_name}.gz");
        download_file(&url, &gz_path, expected_md5(base_name))?;
        Ok(gz_path)
    }
}

impl Default for MnistSource {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DatasetSource for MnistSource {
    fn fetch(&self) -> Result<(RawSplit, RawSplit), DataError> {
        let train = self.load_split(SplitKind::Train)?;
        let test = self.load_split(SplitKind::Test)?;
        Ok((train, test))
    }

    fn num_labels(&self) -> usize {
        MNIST_NUM_LABELS
    }
}

/// 缓存文件的校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCheck {
    /// `.gz` 文件与已知 MD5 一致
    Verified,
    /// `.gz` 文件与已知 MD5 不一致
    Mismatch { expected: &'static str, got: String },
    /// 解压后的文件或未知文件名，没有可对照的 MD5
    Unverified,
}

/// 对照 `MNIST_FILES` 校验缓存文件
///
/// 只有 `.gz` 文件有已知 MD5。
pub fn check_cached_file(base_name: &str, path: &Path) -> Result<CacheCheck, DataError> {
    let is_gz = path.extension().is_some_and(|ext| ext == "gz");
    let Some(expected) = expected_md5(base_name).filter(|_| is_gz) else {
        return Ok(CacheCheck::Unverified);
    };
    let got = compute_md5(&std::fs::read(path)?);
    if got == expected {
        Ok(CacheCheck::Verified)
    } else {
        Ok(CacheCheck::Mismatch { expected, got })
    }
}

fn expected_md5(base_name: &str) -> Option<&'static str> {
    MNIST_FILES
        .iter()
        .find(|(name, _)| *name == base_name)
        .map(|&(_, md5)| md5)
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mnist_trainer")
        .join("datasets")
}
