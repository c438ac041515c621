//! 图片转码与本地上传目录
//!
//! 解码与编码都是 CPU 密集计算，在阻塞线程池中完成。

use std::path::{Path, PathBuf};

use application::{ImageConverter, ImageError, UploadStore};
use async_trait::async_trait;
use image::{codecs::webp::WebPEncoder, ExtendedColorType};
use tracing::debug;

/// 基于 `image` crate 的无损 WebP 转码器
#[derive(Debug, Clone, Default)]
pub struct WebpImageConverter;

impl WebpImageConverter {
    pub fn new() -> Self {
        Self
    }
}

fn encode_webp(input: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded =
        image::load_from_memory(input).map_err(|err| ImageError::Decode(err.to_string()))?;
    let rgba = decoded.to_rgba8();

    let mut output = Vec::new();
    WebPEncoder::new_lossless(&mut output)
        .encode(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| ImageError::Encode(err.to_string()))?;
    Ok(output)
}

#[async_trait]
impl ImageConverter for WebpImageConverter {
    async fn to_webp(&self, input: Vec<u8>) -> Result<Vec<u8>, ImageError> {
        let input_len = input.len();
        let output = tokio::task::spawn_blocking(move || encode_webp(&input))
            .await
            .map_err(|err| ImageError::Encode(err.to_string()))??;

        debug!(input_len, output_len = output.len(), "image converted to webp");
        Ok(output)
    }
}

/// 将上传文件写入本地目录，由静态文件服务对外提供
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 目录不存在时创建
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ImageError> {
        // 文件名由服务端生成，这里仍拒绝路径分隔符
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(ImageError::Storage(format!(
                "invalid upload file name: {file_name}"
            )));
        }

        self.ensure_dir()
            .await
            .map_err(|err| ImageError::Storage(err.to_string()))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| ImageError::Storage(err.to_string()))?;

        debug!(path = %path.display(), "upload stored");
        Ok(())
    }
}
