//! 图片转码与上传存储抽象

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported or corrupt image: {0}")]
    Decode(String),
    #[error("webp encoding failed: {0}")]
    Encode(String),
    #[error("upload storage failed: {0}")]
    Storage(String),
}

/// 将任意常见格式的图片转为 WebP
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageConverter: Send + Sync {
    async fn to_webp(&self, input: Vec<u8>) -> Result<Vec<u8>, ImageError>;
}

/// 上传文件的落盘位置
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ImageError>;
}
