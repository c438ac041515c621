use std::sync::Arc;

use crate::{
    clock::Clock,
    error::ApplicationError,
    image::{ImageConverter, UploadStore},
};

/// 上传目录对外暴露的 URL 前缀
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// 转码后直接返回给客户端的图片
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 已写入上传目录的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub url: String,
}

pub struct ImageServiceDependencies {
    pub converter: Arc<dyn ImageConverter>,
    pub store: Arc<dyn UploadStore>,
    pub clock: Arc<dyn Clock>,
}

pub struct ImageService {
    deps: ImageServiceDependencies,
}

impl ImageService {
    pub fn new(deps: ImageServiceDependencies) -> Self {
        Self { deps }
    }

    fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}{}.webp", self.deps.clock.now().timestamp_millis())
    }

    async fn store(&self, file_name: String, bytes: Vec<u8>) -> Result<StoredImage, ApplicationError> {
        self.deps.store.save(&file_name, bytes).await?;
        let url = format!("{UPLOADS_URL_PREFIX}/{file_name}");
        tracing::info!(%url, "image stored");
        Ok(StoredImage { file_name, url })
    }

    /// 转为 WebP 并原样返回，不落盘
    pub async fn convert(&self, input: Vec<u8>) -> Result<ConvertedImage, ApplicationError> {
        let bytes = self.deps.converter.to_webp(input).await?;
        Ok(ConvertedImage {
            file_name: self.file_name(""),
            bytes,
        })
    }

    /// 转为 WebP 并写入上传目录
    pub async fn convert_and_store(&self, input: Vec<u8>) -> Result<StoredImage, ApplicationError> {
        let bytes = self.deps.converter.to_webp(input).await?;
        self.store(self.file_name("converted_"), bytes).await
    }

    /// 客户端已经是 WebP，直接写入上传目录
    pub async fn store_webp(&self, input: Vec<u8>) -> Result<StoredImage, ApplicationError> {
        self.store(self.file_name("uploaded_"), input).await
    }
}
