use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use image::ImageFormat;
use url::Url;

use crate::{config::AvatarConfig, error::AppError, svg::encode_image};

/// Avatars larger than this are downscaled before embedding; the layout only
/// shows them at 200px.
const MAX_DIM: u32 = 400;

/// An avatar fetched from the name-keyed avatar service, re-encoded as a PNG
/// data URI so the rasterizer can embed it without a network fetch.
pub struct AvatarImage {
    pub data_uri: String,
}

/// The avatar probe seam. Fails closed: any non-success response (or a body
/// that is not a decodable image) yields `None` and the caller falls back to
/// the blockies identicon.
#[async_trait]
pub trait AvatarSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Option<AvatarImage>, AppError>;
}

pub struct EnsDataAvatars {
    client: reqwest::Client,
    base_url: Url,
}

impl EnsDataAvatars {
    pub fn new(config: &AvatarConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create avatar HTTP client")?;
        Ok(Self { client, base_url: config.base_url.clone() })
    }
}

#[async_trait]
impl AvatarSource for EnsDataAvatars {
    async fn fetch(&self, name: &str) -> Result<Option<AvatarImage>, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Avatar base URL cannot be a base"))?
            .push(name);
        let response =
            self.client.get(url).send().await.map_err(|err| AppError::Upstream(err.into()))?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let bytes = response.bytes().await.map_err(|err| AppError::Upstream(err.into()))?;
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!("Avatar for {name} is not a decodable image: {err}");
                return Ok(None);
            }
        };
        let image = if image.width() > MAX_DIM || image.height() > MAX_DIM {
            image.resize(MAX_DIM, MAX_DIM, image::imageops::FilterType::Lanczos3)
        } else {
            image
        };
        let png = encode_image(&image, ImageFormat::Png)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
        Ok(Some(AvatarImage { data_uri: format!("data:image/png;base64,{encoded}") }))
    }
}
