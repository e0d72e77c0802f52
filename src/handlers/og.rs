use std::str::FromStr;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use ethers::utils::to_checksum;
use image::ImageFormat;
use mime::Mime;
use serde::Deserialize;

use crate::{
    AppState, blockies,
    error::AppError,
    eth, identity,
    og::{self, Avatar, OgCard},
    qr, svg,
};

#[derive(Deserialize)]
pub struct OgQuery {
    #[serde(rename = "addyOrEns")]
    addy_or_ens: Option<String>,
}

enum OutputFormat {
    Svg,
    Raster(ImageFormat),
}

pub async fn get_og(
    Query(query): Query<OgQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(raw) = query.addy_or_ens.as_deref() else {
        return Err(AppError::BadRequest("Missing 'addyOrEns' query parameter"));
    };
    let token = identity::classify(raw);
    let identity = identity::resolve(state.chain.as_ref(), token).await?;

    let remote_avatar = match &identity.name {
        Some(name) => match state.avatars.fetch(name).await {
            Ok(avatar) => avatar,
            Err(err) => {
                tracing::warn!("Avatar lookup failed for {name}: {err:?}");
                None
            }
        },
        None => None,
    };
    let avatar = match remote_avatar {
        Some(image) => Avatar::Remote(image.data_uri),
        None => Avatar::Blockies(blockies::render_svg(identity.address, og::AVATAR_SIZE)),
    };

    let card = OgCard {
        display_name: identity.display_name(),
        balance_text: eth::format_balance(identity.balance),
        avatar,
        qr: qr::render_svg(&to_checksum(&identity.address, None), og::QR_SIZE)?,
    };
    let svg_src = og::render_svg(&card);

    let mut out_headers = HeaderMap::new();
    out_headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("public, max-age={}", state.config.image.cache_max_age))?,
    );
    match negotiate_format(&headers) {
        OutputFormat::Svg => {
            out_headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"));
            Ok((out_headers, svg_src).into_response())
        }
        OutputFormat::Raster(format) => {
            let data = svg::render_image(&svg_src, format)?;
            out_headers.insert(header::CONTENT_TYPE, format.to_mime_type().parse()?);
            Ok((out_headers, data).into_response())
        }
    }
}

/// PNG unless the Accept header asks for SVG or another raster format.
fn negotiate_format(headers: &HeaderMap) -> OutputFormat {
    let accept = headers.get(header::ACCEPT).and_then(|value| value.to_str().ok()).unwrap_or("");
    for mime in accept.split(',').map(str::trim).filter_map(|s| Mime::from_str(s).ok()) {
        if mime.type_() != mime::IMAGE {
            continue;
        }
        if mime.subtype() == mime::SVG {
            return OutputFormat::Svg;
        }
        if mime.subtype() == mime::STAR {
            return OutputFormat::Raster(ImageFormat::Png);
        }
        // Skip formats we can't encode (browsers commonly lead with avif).
        if let Some(format) = ImageFormat::from_mime_type(mime.essence_str()) {
            if matches!(
                format,
                ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif
            ) {
                return OutputFormat::Raster(format);
            }
        }
    }
    OutputFormat::Raster(ImageFormat::Png)
}
