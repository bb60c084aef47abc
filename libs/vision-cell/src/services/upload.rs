use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;

use crate::models::{ImageUpload, VisionError};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Request body cap. Leaves room for multipart framing so oversized images still reach validation.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_IMAGE_BYTES + 2 * 1024 * 1024;

struct RawImage {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

fn multipart_error(err: MultipartError) -> VisionError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        VisionError::TooLarge
    } else {
        VisionError::MalformedUpload(err.body_text())
    }
}

/// Read the `image` part and optional `model` field, then validate the image.
pub async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, VisionError> {
    let mut image: Option<RawImage> = None;
    let mut model: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                image = Some(RawImage {
                    bytes: bytes.to_vec(),
                    content_type,
                    file_name,
                });
            }
            Some("model") => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    model = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let image = image.ok_or(VisionError::NoImage)?;
    validate_image(&image.bytes, image.content_type.as_deref())?;

    debug!("Received {} byte image", image.bytes.len());

    Ok(ImageUpload {
        content_type: image.content_type.unwrap_or_default(),
        file_name: image.file_name.unwrap_or_default(),
        bytes: image.bytes,
        model,
    })
}

pub fn validate_image(bytes: &[u8], content_type: Option<&str>) -> Result<(), VisionError> {
    if !content_type.is_some_and(|t| t.starts_with("image/")) {
        return Err(VisionError::NotAnImage);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(VisionError::TooLarge);
    }
    Ok(())
}
