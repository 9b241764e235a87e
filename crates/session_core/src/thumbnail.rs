use std::io::Cursor;

use shared::domain::ImagePayload;
use tracing::debug;

pub const DEFAULT_THUMBNAIL_MAX_EDGE: u32 = 256;

/// Downscaled PNG preview of `payload` whose longest edge fits `max_edge`.
///
/// Falls back to the payload itself when it is already small enough, is not
/// decodable image data, or `max_edge` is 0.
pub fn make_thumbnail(payload: &ImagePayload, max_edge: u32) -> ImagePayload {
    if max_edge == 0 {
        return payload.clone();
    }
    match downscale(payload, max_edge) {
        Ok(Some(thumbnail)) => thumbnail,
        Ok(None) => payload.clone(),
        Err(err) => {
            debug!(error = %err, "thumbnail: keeping full payload");
            payload.clone()
        }
    }
}

fn downscale(payload: &ImagePayload, max_edge: u32) -> Result<Option<ImagePayload>, String> {
    let bytes = payload
        .decode_bytes()
        .ok_or_else(|| "payload is not base64 image data".to_string())?;
    let decoded = image::load_from_memory(&bytes).map_err(|err| err.to_string())?;
    if decoded.width() <= max_edge && decoded.height() <= max_edge {
        return Ok(None);
    }

    let resized = decoded.thumbnail(max_edge, max_edge);
    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| err.to_string())?;
    Ok(Some(ImagePayload::from_bytes("image/png", &out.into_inner())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_payload(width: u32, height: u32) -> ImagePayload {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        ImagePayload::from_bytes("image/png", &out.into_inner())
    }

    #[test]
    fn large_image_is_downscaled_keeping_aspect() {
        let thumb = make_thumbnail(&png_payload(600, 300), 256);
        let bytes = thumb.decode_bytes().expect("thumbnail bytes");
        let decoded = image::load_from_memory(&bytes).expect("decode thumbnail");
        assert_eq!(decoded.width(), 256);
        assert_eq!(decoded.height(), 128);
        assert_eq!(thumb.mime_type(), Some("image/png"));
    }

    #[test]
    fn small_image_is_reused() {
        let payload = png_payload(64, 32);
        assert_eq!(make_thumbnail(&payload, 256), payload);
    }

    #[test]
    fn opaque_payload_is_reused() {
        let payload = ImagePayload::new("B");
        assert_eq!(make_thumbnail(&payload, 256), payload);
    }

    #[test]
    fn zero_edge_disables_downscaling() {
        let payload = png_payload(600, 300);
        assert_eq!(make_thumbnail(&payload, 0), payload);
    }
}
