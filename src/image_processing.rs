use crate::camera::{CameraError, RawFrame};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

fn frame_buffer(frame: &RawFrame) -> Result<RgbaImage, CameraError> {
    RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()).ok_or_else(|| {
        CameraError::Encoding(format!(
            "frame buffer of {} bytes does not match {}x{}",
            frame.rgba.len(),
            frame.width,
            frame.height
        ))
    })
}

/// Encodes an RGBA frame as JPEG (alpha is dropped)
pub fn encode_jpeg(frame: &RawFrame, quality: u8) -> Result<Vec<u8>, CameraError> {
    let rgb = DynamicImage::ImageRgba8(frame_buffer(frame)?).to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| CameraError::Encoding(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}

/// Center-crops `frame` to `aspect_ratio` (width / height).
///
/// Frames already in that ratio come back unchanged.
pub fn crop_to_aspect(frame: &RawFrame, aspect_ratio: f64) -> Result<RawFrame, CameraError> {
    let buffer = frame_buffer(frame)?;
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 || !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Ok(frame.clone());
    }

    let (crop_width, crop_height) = if f64::from(width) / f64::from(height) > aspect_ratio {
        let w = (f64::from(height) * aspect_ratio).round() as u32;
        (w.clamp(1, width), height)
    } else {
        let h = (f64::from(width) / aspect_ratio).round() as u32;
        (width, h.clamp(1, height))
    };
    if (crop_width, crop_height) == (width, height) {
        return Ok(frame.clone());
    }

    let x = (width - crop_width) / 2;
    let y = (height - crop_height) / 2;
    let cropped = image::imageops::crop_imm(&buffer, x, y, crop_width, crop_height).to_image();
    log::debug!(
        "Cropped {}x{} frame to {}x{}",
        width,
        height,
        crop_width,
        crop_height
    );
    Ok(RawFrame {
        width: crop_width,
        height: crop_height,
        rgba: cropped.into_raw(),
    })
}

/// Decodes an image file into an RGBA frame
pub fn decode_to_frame(path: &Path) -> Result<RawFrame, CameraError> {
    let img = image::open(path).map_err(|e| {
        CameraError::CameraUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    let rgba = img.to_rgba8();
    Ok(RawFrame {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Builds a `data:` URL (Base64) for `bytes`
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> RawFrame {
        RawFrame {
            width,
            height,
            rgba: [200u8, 30, 60, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg() {
        let jpeg = encode_jpeg(&solid_frame(9, 16), 90).unwrap();
        // SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (9, 16));
    }

    #[test]
    fn test_encode_jpeg_rejects_short_buffer() {
        let mut frame = solid_frame(4, 4);
        frame.rgba.truncate(10);
        assert!(matches!(
            encode_jpeg(&frame, 90),
            Err(CameraError::Encoding(_))
        ));
    }

    #[test]
    fn test_crop_to_aspect_keeps_center() {
        // One row of four pixels, red channel 0..=3
        let frame = RawFrame {
            width: 4,
            height: 1,
            rgba: (0u8..4).flat_map(|r| [r, 0, 0, 255]).collect(),
        };

        let cropped = crop_to_aspect(&frame, 2.0).unwrap();
        assert_eq!((cropped.width, cropped.height), (2, 1));
        assert_eq!(cropped.rgba, vec![1, 0, 0, 255, 2, 0, 0, 255]);
    }

    #[test]
    fn test_crop_to_aspect_portrait() {
        let landscape = crop_to_aspect(&solid_frame(320, 144), 9.0 / 16.0).unwrap();
        assert_eq!((landscape.width, landscape.height), (81, 144));

        let tall = crop_to_aspect(&solid_frame(90, 320), 9.0 / 16.0).unwrap();
        assert_eq!((tall.width, tall.height), (90, 160));

        let exact = solid_frame(9, 16);
        assert_eq!(crop_to_aspect(&exact, 9.0 / 16.0).unwrap(), exact);
    }

    #[test]
    fn test_to_data_url() {
        assert_eq!(to_data_url("image/jpeg", b"abc"), "data:image/jpeg;base64,YWJj");
    }
}
