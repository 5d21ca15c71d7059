//! Decoding entries into something the PDF writer can embed

use std::time::Duration;

use image::{DynamicImage, ImageFormat};

use crate::datauri;
use crate::selection::ImageEntry;
use crate::{Error, Result};

/// Color space of a pass-through JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColor {
    Gray,
    Rgb,
}

/// Pixel data ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Original JPEG bytes, embedded as-is
    Jpeg { data: Vec<u8>, color: JpegColor },
    /// 8-bit RGB samples, plus 8-bit alpha when the image is not fully opaque
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded image: natural pixel size plus embeddable data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub payload: ImagePayload,
}

/// Decode the entry at position `index` of an export.
pub fn decode_entry(entry: &ImageEntry, index: usize) -> Result<DecodedImage> {
    let fail = |reason: String| Error::Decode { index, reason };

    let uri = datauri::parse(entry.data_uri()).map_err(|e| fail(e.to_string()))?;
    let format = image::guess_format(&uri.data).map_err(|e| fail(e.to_string()))?;
    let img = image::load_from_memory_with_format(&uri.data, format)
        .map_err(|e| fail(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(fail(format!("image has no pixels ({}x{})", width, height)));
    }

    let payload = match (format, jpeg_components(&uri.data)) {
        (ImageFormat::Jpeg, Some(1)) => ImagePayload::Jpeg {
            data: uri.data,
            color: JpegColor::Gray,
        },
        (ImageFormat::Jpeg, Some(3)) => ImagePayload::Jpeg {
            data: uri.data,
            color: JpegColor::Rgb,
        },
        // CMYK and anything unusual gets converted like the other formats.
        _ => rgb_payload(&img),
    };

    Ok(DecodedImage {
        width,
        height,
        payload,
    })
}

/// Decode on the blocking pool, optionally bounded by `timeout_ms`.
pub async fn decode_entry_async(
    entry: ImageEntry,
    index: usize,
    timeout_ms: Option<u64>,
) -> Result<DecodedImage> {
    let task = tokio::task::spawn_blocking(move || decode_entry(&entry, index));

    let joined = match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), task)
            .await
            .map_err(|_| Error::Timeout(ms))?,
        None => task.await,
    };

    joined.map_err(|e| Error::Decode {
        index,
        reason: format!("decode task failed: {}", e),
    })?
}

fn rgb_payload(img: &DynamicImage) -> ImagePayload {
    let rgb = img.to_rgb8().into_raw();
    let alpha = if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
        if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(alpha)
        }
    } else {
        None
    };
    ImagePayload::Rgb { rgb, alpha }
}

/// Component count from the first SOF marker of a JPEG stream.
pub fn jpeg_components(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(pos + 9).copied();
        }
        if marker == 0xDA || len < 2 {
            return None;
        }
        pos += 2 + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Origin;
    use image::{ImageBuffer, Luma, Rgb, Rgba};
    use std::io::Cursor;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn entry(media_type: &str, bytes: &[u8]) -> ImageEntry {
        ImageEntry::from_bytes(media_type, bytes, Origin::File).unwrap()
    }

    #[test]
    fn png_is_converted_to_rgb() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 3, Rgb([10, 20, 30])));
        let decoded = decode_entry(&entry("image/png", &encode(img, ImageFormat::Png)), 0).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
        match decoded.payload {
            ImagePayload::Rgb { rgb, alpha } => {
                assert_eq!(rgb.len(), 4 * 3 * 3);
                assert_eq!(&rgb[..3], &[10, 20, 30]);
                assert!(alpha.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn translucent_png_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([0, 0, 0, 128])));
        let decoded = decode_entry(&entry("image/png", &encode(img, ImageFormat::Png)), 0).unwrap();
        match decoded.payload {
            ImagePayload::Rgb { alpha: Some(alpha), .. } => assert_eq!(alpha, vec![128; 4]),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn jpeg_passes_through() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([200, 10, 10])));
        let bytes = encode(img, ImageFormat::Jpeg);
        assert_eq!(jpeg_components(&bytes), Some(3));
        let decoded = decode_entry(&entry("image/jpeg", &bytes), 0).unwrap();
        assert_eq!(
            decoded.payload,
            ImagePayload::Jpeg {
                data: bytes,
                color: JpegColor::Rgb
            }
        );
    }

    #[test]
    fn gray_jpeg_reports_one_component() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(8, 8, Luma([90])));
        let bytes = encode(img, ImageFormat::Jpeg);
        assert_eq!(jpeg_components(&bytes), Some(1));
    }

    #[test]
    fn garbage_fails_with_index() {
        let err = decode_entry(&entry("image/png", b"not really a png"), 4).unwrap_err();
        assert!(matches!(err, Error::Decode { index: 4, .. }));
    }

    #[tokio::test]
    async fn async_decode_reports_same_failure() {
        let err = decode_entry_async(entry("image/gif", b"GIF89a"), 2, Some(5_000))
            .await
            .unwrap_err();
        assert!(err.is_decode_failure());
    }
}
