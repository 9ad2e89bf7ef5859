//! Turning uploaded bytes into an RGB pixel grid.

use image::{DynamicImage, GrayImage, ImageDecoder, ImageFormat, ImageReader, Luma, RgbImage};
use log::debug;

use crate::error::{AnalysisError, Result};

/// Uploads above this size are rejected before decoding (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Limits applied to an upload before it reaches the decoder.
#[derive(Clone, Debug)]
pub struct AcquireOptions {
    pub max_upload_bytes: usize,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Decode a JPEG or PNG upload into an RGB image.
///
/// The format is sniffed from the magic bytes rather than trusted from the
/// file name. EXIF orientation is applied, so phone photos come out upright.
/// Any alpha channel is dropped; channel order is always R, G, B.
pub fn decode_upload(input: &[u8], opts: &AcquireOptions) -> Result<RgbImage> {
    if input.len() > opts.max_upload_bytes {
        return Err(AnalysisError::UploadTooLarge {
            size: input.len(),
            limit: opts.max_upload_bytes,
        });
    }
    if input.is_empty() {
        return Err(AnalysisError::Decode("empty upload".into()));
    }

    let format = image::guess_format(input)?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        other => return Err(AnalysisError::UnsupportedFormat(format!("{other:?}"))),
    }

    let mut decoder = ImageReader::with_format(std::io::Cursor::new(input), format).into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return Err(AnalysisError::Decode("image has no pixels".into()));
    }

    debug!("decoded {format:?} upload: {} bytes -> {w}x{h}", input.len());
    Ok(rgb)
}

/// Grayscale renderings of the three colour channels.
#[derive(Clone, Debug)]
pub struct ChannelSplit {
    pub red: GrayImage,
    pub green: GrayImage,
    pub blue: GrayImage,
}

impl ChannelSplit {
    /// Channels in R, G, B order, paired with their display names.
    pub fn named(&self) -> [(&'static str, &GrayImage); 3] {
        [("red", &self.red), ("green", &self.green), ("blue", &self.blue)]
    }
}

pub fn split_channels(img: &RgbImage) -> ChannelSplit {
    let (w, h) = img.dimensions();
    let channel = |c: usize| GrayImage::from_fn(w, h, |x, y| Luma([img.get_pixel(x, y)[c]]));
    ChannelSplit {
        red: channel(0),
        green: channel(1),
        blue: channel(2),
    }
}

/// PNG-encode an image for display.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| AnalysisError::Encode(e.to_string()))?;
    }
    Ok(buf)
}
