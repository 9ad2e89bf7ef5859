use wasm_bindgen::prelude::*;
use image::{DynamicImage, RgbImage};
use js_sys::{Array, Object, Reflect, Uint8Array};
use log::debug;

pub mod acquire;
pub mod error;
pub mod extract;
pub mod report;

pub use acquire::{AcquireOptions, ChannelSplit, DEFAULT_MAX_UPLOAD_BYTES, decode_upload, encode_png, split_channels};
pub use error::{AnalysisError, Result};
pub use extract::{ColorCluster, DEFAULT_N_COLORS, DominantColors, ExtractOptions, extract_dominant_colors, to_hex};
pub use report::render_table;

/// Settings for one full upload-to-table pass.
#[derive(Clone, Debug, Default)]
pub struct AnalysisOptions {
    pub acquire: AcquireOptions,
    pub extract: ExtractOptions,
}

/// Everything the page shows for one upload.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub image: RgbImage,
    pub channels: ChannelSplit,
    pub colors: DominantColors,
}

impl Analysis {
    pub fn table_html(&self) -> String {
        render_table(&self.colors.clusters)
    }

    /// PNG previews in display order: original, then red, green, blue.
    pub fn preview_pngs(&self) -> Result<[(&'static str, Vec<u8>); 4]> {
        let [red, green, blue] = self.channels.named();
        Ok([
            ("image", encode_png(&DynamicImage::ImageRgb8(self.image.clone()))?),
            (red.0, encode_png(&DynamicImage::ImageLuma8(red.1.clone()))?),
            (green.0, encode_png(&DynamicImage::ImageLuma8(green.1.clone()))?),
            (blue.0, encode_png(&DynamicImage::ImageLuma8(blue.1.clone()))?),
        ])
    }
}

/// Decode an upload, split its channels and extract its dominant colours.
///
/// Steps performed:
/// 1. Check the size limit and decode JPEG/PNG bytes into an RGB grid.
/// 2. Build grayscale renderings of the R, G and B channels.
/// 3. Run seeded k-means over all pixels and rank the clusters by coverage.
///
/// A decode failure stops the pass before any clustering happens.
pub fn analyze_bytes(input: &[u8], opts: &AnalysisOptions) -> Result<Analysis> {
    let image = decode_upload(input, &opts.acquire)?;
    let channels = split_channels(&image);
    let colors = extract_dominant_colors(&image, &opts.extract)?;
    debug!(
        "analysed {}x{} image into {} clusters",
        image.width(),
        image.height(),
        colors.clusters.len()
    );
    Ok(Analysis {
        image,
        channels,
        colors,
    })
}

/// Options for a browser call; unset arguments keep the defaults.
fn browser_options(n_colors: Option<usize>, seed: Option<u32>, downscale: Option<u32>) -> AnalysisOptions {
    let mut opts = AnalysisOptions::default();
    if let Some(k) = n_colors {
        opts.extract.n_colors = k;
    }
    if let Some(seed) = seed {
        opts.extract.seed = seed as u64;
    }
    opts.extract.downscale = downscale;
    opts
}

/// Browser entry point: analyse an uploaded file.
///
/// `downscale` caps the longest side clustered, which keeps large uploads
/// cheap in wasm memory; the previews stay full size.
///
/// Returns `{ width, height, image, red, green, blue, colors, table }` where
/// the image fields are PNG bytes, `colors` is an array of
/// `{ hex, rgb, percentage }` ranked by coverage and `table` is the rendered
/// HTML table. Failures are thrown as a user-facing message string.
#[wasm_bindgen]
pub fn analyze_image(
    input: Vec<u8>,
    n_colors: Option<usize>,
    seed: Option<u32>,
    downscale: Option<u32>,
) -> std::result::Result<Object, JsValue> {
    let opts = browser_options(n_colors, seed, downscale);

    let analysis = analyze_bytes(&input, &opts).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let previews = analysis
        .preview_pngs()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("width"), &JsValue::from(analysis.image.width()))?;
    Reflect::set(&result, &JsValue::from_str("height"), &JsValue::from(analysis.image.height()))?;
    for (name, png) in &previews {
        Reflect::set(&result, &JsValue::from_str(name), &Uint8Array::from(png.as_slice()))?;
    }

    let colors_js = Array::new();
    for cluster in &analysis.colors.clusters {
        let [r, g, b] = cluster.rgb;
        let row = Object::new();
        Reflect::set(&row, &JsValue::from_str("hex"), &JsValue::from_str(&cluster.hex))?;
        Reflect::set(
            &row,
            &JsValue::from_str("rgb"),
            &Array::of3(&JsValue::from(r), &JsValue::from(g), &JsValue::from(b)),
        )?;
        Reflect::set(&row, &JsValue::from_str("percentage"), &JsValue::from_f64(cluster.percentage))?;
        colors_js.push(&row);
    }
    Reflect::set(&result, &JsValue::from_str("colors"), &colors_js)?;
    Reflect::set(&result, &JsValue::from_str("table"), &JsValue::from_str(&analysis.table_html()))?;

    Ok(result)
}
