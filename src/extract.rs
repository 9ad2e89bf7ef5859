//! Dominant colour extraction via k-means over RGB pixels.

use std::borrow::Cow;

use image::{RgbImage, imageops::FilterType};
use kmeans_colors::get_kmeans;
use log::{debug, warn};
use palette::Srgb;
use serde::Serialize;

use crate::error::{AnalysisError, Result};

pub const DEFAULT_N_COLORS: usize = 10;

// Cluster labels coming back from the clusterer are `u8`.
const MAX_CLUSTERS: usize = u8::MAX as usize;

/// Clustering parameters.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Number of clusters (`k`).
    pub n_colors: usize,
    pub max_iterations: usize,
    /// Stop once the centroids move less than this between iterations.
    pub converge: f32,
    /// Seed for k-means++ initialization. Same seed, same clusters.
    pub seed: u64,
    /// Resize (nearest-neighbour) so the longest side is at most this many
    /// pixels before clustering.
    pub downscale: Option<u32>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            n_colors: DEFAULT_N_COLORS,
            max_iterations: 300,
            converge: 1e-4,
            seed: 42,
            downscale: None,
        }
    }
}

/// One row of the colour table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorCluster {
    pub rgb: [u8; 3],
    pub hex: String,
    /// Share of pixels in this cluster, 0..=100.
    pub percentage: f64,
    /// Cluster id as produced by the clusterer, before ranking.
    pub index: usize,
    pub pixel_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct DominantColors {
    /// Ranked by descending percentage.
    pub clusters: Vec<ColorCluster>,
    /// Cluster id of every clustered pixel, row-major.
    #[serde(skip)]
    pub assignments: Vec<usize>,
}

/// Format an 8-bit triple as `#rrggbb`.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn working_image(img: &RgbImage, downscale: Option<u32>) -> Cow<'_, RgbImage> {
    let (w, h) = img.dimensions();
    match downscale {
        Some(scale) if scale > 0 && w.max(h) > scale => {
            let ratio = scale as f32 / w.max(h) as f32;
            let out_w = ((w as f32) * ratio).round().max(1.0) as u32;
            let out_h = ((h as f32) * ratio).round().max(1.0) as u32;
            debug!("downscaling {w}x{h} -> {out_w}x{out_h} before clustering");
            Cow::Owned(image::imageops::resize(img, out_w, out_h, FilterType::Nearest))
        }
        _ => Cow::Borrowed(img),
    }
}

/// Reduce an image to `n_colors` representative colours ranked by coverage.
///
/// Every pixel ends up in exactly one cluster; percentages come from integer
/// bin counts of those assignments, and each colour is the rounded mean of
/// its member pixels. If `n_colors` exceeds the pixel count it is clamped.
/// Clusters that end up with no pixels (fewer distinct colours than `k`) are
/// still reported, with zero weight and the dominant colour.
pub fn extract_dominant_colors(img: &RgbImage, opts: &ExtractOptions) -> Result<DominantColors> {
    if opts.n_colors == 0 {
        return Err(AnalysisError::InvalidParameter(
            "number of colors must be at least 1".into(),
        ));
    }
    if opts.n_colors > MAX_CLUSTERS {
        return Err(AnalysisError::InvalidParameter(format!(
            "number of colors must be at most {MAX_CLUSTERS}, got {}",
            opts.n_colors
        )));
    }

    let working = working_image(img, opts.downscale);
    let raw = working.as_raw();
    let n = raw.len() / 3;
    if n == 0 {
        return Err(AnalysisError::InvalidParameter("image has no pixels".into()));
    }

    let k = if opts.n_colors > n {
        warn!("{} colors requested but image has {n} pixels; clamping", opts.n_colors);
        n
    } else {
        opts.n_colors
    };

    let points: Vec<Srgb> = raw
        .chunks_exact(3)
        .map(|p| Srgb::<u8>::new(p[0], p[1], p[2]).into_format::<f32>())
        .collect();

    let kmeans = get_kmeans(k, opts.max_iterations, opts.converge, false, &points, opts.seed);
    debug!(
        "k-means over {n} pixels: k={k}, {} centroids, score {}",
        kmeans.centroids.len(),
        kmeans.score
    );

    let assignments: Vec<usize> = kmeans.indices.iter().map(|&i| i as usize).collect();

    // Bin-count the labels and accumulate member sums per cluster.
    let mut counts = vec![0usize; k];
    let mut sums = vec![[0u64; 3]; k];
    for (p, &cluster) in raw.chunks_exact(3).zip(&assignments) {
        counts[cluster] += 1;
        for c in 0..3 {
            sums[cluster][c] += p[c] as u64;
        }
    }

    let mut clusters: Vec<ColorCluster> = (0..k)
        .map(|index| {
            let count = counts[index];
            let rgb = if count == 0 {
                [0; 3]
            } else {
                let mean = |c: usize| (sums[index][c] as f64 / count as f64).round() as u8;
                [mean(0), mean(1), mean(2)]
            };
            ColorCluster {
                rgb,
                hex: String::new(),
                percentage: count as f64 * 100.0 / n as f64,
                index,
                pixel_count: count,
            }
        })
        .collect();

    // Stable: equal shares keep cluster order.
    clusters.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let dominant = clusters[0].rgb;
    for cluster in &mut clusters {
        if cluster.pixel_count == 0 {
            cluster.rgb = dominant;
        }
        cluster.hex = to_hex(cluster.rgb);
    }

    Ok(DominantColors {
        clusters,
        assignments,
    })
}
