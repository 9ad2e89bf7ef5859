use clap::Parser;
use std::fs;
use std::path::PathBuf;
use image_color_analysis_wasm::{AcquireOptions, AnalysisOptions, ExtractOptions, analyze_bytes};
use anyhow::Context;
use anyhow::Result;

/// Report the channel split and dominant colours of images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths (JPEG or PNG)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of dominant colors to extract
    #[arg(short = 'k', long, default_value_t = 10)]
    n_colors: usize,

    /// Seed for centroid initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum k-means iterations
    #[arg(long, default_value_t = 300)]
    max_iterations: usize,

    /// Downscale so the longest side is at most this many pixels before clustering
    #[arg(long)]
    downscale: Option<u32>,

    /// Reject inputs larger than this many MiB
    #[arg(long, default_value_t = 10)]
    max_upload_mb: usize,

    /// Print the colour table as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write the HTML colour table next to the channel images
    #[arg(long, requires = "out_dir")]
    html: bool,

    /// Directory for channel images (<stem>_red.png etc.); nothing is written if omitted
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,
}

fn upload_limit_bytes(mb: usize) -> usize {
    mb.saturating_mul(1024 * 1024)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let opts = AnalysisOptions {
        acquire: AcquireOptions {
            max_upload_bytes: upload_limit_bytes(args.max_upload_mb),
        },
        extract: ExtractOptions {
            n_colors: args.n_colors,
            max_iterations: args.max_iterations,
            seed: args.seed,
            downscale: args.downscale,
            ..ExtractOptions::default()
        },
    };

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let analysis = analyze_bytes(&bytes, &opts)
            .with_context(|| format!("analysing {}", input.display()))?;

        if args.json {
            let out = serde_json::json!({
                "file": input.display().to_string(),
                "width": analysis.image.width(),
                "height": analysis.image.height(),
                "colors": analysis.colors.clusters,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            println!("{} ({}x{})", input.display(), analysis.image.width(), analysis.image.height());
            for c in &analysis.colors.clusters {
                let [r, g, b] = c.rgb;
                println!("  {}  ({r:>3}, {g:>3}, {b:>3})  {:>6.2}%", c.hex, c.percentage);
            }
        }

        if let Some(dir) = &args.out_dir {
            fs::create_dir_all(dir)?;
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            for (name, png) in analysis.preview_pngs()? {
                if name == "image" {
                    continue;
                }
                let out_path = dir.join(format!("{stem}_{name}.png"));
                fs::write(&out_path, png)?;
                eprintln!("Saved → {}", out_path.display());
            }
            if args.html {
                let out_path = dir.join(format!("{stem}_colors.html"));
                fs::write(&out_path, analysis.table_html())?;
                eprintln!("Saved → {}", out_path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_saturates_instead_of_overflowing() {
        assert_eq!(upload_limit_bytes(10), 10 * 1024 * 1024);
        assert_eq!(upload_limit_bytes(usize::MAX), usize::MAX);
    }
}
