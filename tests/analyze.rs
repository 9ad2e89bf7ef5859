use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use image_color_analysis_wasm::{AnalysisError, AnalysisOptions, ExtractOptions, analyze_bytes};

fn png_bytes(img: RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn quadrants() -> RgbImage {
    RgbImage::from_fn(20, 20, |x, y| match (x < 10, y < 10) {
        (true, true) => Rgb([255, 0, 0]),
        (false, true) => Rgb([0, 255, 0]),
        (true, false) => Rgb([0, 0, 255]),
        (false, false) => Rgb([20, 20, 20]),
    })
}

#[test]
fn png_upload_produces_channels_and_ranked_table() {
    let bytes = png_bytes(quadrants());
    let analysis = analyze_bytes(&bytes, &AnalysisOptions::default()).unwrap();

    assert_eq!(analysis.image.dimensions(), (20, 20));
    assert_eq!(analysis.channels.red.get_pixel(0, 0)[0], 255);
    assert_eq!(analysis.channels.green.get_pixel(15, 0)[0], 255);
    assert_eq!(analysis.channels.blue.get_pixel(0, 15)[0], 255);
    assert_eq!(analysis.channels.red.get_pixel(15, 15)[0], 20);

    let clusters = &analysis.colors.clusters;
    assert_eq!(clusters.len(), 10);
    let total: f64 = clusters.iter().map(|c| c.percentage).sum();
    assert!((total - 100.0).abs() < 0.01);
    for pair in clusters.windows(2) {
        assert!(pair[0].percentage >= pair[1].percentage);
    }

    let html = analysis.table_html();
    assert_eq!(html.matches("<tr>").count(), 11);

    let previews = analysis.preview_pngs().unwrap();
    let names: Vec<_> = previews.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, ["image", "red", "green", "blue"]);
    for (_, png) in &previews {
        assert_eq!(image::guess_format(png).unwrap(), ImageFormat::Png);
    }
}

#[test]
fn four_color_image_with_k4_reports_quarters() {
    let opts = AnalysisOptions {
        extract: ExtractOptions {
            n_colors: 4,
            ..ExtractOptions::default()
        },
        ..AnalysisOptions::default()
    };
    let analysis = analyze_bytes(&png_bytes(quadrants()), &opts).unwrap();

    let mut hexes: Vec<_> = analysis.colors.clusters.iter().map(|c| c.hex.as_str()).collect();
    hexes.sort();
    assert_eq!(hexes, ["#0000ff", "#00ff00", "#141414", "#ff0000"]);
    for c in &analysis.colors.clusters {
        assert_eq!(c.percentage, 25.0);
        assert_eq!(c.pixel_count, 100);
    }
    // Equal shares keep cluster order.
    for pair in analysis.colors.clusters.windows(2) {
        assert!(pair[0].index < pair[1].index);
    }
}

#[test]
fn corrupt_upload_yields_decode_error_and_no_clusters() {
    let mut bytes = png_bytes(quadrants());
    bytes.truncate(40);

    match analyze_bytes(&bytes, &AnalysisOptions::default()) {
        Err(err) => {
            assert!(err.is_decode(), "{err:?}");
            assert!(err.to_string().starts_with("Unable to process the uploaded image"));
        }
        Ok(_) => panic!("truncated upload should not decode"),
    }
}

#[test]
fn clusters_serialize_for_json_output() {
    let analysis = analyze_bytes(
        &png_bytes(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))),
        &AnalysisOptions::default(),
    )
    .unwrap();

    let json = serde_json::to_value(&analysis.colors).unwrap();
    let first = &json["clusters"][0];
    assert_eq!(first["hex"], "#ff0000");
    assert_eq!(first["rgb"], serde_json::json!([255, 0, 0]));
    assert_eq!(first["percentage"], 100.0);
    assert!(json.get("assignments").is_none());
}

#[test]
fn bad_k_is_reported_after_successful_decode() {
    let opts = AnalysisOptions {
        extract: ExtractOptions {
            n_colors: 0,
            ..ExtractOptions::default()
        },
        ..AnalysisOptions::default()
    };
    let err = analyze_bytes(&png_bytes(quadrants()), &opts).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidParameter(_)));
}
