//! HTML rendering of the colour table.

use crate::extract::ColorCluster;

/// Render clusters as an HTML table: swatch, hex, RGB tuple, percentage.
///
/// Rows are emitted in the order given, which is the ranked order coming out
/// of [`crate::extract_dominant_colors`].
pub fn render_table(clusters: &[ColorCluster]) -> String {
    let mut html = String::from(
        "<table class=\"color-table\">\n<thead><tr><th>Color</th><th>Hex</th><th>RGB</th><th>Percentage</th></tr></thead>\n<tbody>\n",
    );
    for c in clusters {
        let [r, g, b] = c.rgb;
        html.push_str(&format!(
            "<tr><td><div style=\"background-color:{hex};width:30px;height:30px;border-radius:5px;display:inline-block;\"></div></td><td>{hex}</td><td>({r}, {g}, {b})</td><td>{pct:.2}%</td></tr>\n",
            hex = c.hex,
            pct = c.percentage,
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}
