//! SVG rendering of packing results.
//!
//! One `OptimizeResult` becomes one standalone SVG document. The coordinate
//! space is the container floor in millimeters: the viewBox spans
//! `[0, L_mm] x [0, W_mm]` and every placement rectangle is drawn at its
//! service-assigned position and size. `rotated` never applies a transform;
//! `w_mm` and `h_mm` already reflect the final orientation and the flag only
//! marks the label.

use crate::model::{LayoutSummary, OptimizeResult};

/// Fixed fill palette, cycled over distinct SKUs in first-seen order.
pub const PALETTE: [&str; 8] = [
    "#2D7FF9", "#00A878", "#FFB703", "#FB5607", "#8338EC", "#06D6A0", "#EF476F", "#118AB2",
];

/// Maximum number of unplaced items listed as text.
pub const UNPLACED_LIST_LIMIT: usize = 80;

const CONTAINER_STROKE_WIDTH: f64 = 10.0;
const PLACEMENT_STROKE_WIDTH: f64 = 6.0;
const LABEL_FONT_SIZE: f64 = 60.0;
const LABEL_OFFSET_X: f64 = 20.0;
const LABEL_OFFSET_Y: f64 = 60.0;

/// Deterministic SKU-to-color assignment for one rendered layout.
///
/// Colors are handed out in first-seen order among the placements being
/// rendered and memoized by identifier, so every occurrence of a SKU within
/// one layout shares one color. The backing store preserves insertion
/// order: re-rendering the same data reproduces the same mapping.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: Vec<(String, &'static str)>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the color for `sku`, assigning the next palette entry on
    /// first sight. SKU counts stay small in practice, so a linear scan of
    /// the insertion-ordered list is enough.
    pub fn color_for(&mut self, sku: &str) -> &'static str {
        if let Some((_, color)) = self.assigned.iter().find(|(known, _)| known == sku) {
            return color;
        }
        let color = PALETTE[self.assigned.len() % PALETTE.len()];
        self.assigned.push((sku.to_string(), color));
        color
    }

    /// Number of distinct SKUs seen so far.
    #[allow(dead_code)]
    pub fn distinct_count(&self) -> usize {
        self.assigned.len()
    }
}

/// Renders one packing result as a standalone SVG document string.
pub fn render_layout_svg(result: &OptimizeResult) -> String {
    let length = result.container.length_mm;
    let width = result.container.width_mm;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"xMidYMid meet\">",
        length, width
    ));
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#fafafa\"/>");

    // Container outline at the origin.
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\" stroke=\"#111\" stroke-width=\"{}\"/>",
        length, width, CONTAINER_STROKE_WIDTH
    ));

    let mut colors = ColorAssigner::new();
    for placement in &result.placements {
        let color = colors.color_for(&placement.sku);
        svg.push_str(&format!(
            "<g><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" opacity=\"0.25\" stroke=\"{}\" stroke-width=\"{}\"/>",
            placement.x,
            placement.y,
            placement.w_mm,
            placement.h_mm,
            color,
            color,
            PLACEMENT_STROKE_WIDTH
        ));
        let label = if placement.rotated {
            format!("{} (R)", placement.sku)
        } else {
            placement.sku.clone()
        };
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"#111\" opacity=\"0.75\">{}</text></g>",
            placement.x + LABEL_OFFSET_X,
            placement.y + LABEL_OFFSET_Y,
            LABEL_FONT_SIZE,
            xml_escape(&label)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Lists unplaced items as pretty-printed JSON, capped at
/// `UNPLACED_LIST_LIMIT` entries with an explicit truncation indicator
/// beyond the cap. Returns `None` when nothing was left unplaced.
pub fn format_unplaced_items(items: &[serde_json::Value]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let shown = &items[..items.len().min(UNPLACED_LIST_LIMIT)];
    let mut text = serde_json::to_string_pretty(shown)
        .unwrap_or_else(|_| format!("{} unplaced items", items.len()));
    if items.len() > UNPLACED_LIST_LIMIT {
        text.push_str("\n... (truncated)");
    }
    Some(text)
}

/// One-line summary of a result, for terminal output next to the SVG.
pub fn format_summary(summary: &LayoutSummary, margin_mm: u32) -> String {
    format!(
        "placed {}, unplaced {}, utilization {}, leftover {:.2} m², largest free rect {:.2} m², margin {} mm",
        summary.placed,
        summary.unplaced,
        pct(summary.utilization_area),
        mm2_to_m2(summary.leftover_area_mm2),
        mm2_to_m2(summary.largest_free_rect_mm2),
        margin_mm
    )
}

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

fn mm2_to_m2(mm2: f64) -> f64 {
    mm2 / 1_000_000.0
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerFootprint, Placement};
    use serde_json::json;

    fn placement(sku: &str, x: f64, y: f64, rotated: bool) -> Placement {
        Placement {
            sku: sku.to_string(),
            x,
            y,
            w_mm: 1200.0,
            h_mm: 800.0,
            rotated,
        }
    }

    fn result_with(placements: Vec<Placement>, unplaced_items: Vec<serde_json::Value>) -> OptimizeResult {
        OptimizeResult {
            strategy: "maxrects".to_string(),
            container: ContainerFootprint {
                length_mm: 12032.0,
                width_mm: 2352.0,
            },
            margin_mm: 0,
            summary: LayoutSummary {
                placed: placements.len(),
                unplaced: unplaced_items.len(),
                utilization_area: 0.5,
                leftover_area_mm2: 2_000_000.0,
                largest_free_rect_mm2: 1_000_000.0,
            },
            placements,
            unplaced_items,
        }
    }

    #[test]
    fn same_sku_shares_one_color() {
        let mut colors = ColorAssigner::new();
        let first = colors.color_for("PAL-1");
        colors.color_for("PAL-2");
        assert_eq!(colors.color_for("PAL-1"), first);
        assert_eq!(colors.distinct_count(), 2);
    }

    #[test]
    fn colors_assigned_in_first_seen_order() {
        let mut colors = ColorAssigner::new();
        assert_eq!(colors.color_for("B"), PALETTE[0]);
        assert_eq!(colors.color_for("A"), PALETTE[1]);
        assert_eq!(colors.color_for("C"), PALETTE[2]);
        // Keyed by identifier, not by position: repeats keep their color.
        assert_eq!(colors.color_for("B"), PALETTE[0]);
    }

    #[test]
    fn palette_cycles_after_exhaustion() {
        let mut colors = ColorAssigner::new();
        for i in 0..PALETTE.len() {
            colors.color_for(&format!("SKU-{i}"));
        }
        assert_eq!(colors.color_for("SKU-overflow"), PALETTE[0]);
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let result = result_with(
            vec![
                placement("PAL-1", 0.0, 0.0, false),
                placement("PAL-2", 1200.0, 0.0, true),
                placement("PAL-1", 2400.0, 0.0, false),
            ],
            Vec::new(),
        );
        let first = render_layout_svg(&result);
        let second = render_layout_svg(&result);
        assert_eq!(first, second, "re-renders must reproduce identical output");
    }

    #[test]
    fn svg_contains_outline_and_labeled_placements() {
        let result = result_with(
            vec![
                placement("PAL-1", 0.0, 0.0, false),
                placement("PAL-2", 1200.0, 0.0, true),
            ],
            Vec::new(),
        );
        let svg = render_layout_svg(&result);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 12032 2352\""));
        assert!(svg.contains("stroke=\"#111\""), "container outline present");
        assert!(svg.contains(">PAL-1</text>"));
        assert!(svg.contains(">PAL-2 (R)</text>"), "rotation marks the label only");
        assert!(!svg.contains("transform"), "rotation must not transform geometry");
    }

    #[test]
    fn sku_labels_are_xml_escaped() {
        let result = result_with(vec![placement("A<&>B", 0.0, 0.0, false)], Vec::new());
        let svg = render_layout_svg(&result);
        assert!(svg.contains(">A&lt;&amp;&gt;B</text>"));
        assert!(!svg.contains(">A<&>B</text>"));
    }

    #[test]
    fn unplaced_listing_caps_at_limit_with_indicator() {
        let items: Vec<serde_json::Value> =
            (0..200).map(|i| json!({ "sku": format!("U-{i}") })).collect();
        let text = format_unplaced_items(&items).expect("listing present");

        let listed = text.matches("\"sku\"").count();
        assert_eq!(listed, UNPLACED_LIST_LIMIT, "exactly 80 entries listed");
        assert!(text.ends_with("... (truncated)"));
    }

    #[test]
    fn unplaced_listing_below_limit_has_no_indicator() {
        let items: Vec<serde_json::Value> =
            (0..50).map(|i| json!({ "sku": format!("U-{i}") })).collect();
        let text = format_unplaced_items(&items).expect("listing present");

        assert_eq!(text.matches("\"sku\"").count(), 50);
        assert!(!text.contains("truncated"));
    }

    #[test]
    fn no_unplaced_items_no_listing() {
        assert!(format_unplaced_items(&[]).is_none());
    }

    #[test]
    fn summary_formats_percent_and_square_meters() {
        let result = result_with(Vec::new(), Vec::new());
        let line = format_summary(&result.summary, 5);
        assert!(line.contains("utilization 50.0%"));
        assert!(line.contains("leftover 2.00 m²"));
        assert!(line.contains("largest free rect 1.00 m²"));
        assert!(line.contains("margin 5 mm"));
    }
}
