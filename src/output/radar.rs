// SVG radar charts for topic coverage.
//
// Two charts: the aggregate log-ratio coverage with one polygon per
// difficulty level and a dashed reference circle at 0 (the uniform 1/K
// baseline), and a grid of per-item topic mixtures for the sampled items.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use crate::corpus::records::Level;
use crate::coverage::aggregate::CoveragePoint;
use crate::error::{AlignError, Result};
use crate::topics::inference::PosteriorRow;
use crate::topics::labels::TopicLabels;

const CHART_RADIUS: f64 = 160.0;
const CELL_RADIUS: f64 = 70.0;
const ITEM_COLUMNS: usize = 3;

/// Aggregate coverage chart, log-ratio scale.
pub fn coverage_chart(points: &[CoveragePoint], labels: &TopicLabels) -> String {
    let k = labels.len();
    let size = 2.0 * (CHART_RADIUS + 90.0);
    let (cx, cy) = (size / 2.0, size / 2.0);

    // Radial axis always spans at least [-1, 1] so 0 sits inside the chart.
    let lo = points.iter().map(|p| p.log_ratio).fold(-1.0, f64::min);
    let hi = points.iter().map(|p| p.log_ratio).fold(1.0, f64::max);
    let scale = |v: f64| CHART_RADIUS * (v - lo) / (hi - lo);

    let mut svg = open_svg(size, size + 30.0);
    push_axes(&mut svg, cx, cy, CHART_RADIUS, labels, true);
    svg.push_str(&format!(
        r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{:.1}" fill="none" stroke="#555" stroke-dasharray="6 4"/>"##,
        scale(0.0)
    ));
    svg.push('\n');

    for (i, level) in Level::ALL.iter().enumerate() {
        let values: Vec<Option<f64>> = (1..=k)
            .map(|t| {
                points
                    .iter()
                    .find(|p| p.topic == t && p.level == *level)
                    .map(|p| scale(p.log_ratio))
            })
            .collect();
        if values.iter().all(Option::is_none) {
            continue;
        }
        let radii: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        push_polygon(&mut svg, cx, cy, &radii, level_color(*level));
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-size="12" fill="{}">{}</text>"##,
            12.0 + 90.0 * i as f64,
            size + 18.0,
            level_color(*level),
            level
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

/// Grid of per-item radar charts on the probability scale.
pub fn item_charts(rows: &[&PosteriorRow], labels: &TopicLabels) -> String {
    let k = labels.len().max(1);
    let cell = 2.0 * (CELL_RADIUS + 45.0);
    let columns = ITEM_COLUMNS.min(rows.len().max(1));
    let lines = rows.len().div_ceil(ITEM_COLUMNS).max(1);

    let max_p = rows
        .iter()
        .flat_map(|r| r.probabilities.iter().copied())
        .fold(1.0 / k as f64, f64::max);

    let mut svg = open_svg(cell * columns as f64, cell * lines as f64);
    for (i, row) in rows.iter().enumerate() {
        let cx = cell * (i % ITEM_COLUMNS) as f64 + cell / 2.0;
        let cy = cell * (i / ITEM_COLUMNS) as f64 + cell / 2.0;

        push_axes(&mut svg, cx, cy, CELL_RADIUS, labels, false);
        svg.push_str(&format!(
            r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{:.1}" fill="none" stroke="#555" stroke-dasharray="4 3"/>"##,
            CELL_RADIUS / (k as f64 * max_p)
        ));
        svg.push('\n');

        let radii: Vec<f64> = row
            .probabilities
            .iter()
            .map(|p| CELL_RADIUS * p / max_p)
            .collect();
        push_polygon(&mut svg, cx, cy, &radii, "#1f77b4");
        svg.push_str(&format!(
            r##"<text x="{cx:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"##,
            cy - CELL_RADIUS - 30.0,
            escape(&row.document)
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn write_svg(svg: &str, path: &Path) -> Result<()> {
    fs::write(path, svg).map_err(|e| AlignError::io(path.display().to_string(), e))
}

fn open_svg(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
         viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n"
    )
}

/// Spokes for each topic, clockwise from 12 o'clock, with optional labels.
fn push_axes(svg: &mut String, cx: f64, cy: f64, radius: f64, labels: &TopicLabels, named: bool) {
    let k = labels.len();
    for t in 0..k {
        let (x, y) = polar(cx, cy, radius, t, k);
        svg.push_str(&format!(
            r##"<line x1="{cx:.1}" y1="{cy:.1}" x2="{x:.1}" y2="{y:.1}" stroke="#ccc"/>"##
        ));
        svg.push('\n');

        let (lx, ly) = polar(cx, cy, radius + if named { 24.0 } else { 14.0 }, t, k);
        let size = if named { 13 } else { 9 };
        svg.push_str(&format!(
            r##"<text x="{lx:.1}" y="{ly:.1}" font-size="{size}" text-anchor="middle" dominant-baseline="middle">{}</text>"##,
            escape(labels.name(t))
        ));
        svg.push('\n');
    }
    svg.push_str(&format!(
        r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="none" stroke="#ccc"/>"##
    ));
    svg.push('\n');
}

fn push_polygon(svg: &mut String, cx: f64, cy: f64, radii: &[f64], color: &str) {
    let k = radii.len();
    let points = radii
        .iter()
        .enumerate()
        .map(|(t, &r)| {
            let (x, y) = polar(cx, cy, r.max(0.0), t, k);
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r##"<polygon points="{points}" fill="{color}" fill-opacity="0.15" stroke="{color}" stroke-width="2"/>"##
    ));
    svg.push('\n');
}

fn polar(cx: f64, cy: f64, r: f64, index: usize, k: usize) -> (f64, f64) {
    let angle = 2.0 * PI * index as f64 / k.max(1) as f64 - PI / 2.0;
    (cx + r * angle.cos(), cy + r * angle.sin())
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Low => "#2ca02c",
        Level::Medium => "#ff7f0e",
        Level::High => "#d62728",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(topic: usize, level: Level, log_ratio: f64) -> CoveragePoint {
        CoveragePoint {
            topic,
            label: format!("Topic {topic}"),
            level,
            n: 1,
            mean_probability: 0.0,
            log_ratio,
        }
    }

    #[test]
    fn test_coverage_chart_has_polygon_per_level() {
        let labels = TopicLabels::numbered(3);
        let points: Vec<CoveragePoint> = (1..=3)
            .flat_map(|t| [point(t, Level::Low, 0.2), point(t, Level::High, -0.4)])
            .collect();
        let svg = coverage_chart(&points, &labels);
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_item_charts_one_cell_per_item() {
        let labels = TopicLabels::numbered(2);
        let rows: Vec<PosteriorRow> = ["L1", "M<2>"]
            .iter()
            .map(|id| PosteriorRow {
                document: id.to_string(),
                probabilities: vec![0.3, 0.7],
                matched_tokens: 2,
                total_tokens: 2,
            })
            .collect();
        let refs: Vec<&PosteriorRow> = rows.iter().collect();
        let svg = item_charts(&refs, &labels);
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains("M&lt;2&gt;"));
    }
}
