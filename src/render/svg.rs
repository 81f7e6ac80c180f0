//! SVG composition for line charts and polar histograms

use std::fmt::Write as _;

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

/// Escapes text for use inside SVG elements and attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Roughly `count` evenly spaced round tick values covering `[min, max]`
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || count == 0 {
        return Vec::new();
    }
    let raw_step = (max - min) / count as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e7 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// One plotted line
#[derive(Debug, Clone)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    pub points: Vec<(f64, f64)>,
}

/// A horizontal reference line
#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: String,
    pub dashed: bool,
    pub label: Option<String>,
}

/// Cartesian line chart with markers, reference lines and a legend
#[derive(Debug, Clone)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub series: Vec<LineSeries>,
    pub reference_lines: Vec<ReferenceLine>,
    /// Explicit x ticks; computed from the data when `None`
    pub x_ticks: Option<Vec<f64>>,
}

const MARGIN_LEFT: f64 = 150.0;
const MARGIN_RIGHT: f64 = 50.0;
const MARGIN_TOP: f64 = 90.0;
const MARGIN_BOTTOM: f64 = 120.0;

impl LineChart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            width: 1600,
            height: 1000,
            series: Vec::new(),
            reference_lines: Vec::new(),
            x_ticks: None,
        }
    }

    pub fn x_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.x_ticks = Some(ticks);
        self
    }

    pub fn line(mut self, label: impl Into<String>, color: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        self.series.push(LineSeries {
            label: label.into(),
            color: color.into(),
            points,
        });
        self
    }

    pub fn reference(mut self, y: f64, color: impl Into<String>, dashed: bool, label: Option<String>) -> Self {
        self.reference_lines.push(ReferenceLine {
            y,
            color: color.into(),
            dashed,
            label,
        });
        self
    }

    fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let finite = |v: &f64| v.is_finite();
        let xs = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.0))
            .chain(self.x_ticks.iter().flatten().copied())
            .filter(finite);
        let ys = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .chain(self.reference_lines.iter().map(|r| r.y))
            .filter(finite);

        let pad = |(lo, hi): (f64, f64), fraction: f64| {
            if !lo.is_finite() {
                (0.0, 1.0)
            } else if hi - lo < f64::EPSILON * lo.abs().max(1.0) {
                (lo - 1.0, hi + 1.0)
            } else {
                let m = (hi - lo) * fraction;
                (lo - m, hi + m)
            }
        };

        (pad(bounds(xs), 0.04), pad(bounds(ys), 0.08))
    }

    /// Renders the chart as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = h - MARGIN_TOP - MARGIN_BOTTOM;
        let ((x_min, x_max), (y_min, y_max)) = self.ranges();

        let sx = |x: f64| MARGIN_LEFT + (x - x_min) / (x_max - x_min) * plot_w;
        let sy = |y: f64| MARGIN_TOP + (y_max - y) / (y_max - y_min) * plot_h;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT_FAMILY}">"#
        );
        let _ = write!(svg, r#"<rect width="{w}" height="{h}" fill="white"/>"#);

        // Axes frame
        let _ = write!(
            svg,
            r##"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#333" stroke-width="2"/>"##
        );

        let x_ticks = self
            .x_ticks
            .clone()
            .unwrap_or_else(|| nice_ticks(x_min, x_max, 8));
        for tick in x_ticks.iter().filter(|t| (x_min..=x_max).contains(*t)) {
            let x = sx(*tick);
            let base = MARGIN_TOP + plot_h;
            let _ = write!(
                svg,
                r##"<line x1="{x:.1}" y1="{base:.1}" x2="{x:.1}" y2="{:.1}" stroke="#333" stroke-width="2"/><text x="{x:.1}" y="{:.1}" font-size="26" text-anchor="middle">{}</text>"##,
                base + 10.0,
                base + 42.0,
                format_tick(*tick)
            );
        }
        for tick in nice_ticks(y_min, y_max, 6) {
            let y = sy(tick);
            let _ = write!(
                svg,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{MARGIN_LEFT}" y2="{y:.1}" stroke="#333" stroke-width="2"/><line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd" stroke-width="1"/><text x="{:.1}" y="{:.1}" font-size="26" text-anchor="end">{}</text>"##,
                MARGIN_LEFT - 10.0,
                MARGIN_LEFT + plot_w,
                MARGIN_LEFT - 16.0,
                y + 9.0,
                format_tick(tick)
            );
        }

        for line in &self.reference_lines {
            if !line.y.is_finite() {
                continue;
            }
            let y = sy(line.y);
            let dash = if line.dashed { r#" stroke-dasharray="14 8""# } else { "" };
            let _ = write!(
                svg,
                r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"{dash}/>"#,
                MARGIN_LEFT + plot_w,
                escape(&line.color)
            );
        }

        for series in &self.series {
            let color = escape(&series.color);
            // NaN breaks the line into separate segments
            for segment in series.points.split(|p| !(p.0.is_finite() && p.1.is_finite())) {
                if segment.len() > 1 {
                    let points: Vec<String> = segment
                        .iter()
                        .map(|&(x, y)| format!("{:.1},{:.1}", sx(x), sy(y)))
                        .collect();
                    let _ = write!(
                        svg,
                        r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="3"/>"#,
                        points.join(" ")
                    );
                }
                for &(x, y) in segment {
                    let _ = write!(
                        svg,
                        r#"<circle cx="{:.1}" cy="{:.1}" r="7" fill="{color}"/>"#,
                        sx(x),
                        sy(y)
                    );
                }
            }
        }

        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="55" font-size="34" text-anchor="middle">{}</text>"#,
            w / 2.0,
            escape(&self.title)
        );
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="28" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            h - 30.0,
            escape(&self.x_label)
        );
        let cy = MARGIN_TOP + plot_h / 2.0;
        let _ = write!(
            svg,
            r#"<text x="45" y="{cy:.1}" font-size="28" text-anchor="middle" transform="rotate(-90 45 {cy:.1})">{}</text>"#,
            escape(&self.y_label)
        );

        self.write_legend(&mut svg, MARGIN_LEFT + plot_w);
        svg.push_str("</svg>");
        svg
    }

    fn write_legend(&self, svg: &mut String, right: f64) {
        let mut entries: Vec<(&str, &str, bool)> = self
            .series
            .iter()
            .map(|s| (s.label.as_str(), s.color.as_str(), false))
            .collect();
        entries.extend(
            self.reference_lines
                .iter()
                .filter_map(|r| r.label.as_deref().map(|l| (l, r.color.as_str(), r.dashed))),
        );
        if entries.is_empty() {
            return;
        }

        let longest = entries.iter().map(|e| e.0.chars().count()).max().unwrap_or(0);
        let box_w = 90.0 + longest as f64 * 14.0;
        let box_h = 20.0 + entries.len() as f64 * 36.0;
        let x0 = right - box_w - 15.0;
        let y0 = MARGIN_TOP + 15.0;
        let _ = write!(
            svg,
            r##"<rect x="{x0:.1}" y="{y0:.1}" width="{box_w:.1}" height="{box_h:.1}" fill="white" fill-opacity="0.85" stroke="#999"/>"##
        );
        for (i, (label, color, dashed)) in entries.iter().enumerate() {
            let y = y0 + 28.0 + i as f64 * 36.0;
            let dash = if *dashed { r#" stroke-dasharray="10 6""# } else { "" };
            let _ = write!(
                svg,
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="3"{dash}/><text x="{:.1}" y="{:.1}" font-size="24">{}</text>"#,
                x0 + 12.0,
                x0 + 62.0,
                escape(color),
                x0 + 74.0,
                y + 8.0,
                escape(label)
            );
        }
    }
}

/// One polar histogram panel
#[derive(Debug, Clone)]
pub struct RosePanel {
    pub title: String,
    pub color: String,
    /// Percent per sector, clockwise from north
    pub frequencies: Vec<f64>,
}

/// Side-by-side polar histograms, north up and clockwise
pub fn rose_svg(panels: &[RosePanel], panel_size: u32) -> String {
    let size = f64::from(panel_size);
    let width = size * panels.len() as f64;
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{size}" viewBox="0 0 {width} {size}" font-family="{FONT_FAMILY}"><rect width="{width}" height="{size}" fill="white"/>"#
    );

    for (index, panel) in panels.iter().enumerate() {
        let cx = size * (index as f64 + 0.5);
        let cy = size * 0.53;
        let radius = size * 0.36;
        let peak = panel.frequencies.iter().copied().fold(0.0_f64, f64::max);

        for ring in 1..=4 {
            let r = radius * f64::from(ring) / 4.0;
            let _ = write!(
                svg,
                r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="none" stroke="#ccc" stroke-width="1.5"/>"##
            );
        }
        for (label, angle) in [("N", 0.0_f64), ("E", 90.0), ("S", 180.0), ("W", 270.0)] {
            let (x, y) = polar(cx, cy, radius + size * 0.05, angle);
            let _ = write!(
                svg,
                r#"<text x="{x:.1}" y="{:.1}" font-size="{:.0}" text-anchor="middle">{label}</text>"#,
                y + size * 0.015,
                size * 0.04
            );
        }

        let sectors = panel.frequencies.len();
        if sectors > 0 && peak > 0.0 {
            let span = 360.0 / sectors as f64;
            for (sector, &freq) in panel.frequencies.iter().enumerate() {
                if freq <= 0.0 {
                    continue;
                }
                let r = radius * freq / peak;
                let start = sector as f64 * span;
                let (x1, y1) = polar(cx, cy, r, start);
                let (x2, y2) = polar(cx, cy, r, start + span);
                let _ = write!(
                    svg,
                    r#"<path d="M {cx:.1} {cy:.1} L {x1:.1} {y1:.1} A {r:.1} {r:.1} 0 0 1 {x2:.1} {y2:.1} Z" fill="{}" fill-opacity="0.7" stroke="black" stroke-width="1.5"/>"#,
                    escape(&panel.color)
                );
            }
        }

        let _ = write!(
            svg,
            r#"<text x="{cx:.1}" y="{:.1}" font-size="{:.0}" text-anchor="middle">{}</text>"#,
            size * 0.07,
            size * 0.045,
            escape(&panel.title)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Screen point at `radius` from the center, `degrees` clockwise from north
fn polar(cx: f64, cy: f64, radius: f64, degrees: f64) -> (f64, f64) {
    let theta = degrees.to_radians();
    (cx + radius * theta.sin(), cy - radius * theta.cos())
}
