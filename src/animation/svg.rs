use std::fmt::Write;

use super::{Paint, Rgba, Surface};

/// Records draw calls as SVG elements. `clear` discards everything drawn so far,
/// so the finished document holds only what survived the last clear.
pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: Vec<String>,
    elements: Vec<String>,
    gradient_seq: usize,
}

fn fill_attrs(color: Rgba) -> String {
    format!(r#"fill="rgb({})" fill-opacity="{:.3}""#, color.rgb, color.alpha)
}

fn stroke_attrs(color: Rgba, width: f64) -> String {
    format!(
        r#"fill="none" stroke="rgb({})" stroke-opacity="{:.3}" stroke-width="{:.2}""#,
        color.rgb, color.alpha, width
    )
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            elements: Vec::new(),
            gradient_seq: 0,
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn finish(self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for d in &self.defs {
                out.push_str(d);
            }
            out.push_str("</defs>");
        }
        for e in &self.elements {
            out.push_str(e);
        }
        out.push_str("</svg>");
        out
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.defs.clear();
        self.elements.clear();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        let fill = match paint {
            Paint::Solid(color) => fill_attrs(*color),
            Paint::LinearGradient { from, to, stops } => {
                self.gradient_seq += 1;
                let id = format!("g{}", self.gradient_seq);
                let mut def = format!(
                    r#"<linearGradient id="{}" gradientUnits="userSpaceOnUse" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}">"#,
                    id, from.0, from.1, to.0, to.1
                );
                for (offset, color) in stops {
                    let _ = write!(
                        def,
                        r#"<stop offset="{:.2}" stop-color="rgb({})" stop-opacity="{:.3}"/>"#,
                        offset, color.rgb, color.alpha
                    );
                }
                def.push_str("</linearGradient>");
                self.defs.push(def);
                format!(r#"fill="url(#{})""#, id)
            }
        };
        self.elements.push(format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}/>"#,
            x, y, width, height, fill
        ));
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        self.elements.push(format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" {}/>"#,
            cx,
            cy,
            r,
            fill_attrs(color)
        ));
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {}/>"#,
            from.0,
            from.1,
            to.0,
            to.1,
            stroke_attrs(color, width)
        ));
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: Rgba, width: f64) {
        if points.is_empty() {
            return;
        }
        let mut pts = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            if i > 0 {
                pts.push(' ');
            }
            let _ = write!(pts, "{:.2},{:.2}", x, y);
        }
        self.elements.push(format!(
            r#"<polyline points="{}" {}/>"#,
            pts,
            stroke_attrs(color, width)
        ));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Rgba) {
        self.elements.push(format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="monospace" font-size="{:.0}" {}>{}</text>"#,
            x,
            y,
            size,
            fill_attrs(color),
            html_escape::encode_text(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::color::Rgb;

    const ACCENT: Rgb = Rgb { r: 139, g: 92, b: 246 };

    #[test]
    fn clear_discards_previous_frame() {
        let mut svg = SvgSurface::new(10.0, 10.0);
        svg.fill_circle(1.0, 1.0, 1.0, Rgba::new(ACCENT, 0.5));
        svg.clear(10.0, 10.0);
        svg.fill_circle(2.0, 2.0, 1.0, Rgba::new(ACCENT, 0.5));
        assert_eq!(svg.element_count(), 1);
        let doc = svg.finish();
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"cx="2.00""#));
        assert!(!doc.contains(r#"cx="1.00""#));
        assert!(doc.contains("rgb(139,92,246)"));
    }

    #[test]
    fn gradient_fill_references_def() {
        let mut svg = SvgSurface::new(100.0, 50.0);
        svg.fill_rect(
            0.0,
            0.0,
            100.0,
            50.0,
            &Paint::LinearGradient {
                from: (0.0, 0.0),
                to: (100.0, 50.0),
                stops: vec![(0.0, Rgba::new(ACCENT, 0.12)), (1.0, Rgba::new(ACCENT, 0.1))],
            },
        );
        let doc = svg.finish();
        assert!(doc.contains(r#"<linearGradient id="g1""#));
        assert!(doc.contains(r#"fill="url(#g1)""#));
        assert!(doc.contains(r#"stop-opacity="0.120""#));
    }

    #[test]
    fn text_is_escaped() {
        let mut svg = SvgSurface::new(10.0, 10.0);
        svg.fill_text("<&>", 0.0, 0.0, 14.0, Rgba::new(ACCENT, 0.7));
        let doc = svg.finish();
        assert!(doc.contains("&lt;&amp;&gt;"));
    }
}
