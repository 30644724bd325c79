use super::fonts::PREFERRED_FAMILIES;
use super::layout::{Anchor, Baseline, CardLayout, Element, CANVAS_HEIGHT, CANVAS_WIDTH, SAFE_AREA};

/// Card backdrop after resolving the configured background image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// Configured image, drawn over the diagonal gradient.
    Image { href: String, from: String, to: String },
    /// Diagonal gradient used when no image is configured.
    Diagonal { from: String, to: String },
    /// Vertical gradient used when the configured image failed to load.
    Fallback { from: String, to: String },
}

pub(crate) fn render(layout: &CardLayout, background: &Background) -> String {
    let mut svg = String::with_capacity(8 * 1024);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
    ));
    let font_family = font_family();
    svg.push_str(&defs(background));
    svg.push_str(&backdrop(background));

    for element in &layout.elements {
        match element {
            Element::Rect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                opacity,
            } => {
                let radius = radius.min(width / 2.0).min(height / 2.0);
                svg.push_str(&format!(
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{height:.1}" rx="{radius:.1}" fill="{}" fill-opacity="{opacity}"/>"#,
                    escape(fill),
                ));
            }
            Element::Text {
                x,
                y,
                content,
                size,
                weight,
                fill,
                anchor,
                baseline,
            } => {
                svg.push_str(&format!(
                    r#"<text x="{x:.1}" y="{y:.1}" font-family="{}" font-size="{size}" font-weight="{weight}" fill="{}" text-anchor="{}" dominant-baseline="{}">{}</text>"#,
                    escape(&font_family),
                    escape(fill),
                    anchor_name(*anchor),
                    baseline_name(*baseline),
                    escape(content),
                ));
            }
            Element::DashedArc {
                cx,
                cy,
                radius,
                start,
                end,
            } => {
                let (x1, y1) = (cx + radius * start.cos(), cy + radius * start.sin());
                let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
                let large_arc = u8::from(end - start > std::f64::consts::PI);
                svg.push_str(&format!(
                    r#"<path d="M {x1:.1} {y1:.1} A {radius} {radius} 0 {large_arc} 1 {x2:.1} {y2:.1}" fill="none" stroke="rgba(255, 255, 255, 0.35)" stroke-width="3" stroke-dasharray="12 18"/>"#,
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn defs(background: &Background) -> String {
    let mut defs = String::from("<defs>");
    match background {
        Background::Diagonal { from, to } | Background::Image { from, to, .. } => {
            defs.push_str(&format!(
                r#"<linearGradient id="backdrop" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="{CANVAS_WIDTH}" y2="{CANVAS_HEIGHT}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient>"#,
                escape(from),
                escape(to),
            ));
        }
        Background::Fallback { from, to } => {
            defs.push_str(&format!(
                r#"<linearGradient id="backdrop" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="0" y2="{CANVAS_HEIGHT}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient>"#,
                escape(from),
                escape(to),
            ));
        }
    }
    defs.push_str(&format!(
        r#"<linearGradient id="overlay" gradientUnits="userSpaceOnUse" x1="0" y1="{SAFE_AREA}" x2="0" y2="{}"><stop offset="0" stop-color="rgb(15, 23, 42)" stop-opacity="0.55"/><stop offset="1" stop-color="rgb(15, 23, 42)" stop-opacity="0.2"/></linearGradient>"#,
        CANVAS_HEIGHT - SAFE_AREA,
    ));
    defs.push_str("</defs>");
    defs
}

fn backdrop(background: &Background) -> String {
    let full = format!(r#"x="0" y="0" width="{CANVAS_WIDTH}" height="{CANVAS_HEIGHT}""#);
    let overlay = format!(r#"<rect {full} fill="url(#overlay)"/>"#);
    match background {
        Background::Image { href, .. } => format!(
            r#"<rect {full} fill="url(#backdrop)"/><image {full} href="{}" preserveAspectRatio="xMidYMid slice"/>{overlay}"#,
            escape(href),
        ),
        Background::Diagonal { .. } => format!(r#"<rect {full} fill="url(#backdrop)"/>{overlay}"#),
        // The fallback gradient is drawn without the darkening overlay.
        Background::Fallback { .. } => format!(r#"<rect {full} fill="url(#backdrop)"/>"#),
    }
}

fn font_family() -> String {
    let mut families: Vec<String> = PREFERRED_FAMILIES
        .iter()
        .map(|family| format!("'{family}'"))
        .collect();
    families.push("sans-serif".to_string());
    families.join(", ")
}

fn anchor_name(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn baseline_name(baseline: Baseline) -> &'static str {
    match baseline {
        Baseline::Top => "hanging",
        Baseline::Middle => "middle",
        Baseline::Alphabetic => "alphabetic",
        Baseline::Bottom => "text-after-edge",
    }
}

pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
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
