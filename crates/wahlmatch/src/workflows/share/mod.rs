//! Shareable result card summarizing the best match.
//!
//! The card is laid out as a fixed-size SVG document and rasterized to PNG.
//! A background image that cannot be resolved never fails the card; a
//! generated gradient is drawn instead.

mod fonts;
mod layout;
mod raster;
mod svg;

pub use fonts::{EstimatedMetrics, FontMetrics, TextMeasure};
pub use layout::{CANVAS_HEIGHT, CANVAS_WIDTH};
pub use raster::ShareRenderer;
pub use svg::Background;

use crate::config::DisplayConfig;
use crate::workflows::matching::ScoredResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const SHARE_FILE_NAME: &str = "match-card.png";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("a top result is required to render the share card")]
    MissingResult,
    #[error("unable to load share background '{reference}': {reason}")]
    Background { reference: String, reason: String },
    #[error("unable to rasterize share card: {0}")]
    Render(String),
}

/// Resolves a configured background reference into a self-contained href.
pub trait BackgroundSource: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ShareError>;
}

/// Resolves background references against a directory of static assets and
/// embeds the image bytes as a `data:` URI. Remote references are not
/// fetched.
#[derive(Debug, Clone)]
pub struct FileBackgrounds {
    root: PathBuf,
}

impl FileBackgrounds {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl BackgroundSource for FileBackgrounds {
    fn resolve(&self, reference: &str) -> Result<String, ShareError> {
        let failure = |reason: String| ShareError::Background {
            reference: reference.to_string(),
            reason,
        };

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(failure("remote backgrounds are not fetched".to_string()));
        }

        let path = self.root.join(reference.trim_start_matches('/'));
        let bytes = std::fs::read(&path).map_err(|err| failure(err.to_string()))?;
        let media_type = sniff_media_type(&bytes)
            .ok_or_else(|| failure("not a PNG, JPEG, GIF or WebP image".to_string()))?;

        Ok(format!("data:{media_type};base64,{}", STANDARD.encode(&bytes)))
    }
}

fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Lays out the card for `top_result` and returns the SVG document.
pub fn render_share_svg(
    top_result: Option<&ScoredResult>,
    display: &DisplayConfig,
    backgrounds: &dyn BackgroundSource,
    metrics: &dyn TextMeasure,
) -> Result<String, ShareError> {
    let result = top_result.ok_or(ShareError::MissingResult)?;
    let background = resolve_background(display, backgrounds);
    let layout = layout::layout(result, display, metrics);
    Ok(svg::render(&layout, &background))
}

pub fn resolve_background(display: &DisplayConfig, backgrounds: &dyn BackgroundSource) -> Background {
    let primary = display
        .colors
        .get("primary")
        .cloned()
        .unwrap_or_else(|| layout::DEFAULT_PRIMARY.to_string());
    let secondary = display
        .colors
        .get("secondary")
        .cloned()
        .unwrap_or_else(|| layout::DEFAULT_SECONDARY.to_string());

    let Some(reference) = display.share.background.as_deref().filter(|r| !r.is_empty()) else {
        return Background::Diagonal {
            from: primary,
            to: secondary,
        };
    };

    match backgrounds.resolve(reference) {
        Ok(href) => Background::Image {
            href,
            from: primary,
            to: secondary,
        },
        Err(err) => {
            warn!(error = %err, "falling back to gradient share background");
            let background = display
                .colors
                .get("background")
                .cloned()
                .unwrap_or_else(|| layout::DEFAULT_BACKGROUND.to_string());
            Background::Fallback {
                from: background,
                to: primary,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShareConfig;
    use crate::workflows::matching::{Party, PartyId};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    struct AlwaysMissing;

    impl BackgroundSource for AlwaysMissing {
        fn resolve(&self, reference: &str) -> Result<String, ShareError> {
            Err(ShareError::Background {
                reference: reference.to_string(),
                reason: "not found".to_string(),
            })
        }
    }

    struct Resolves;

    impl BackgroundSource for Resolves {
        fn resolve(&self, reference: &str) -> Result<String, ShareError> {
            Ok(format!("data:image/png;base64,{reference}"))
        }
    }

    fn top(percentage: f64, color: &str) -> ScoredResult {
        ScoredResult {
            party: Party {
                id: PartyId::from("grn"),
                name: "Grüne & Freunde".to_string(),
                short_name: "GRN".to_string(),
                color: color.to_string(),
                logo: String::new(),
                description: String::new(),
            },
            percentage,
            points: 0,
            max_points: 0,
            agree_count: 0,
            neutral_count: 0,
            disagree_count: 0,
            positions: Vec::new(),
        }
    }

    fn with_background(reference: &str) -> DisplayConfig {
        DisplayConfig {
            share: ShareConfig {
                background: Some(reference.to_string()),
                ..ShareConfig::default()
            },
            ..DisplayConfig::default()
        }
    }

    fn svg(
        result: Option<&ScoredResult>,
        display: &DisplayConfig,
        source: &dyn BackgroundSource,
    ) -> Result<String, ShareError> {
        render_share_svg(result, display, source, &EstimatedMetrics)
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wahlmatch-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn tiny_png() -> Vec<u8> {
        let mut pixmap = resvg::tiny_skia::Pixmap::new(2, 2).expect("pixmap");
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(200, 40, 90, 255));
        pixmap.encode_png().expect("encode")
    }

    #[test]
    fn missing_result_is_an_error() {
        let error = svg(None, &DisplayConfig::default(), &Resolves).expect_err("no result");
        assert!(matches!(error, ShareError::MissingResult));
    }

    #[test]
    fn card_shows_rounded_percentage_and_escaped_name() {
        let card = svg(Some(&top(66.6667, "#00ff00")), &DisplayConfig::default(), &Resolves)
            .expect("card renders");

        assert!(card.starts_with("<svg"));
        assert!(card.contains(r#"width="1080" height="1350""#));
        assert!(card.contains(">67%</text>"));
        assert!(card.contains("Grüne &amp; Freunde"));
        assert!(card.contains("Dein Match • GRN"));
        assert!(card.contains(r##"fill="#00ff00""##));
        assert!(card.ends_with("</svg>"));
    }

    #[test]
    fn party_color_falls_back_to_primary() {
        let mut display = DisplayConfig::default();
        display
            .colors
            .insert("primary".to_string(), "#abcdef".to_string());

        let party = top(10.0, "").party;
        assert_eq!(layout::party_color(&party, &display), "#abcdef");
        assert_eq!(
            layout::party_color(&party, &DisplayConfig::default()),
            "#f472b6"
        );
    }

    #[test]
    fn unresolvable_background_falls_back_to_gradient() {
        let display = with_background("missing.png");
        let background = resolve_background(&display, &AlwaysMissing);
        assert_eq!(
            background,
            Background::Fallback {
                from: "#0f172a".to_string(),
                to: "#8b5cf6".to_string(),
            }
        );

        let card = svg(Some(&top(50.0, "#111111")), &display, &AlwaysMissing)
            .expect("card still renders");
        assert!(!card.contains("<image"));
        assert!(card.contains(r#"fill="url(#backdrop)""#));
    }

    #[test]
    fn configured_background_is_drawn_over_the_gradient() {
        let display = with_background("AAAA");
        let card = svg(Some(&top(50.0, "#111111")), &display, &Resolves).expect("card renders");

        let gradient = card.find(r#"fill="url(#backdrop)""#).expect("gradient underlay");
        let image = card
            .find(r#"href="data:image/png;base64,AAAA""#)
            .expect("embedded image");
        assert!(gradient < image);
    }

    #[test]
    fn no_background_uses_diagonal_gradient() {
        let background = resolve_background(&DisplayConfig::default(), &AlwaysMissing);
        assert_eq!(
            background,
            Background::Diagonal {
                from: "#8b5cf6".to_string(),
                to: "#6366f1".to_string(),
            }
        );
    }

    #[test]
    fn file_backgrounds_embed_image_bytes() {
        let dir = scratch_dir("bg-embed");
        let png = tiny_png();
        std::fs::write(dir.join("bg.png"), &png).expect("write png");

        let href = FileBackgrounds::new(&dir).resolve("/bg.png").expect("resolves");
        let encoded = href
            .strip_prefix("data:image/png;base64,")
            .expect("png data uri");
        assert_eq!(STANDARD.decode(encoded).expect("base64"), png);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_backgrounds_reject_missing_remote_and_non_image_files() {
        let dir = scratch_dir("bg-reject");
        std::fs::write(dir.join("notes.txt"), "not an image").expect("write text");
        let source = FileBackgrounds::new(&dir);

        assert!(source.resolve("bg.png").is_err());
        assert!(source.resolve("notes.txt").is_err());
        assert!(source.resolve("https://cdn.example.org/bg.png").is_err());

        let display = with_background("notes.txt");
        assert!(matches!(
            resolve_background(&display, &source),
            Background::Fallback { .. }
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sniffing_recognizes_common_formats() {
        assert_eq!(sniff_media_type(PNG_SIGNATURE), Some("image/png"));
        assert_eq!(sniff_media_type(&[0xff, 0xd8, 0xff, 0xe0]), Some("image/jpeg"));
        assert_eq!(sniff_media_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_media_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_media_type(b"<svg"), None);
    }

    #[test]
    fn png_card_has_canvas_dimensions() {
        let renderer = ShareRenderer::without_fonts();
        let png = renderer
            .render_png(Some(&top(75.0, "#e3000f")), &DisplayConfig::default(), &AlwaysMissing)
            .expect("png renders");

        assert!(png.starts_with(PNG_SIGNATURE));
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (1080, 1350));
    }

    #[test]
    fn png_card_renders_with_embedded_background() {
        let dir = scratch_dir("bg-png");
        std::fs::write(dir.join("bg.png"), tiny_png()).expect("write png");

        let renderer = ShareRenderer::without_fonts();
        let png = renderer
            .render_png(
                Some(&top(40.0, "")),
                &with_background("bg.png"),
                &FileBackgrounds::new(&dir),
            )
            .expect("png renders");
        assert!(png.starts_with(PNG_SIGNATURE));

        std::fs::remove_dir_all(&dir).ok();
    }
}
