use super::fonts::{ensure_sans_serif, FontMetrics};
use super::layout::{CANVAS_HEIGHT, CANVAS_WIDTH};
use super::{render_share_svg, BackgroundSource, ShareError};
use crate::config::DisplayConfig;
use crate::workflows::matching::ScoredResult;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::fontdb::Database;
use resvg::usvg::{Options, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Renders share cards to PNG. Holds the font database shared between text
/// measurement and rasterization, so it is built once and reused.
#[derive(Clone)]
pub struct ShareRenderer {
    fonts: Arc<Database>,
}

impl ShareRenderer {
    /// Loads the system fonts plus every font in `extra_dir`.
    pub fn with_system_fonts(extra_dir: Option<&Path>) -> Self {
        let mut fonts = Database::new();
        fonts.load_system_fonts();
        if let Some(dir) = extra_dir {
            fonts.load_fonts_dir(dir);
        }
        Self::from_database(fonts)
    }

    /// Renderer with an empty font database. Text is measured with the
    /// estimate and left out of the raster.
    pub fn without_fonts() -> Self {
        Self::from_database(Database::new())
    }

    pub fn from_database(mut fonts: Database) -> Self {
        ensure_sans_serif(&mut fonts);
        debug!(faces = fonts.len(), "share card fonts loaded");
        Self {
            fonts: Arc::new(fonts),
        }
    }

    pub fn metrics(&self) -> FontMetrics {
        FontMetrics::new(Arc::clone(&self.fonts))
    }

    pub fn render_svg(
        &self,
        top_result: Option<&ScoredResult>,
        display: &DisplayConfig,
        backgrounds: &dyn BackgroundSource,
    ) -> Result<String, ShareError> {
        render_share_svg(top_result, display, backgrounds, &self.metrics())
    }

    /// Renders the card for `top_result` as a 1080×1350 PNG.
    pub fn render_png(
        &self,
        top_result: Option<&ScoredResult>,
        display: &DisplayConfig,
        backgrounds: &dyn BackgroundSource,
    ) -> Result<Vec<u8>, ShareError> {
        let svg = self.render_svg(top_result, display, backgrounds)?;
        self.rasterize(&svg)
    }

    fn rasterize(&self, svg: &str) -> Result<Vec<u8>, ShareError> {
        let options = Options {
            fontdb: Arc::clone(&self.fonts),
            ..Options::default()
        };
        let tree = Tree::from_str(svg, &options).map_err(|err| ShareError::Render(err.to_string()))?;

        let mut pixmap = Pixmap::new(CANVAS_WIDTH as u32, CANVAS_HEIGHT as u32)
            .ok_or_else(|| ShareError::Render("canvas allocation failed".to_string()))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|err| ShareError::Render(err.to_string()))
    }
}
