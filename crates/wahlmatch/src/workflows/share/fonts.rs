use resvg::usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::sync::Arc;

/// Families requested by the card, in preference order. The generic
/// sans-serif family closes the list.
pub(crate) const PREFERRED_FAMILIES: &[&str] = &["Poppins", "Montserrat", "Segoe UI"];

/// Average advance of a glyph relative to the font size, used when no font
/// face is available to measure with.
const GLYPH_WIDTH_EM: f64 = 0.56;

/// Horizontal extent of a run of text at a given size and weight.
pub trait TextMeasure {
    fn width(&self, text: &str, size: u32, weight: u16) -> f64;
}

/// Width estimate from a fixed average glyph advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn width(&self, text: &str, size: u32, _weight: u16) -> f64 {
        text.chars().count() as f64 * f64::from(size) * GLYPH_WIDTH_EM
    }
}

/// Glyph advances read from the face the renderer will draw with.
#[derive(Clone)]
pub struct FontMetrics {
    fonts: Arc<Database>,
}

impl FontMetrics {
    pub fn new(fonts: Arc<Database>) -> Self {
        Self { fonts }
    }

    fn face_width(&self, text: &str, size: u32, weight: u16) -> Option<f64> {
        let families = [
            Family::Name(PREFERRED_FAMILIES[0]),
            Family::Name(PREFERRED_FAMILIES[1]),
            Family::Name(PREFERRED_FAMILIES[2]),
            Family::SansSerif,
        ];
        let id = self.fonts.query(&Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;

        self.fonts
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                let units = f64::from(face.units_per_em());
                let missing = units * GLYPH_WIDTH_EM;
                let advance: f64 = text
                    .chars()
                    .map(|ch| {
                        face.glyph_index(ch)
                            .and_then(|glyph| face.glyph_hor_advance(glyph))
                            .map(f64::from)
                            .unwrap_or(missing)
                    })
                    .sum();
                Some(advance / units * f64::from(size))
            })
            .flatten()
    }
}

impl TextMeasure for FontMetrics {
    fn width(&self, text: &str, size: u32, weight: u16) -> f64 {
        self.face_width(text, size, weight)
            .unwrap_or_else(|| EstimatedMetrics.width(text, size, weight))
    }
}

/// Points the generic sans-serif family at an installed face when the
/// platform default is missing, so card text always has a face to use.
pub(crate) fn ensure_sans_serif(fonts: &mut Database) {
    let query = Query {
        families: &[Family::SansSerif],
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    if fonts.query(&query).is_some() {
        return;
    }

    let fallback = fonts
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
    if let Some(name) = fallback {
        fonts.set_sans_serif_family(name);
    }
}
