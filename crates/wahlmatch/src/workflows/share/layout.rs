use super::fonts::TextMeasure;
use crate::config::DisplayConfig;
use crate::workflows::matching::{Party, ScoredResult};
use std::f64::consts::PI;

pub const CANVAS_WIDTH: f64 = 1080.0;
pub const CANVAS_HEIGHT: f64 = 1350.0;
pub const SAFE_AREA: f64 = 120.0;

const CONTENT_WIDTH: f64 = CANVAS_WIDTH - SAFE_AREA * 2.0;
const BAR_WIDTH: f64 = CONTENT_WIDTH - 96.0;
const MIN_BAR_FILL: f64 = 80.0;
const PARTY_NAME_BASE_SIZE: u32 = 96;
const MIN_FITTED_SIZE: u32 = 36;
const PARTY_NAME_WEIGHT: u16 = 800;
const TAG_SIZE: u32 = 38;
const TAG_WEIGHT: u16 = 600;
const FOOTER_SIZE: u32 = 34;
const FOOTER_WEIGHT: u16 = 400;

pub(crate) const DEFAULT_PRIMARY: &str = "#8b5cf6";
pub(crate) const DEFAULT_SECONDARY: &str = "#6366f1";
pub(crate) const DEFAULT_BACKGROUND: &str = "#0f172a";
const DEFAULT_PARTY_COLOR: &str = "#f472b6";
const DEFAULT_TITLE: &str = "It's a match!";
const DEFAULT_SUBTITLE_PREFIX: &str = "Dein Match";
const DEFAULT_PERCENTAGE_LABEL: &str = "Übereinstimmung";
const DEFAULT_PARTY_NAME: &str = "Deine Partei";
const DEFAULT_APP_TITLE: &str = "Dein-Freiburg-Match";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Baseline {
    Top,
    Middle,
    Alphabetic,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Element {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: String,
        opacity: f64,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: u32,
        weight: u16,
        fill: String,
        anchor: Anchor,
        baseline: Baseline,
    },
    DashedArc {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
    },
}

/// Everything the card shows, resolved against the display configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CardLayout {
    pub(crate) elements: Vec<Element>,
}

pub(crate) fn layout(
    result: &ScoredResult,
    display: &DisplayConfig,
    metrics: &dyn TextMeasure,
) -> CardLayout {
    let share = &display.share;
    let party = &result.party;

    let party_color = party_color(party, display);
    let title = share.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let subtitle_prefix = share
        .subtitle_prefix
        .as_deref()
        .unwrap_or(DEFAULT_SUBTITLE_PREFIX);
    let percentage_label = share
        .percentage_label
        .as_deref()
        .unwrap_or(DEFAULT_PERCENTAGE_LABEL);
    let footer_text = share
        .footer_text
        .as_deref()
        .or_else(|| display.texts.get("shareText").map(String::as_str))
        .unwrap_or("");
    let app_title = display
        .texts
        .get("appTitle")
        .map(String::as_str)
        .unwrap_or(DEFAULT_APP_TITLE);
    let party_name = non_empty(&party.name).unwrap_or(DEFAULT_PARTY_NAME);
    let percentage = result.percentage.round().max(0.0) as u32;

    let mut elements = Vec::new();
    elements.push(Element::DashedArc {
        cx: 260.0,
        cy: 400.0,
        radius: 140.0,
        start: PI * 0.2,
        end: PI * 1.2,
    });
    elements.push(Element::DashedArc {
        cx: 820.0,
        cy: 440.0,
        radius: 160.0,
        start: PI * 1.1,
        end: PI * 2.1,
    });

    elements.push(centered(title, SAFE_AREA, 120, 800, "#ffffff", Baseline::Top));

    let tag = if party.short_name.is_empty() {
        subtitle_prefix.to_string()
    } else {
        format!("{subtitle_prefix} • {}", party.short_name)
    };
    elements.extend(tag_elements(&tag, metrics));

    elements.push(centered(
        percentage_label,
        410.0,
        48,
        600,
        "rgba(255, 255, 255, 0.8)",
        Baseline::Top,
    ));
    elements.push(centered(
        &format!("{percentage}%"),
        460.0,
        200,
        900,
        "#ffffff",
        Baseline::Top,
    ));

    let name_size = fit_text(
        metrics,
        party_name,
        CONTENT_WIDTH,
        PARTY_NAME_BASE_SIZE,
        PARTY_NAME_WEIGHT,
    );
    elements.push(centered(
        party_name,
        690.0,
        name_size,
        PARTY_NAME_WEIGHT,
        "rgba(255, 255, 255, 0.9)",
        Baseline::Top,
    ));

    elements.extend(scoreboard_elements(result.percentage, percentage, &party_color));
    elements.extend(footer_elements(footer_text, app_title, metrics));

    CardLayout { elements }
}

/// Bar color: the party's own color, else the primary theme color.
pub(crate) fn party_color(party: &Party, display: &DisplayConfig) -> String {
    non_empty(&party.color)
        .or_else(|| display.colors.get("primary").map(String::as_str))
        .unwrap_or(DEFAULT_PARTY_COLOR)
        .to_string()
}

fn tag_elements(text: &str, metrics: &dyn TextMeasure) -> Vec<Element> {
    let width = metrics.width(text, TAG_SIZE, TAG_WEIGHT) + 32.0 * 2.0;
    let height = 68.0;
    let y = 300.0;

    vec![
        Element::Rect {
            x: (CANVAS_WIDTH - width) / 2.0,
            y,
            width,
            height,
            radius: 999.0,
            fill: "#fdf2f8".to_string(),
            opacity: 0.9,
        },
        Element::Text {
            x: CANVAS_WIDTH / 2.0,
            y: y + height / 2.0,
            content: text.to_string(),
            size: TAG_SIZE,
            weight: TAG_WEIGHT,
            fill: DEFAULT_BACKGROUND.to_string(),
            anchor: Anchor::Middle,
            baseline: Baseline::Middle,
        },
    ]
}

fn scoreboard_elements(raw_percentage: f64, percentage: u32, party_color: &str) -> Vec<Element> {
    let bar_x = SAFE_AREA + 48.0;
    let fill_width = (BAR_WIDTH * (raw_percentage / 100.0)).max(MIN_BAR_FILL);

    vec![
        Element::Rect {
            x: SAFE_AREA,
            y: 840.0,
            width: CONTENT_WIDTH,
            height: 180.0,
            radius: 32.0,
            fill: DEFAULT_BACKGROUND.to_string(),
            opacity: 0.9,
        },
        Element::Text {
            x: bar_x,
            y: 920.0,
            content: "Scoreboard".to_string(),
            size: 64,
            weight: 500,
            fill: "rgba(15, 23, 42, 0.75)".to_string(),
            anchor: Anchor::Start,
            baseline: Baseline::Alphabetic,
        },
        Element::Rect {
            x: bar_x,
            y: 960.0,
            width: BAR_WIDTH,
            height: 34.0,
            radius: 17.0,
            fill: "rgba(15, 23, 42, 0.15)".to_string(),
            opacity: 1.0,
        },
        Element::Rect {
            x: bar_x,
            y: 960.0,
            width: fill_width,
            height: 34.0,
            radius: 17.0,
            fill: party_color.to_string(),
            opacity: 1.0,
        },
        Element::Text {
            x: CANVAS_WIDTH - SAFE_AREA - 48.0,
            y: 940.0,
            content: format!("{percentage}%"),
            size: 50,
            weight: 500,
            fill: "rgba(15, 23, 42, 0.65)".to_string(),
            anchor: Anchor::End,
            baseline: Baseline::Alphabetic,
        },
    ]
}

fn footer_elements(footer_text: &str, app_title: &str, metrics: &dyn TextMeasure) -> Vec<Element> {
    let mut elements = vec![centered(
        app_title,
        CANVAS_HEIGHT - SAFE_AREA + 40.0,
        44,
        600,
        "rgba(255, 255, 255, 0.85)",
        Baseline::Bottom,
    )];

    let lines = wrap_text(metrics, footer_text, CONTENT_WIDTH, FOOTER_SIZE, FOOTER_WEIGHT);
    for (index, line) in lines.into_iter().enumerate() {
        elements.push(centered(
            &line,
            CANVAS_HEIGHT - SAFE_AREA + 110.0 + index as f64 * 42.0,
            FOOTER_SIZE,
            FOOTER_WEIGHT,
            "rgba(255, 255, 255, 0.75)",
            Baseline::Bottom,
        ));
    }

    elements
}

fn centered(text: &str, y: f64, size: u32, weight: u16, fill: &str, baseline: Baseline) -> Element {
    Element::Text {
        x: CANVAS_WIDTH / 2.0,
        y,
        content: text.to_string(),
        size,
        weight,
        fill: fill.to_string(),
        anchor: Anchor::Middle,
        baseline,
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Largest size, stepping down by 2 from `base`, at which `text` fits
/// `max_width`. Never goes below the 36px floor.
pub(crate) fn fit_text(
    metrics: &dyn TextMeasure,
    text: &str,
    max_width: f64,
    base: u32,
    weight: u16,
) -> u32 {
    let mut size = base;
    loop {
        if metrics.width(text, size, weight) <= max_width || size < MIN_FITTED_SIZE + 2 {
            return size;
        }
        size -= 2;
    }
}

/// Greedy word wrap against the measured width.
pub(crate) fn wrap_text(
    metrics: &dyn TextMeasure,
    text: &str,
    max_width: f64,
    size: u32,
    weight: u16,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if metrics.width(&candidate, size, weight) > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line = word.to_string();
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::share::fonts::EstimatedMetrics;

    /// Every glyph is as wide as the font size.
    struct SquareGlyphs;

    impl TextMeasure for SquareGlyphs {
        fn width(&self, text: &str, size: u32, _weight: u16) -> f64 {
            text.chars().count() as f64 * f64::from(size)
        }
    }

    #[test]
    fn fit_text_shrinks_long_names_to_floor() {
        let metrics = EstimatedMetrics;
        assert_eq!(fit_text(&metrics, "SPD", CONTENT_WIDTH, 96, 800), 96);
        let long = "Sozialdemokratische Partei Deutschlands Kreisverband Freiburg";
        assert_eq!(fit_text(&metrics, long, CONTENT_WIDTH, 96, 800), 36);
        let medium = "Bündnis 90 / Die Grünen";
        let size = fit_text(&metrics, medium, CONTENT_WIDTH, 96, 800);
        assert!(size < 96 && size > 36);
        assert!(metrics.width(medium, size, 800) <= CONTENT_WIDTH);
    }

    #[test]
    fn fit_text_follows_the_measure() {
        // 16 glyphs fit 840px at 52px, not at 54px.
        let name = "Freie Wähler FRB";
        assert_eq!(fit_text(&SquareGlyphs, name, CONTENT_WIDTH, 96, 800), 52);
        assert_eq!(fit_text(&EstimatedMetrics, name, CONTENT_WIDTH, 96, 800), 92);
    }

    #[test]
    fn wrap_text_breaks_on_width() {
        let metrics = EstimatedMetrics;
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(&metrics, text, 200.0, 34, 400);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| !line.is_empty()));
        assert_eq!(lines.join(" "), text);
        assert!(wrap_text(&metrics, "", 200.0, 34, 400).is_empty());
    }

    #[test]
    fn layout_sizes_the_tag_with_the_measure() {
        let result = ScoredResult {
            party: Party {
                id: "spd".into(),
                name: "SPD".to_string(),
                short_name: "SPD".to_string(),
                color: String::new(),
                logo: String::new(),
                description: String::new(),
            },
            percentage: 50.0,
            points: 1,
            max_points: 2,
            agree_count: 0,
            neutral_count: 1,
            disagree_count: 0,
            positions: Vec::new(),
        };

        let card = layout(&result, &DisplayConfig::default(), &SquareGlyphs);
        let tag_width = card.elements.iter().find_map(|element| match element {
            Element::Rect { y, width, .. } if (*y - 300.0).abs() < f64::EPSILON => Some(*width),
            _ => None,
        });
        let expected = "Dein Match • SPD".chars().count() as f64 * 38.0 + 64.0;
        assert_eq!(tag_width, Some(expected));
    }
}
