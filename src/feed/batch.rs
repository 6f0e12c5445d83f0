use serde::Deserialize;

/// Layout constants used to size batches and place the load trigger.
///
/// All lengths are CSS-style pixels. Every field can be overridden from the
/// `[layout]` table of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Card height assumed before any card has been rendered.
    pub fallback_card_height: f64,
    /// Viewport widths above this get three columns before first paint.
    pub wide_breakpoint: f64,
    /// Viewport widths above this get two columns before first paint.
    pub medium_breakpoint: f64,
    /// Extra rows loaded beyond the visible ones.
    pub buffer_rows: usize,
    /// Smallest batch ever returned by the estimate.
    pub min_batch: usize,
    /// Batch size before any estimate has run.
    pub default_batch: usize,
    /// Fixed distance from the bottom that triggers a load.
    pub load_margin: f64,
    /// Proportional trigger point as a fraction of the scrollable height.
    pub load_ratio: f64,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            fallback_card_height: 250.0,
            wide_breakpoint: 1200.0,
            medium_breakpoint: 768.0,
            buffer_rows: 2,
            min_batch: 4,
            default_batch: 10,
            load_margin: 300.0,
            load_ratio: 0.75,
        }
    }
}

/// Measurements taken from a card that is already on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMeasure {
    pub card_width: f64,
    pub card_height: f64,
    pub container_width: f64,
}

/// Viewport size plus, once a card is rendered, its measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub card: Option<CardMeasure>,
}

impl ViewportGeometry {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            card: None,
        }
    }

    pub fn with_card(mut self, card: CardMeasure) -> Self {
        self.card = Some(card);
        self
    }
}

/// Scroll position of the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top.
    pub scroll_top: f64,
    /// Total height of the scrollable content.
    pub scroll_height: f64,
    /// Height of the visible area.
    pub client_height: f64,
}

/// How many cards fill the viewport, plus a buffer.
///
/// With a rendered card, columns come from `container / card` width and rows
/// from `viewport / card` height. Before first paint a breakpoint table picks
/// the columns and the fallback height stands in for the card. The two paths
/// can disagree on unusual layouts; both are kept as-is.
pub fn estimate_viewport_batch(geometry: &ViewportGeometry, policy: &BatchPolicy) -> usize {
    let (card_height, columns) = match geometry.card {
        Some(card) => {
            let columns = if card.container_width > 0.0 && card.card_width > 0.0 {
                ((card.container_width / card.card_width).floor() as usize).max(1)
            } else {
                1
            };
            // A collapsed card would divide by zero; treat it as unmeasured
            let height = if card.card_height > 0.0 {
                card.card_height
            } else {
                policy.fallback_card_height
            };
            (height, columns)
        }
        None => {
            let columns = if geometry.viewport_width > policy.wide_breakpoint {
                3
            } else if geometry.viewport_width > policy.medium_breakpoint {
                2
            } else {
                1
            };
            (policy.fallback_card_height, columns)
        }
    };

    let rows = (geometry.viewport_height.max(0.0) / card_height).ceil() as usize;
    let visible = rows.saturating_mul(columns);
    let buffer = policy.buffer_rows.saturating_mul(columns);
    visible.saturating_add(buffer).max(policy.min_batch)
}

/// Scroll offset past which more cards are requested.
///
/// The smaller (earlier) of the fixed-margin and proportional trigger points.
pub fn load_threshold(metrics: &ScrollMetrics, policy: &BatchPolicy) -> f64 {
    let by_margin = metrics.scroll_height - metrics.client_height - policy.load_margin;
    let by_ratio = metrics.scroll_height * policy.load_ratio;
    by_margin.min(by_ratio)
}

pub fn crossed_load_threshold(metrics: &ScrollMetrics, policy: &BatchPolicy) -> bool {
    metrics.scroll_top > load_threshold(metrics, policy)
}
