use crate::card::CardFragment;
use crate::feed::{
    CardMeasure, DisplayDelta, DisplayOp, FeedController, PageContext, PageMode, ScrollMetrics,
    ViewportGeometry,
};
use crate::index::{FullIndex, LoadError};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::location::{History, PageLocation};
use crate::preferences::PreferenceStore;
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::validate_url_for_open;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::collections::BTreeSet;
use tokio::time::Instant;
use url::Url;

// ============================================================================
// Terminal Geometry
// ============================================================================

/// Pixel size assumed for one terminal cell when talking to the controller.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Card footprint in cells, border included.
pub const CARD_COLUMNS: u16 = 44;
pub const CARD_ROWS: u16 = 8;

/// Rows taken by the header line and the status bar.
const CHROME_ROWS: u16 = 2;
/// Rows taken by the bordered topic filter panel.
pub const TOPIC_PANEL_ROWS: u16 = 3;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: usize = 3;

/// How the card area of the current terminal is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    /// Terminal rows available to cards.
    pub viewport_rows: u16,
    pub width: u16,
}

impl GridLayout {
    pub fn new(width: u16, height: u16, filters_visible: bool) -> Self {
        let panel = if filters_visible { TOPIC_PANEL_ROWS } else { 0 };
        Self {
            columns: usize::from((width / CARD_COLUMNS).max(1)),
            viewport_rows: height.saturating_sub(CHROME_ROWS + panel),
            width,
        }
    }

    /// Grid row a card index lands on.
    pub fn row_of(&self, card: usize) -> usize {
        card / self.columns
    }

    /// Terminal rows needed to show `cards` cards.
    pub fn content_rows(&self, cards: usize) -> usize {
        cards.div_ceil(self.columns) * usize::from(CARD_ROWS)
    }

    /// Largest useful scroll offset for `cards` cards.
    pub fn max_scroll(&self, cards: usize) -> usize {
        self.content_rows(cards)
            .saturating_sub(usize::from(self.viewport_rows))
    }
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy with loop detection and at most 3 hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client used for the index fetch.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .user_agent(concat!("postgrid/", env!("CARGO_PKG_VERSION")))
        .build()
}

// ============================================================================
// Events and Focus
// ============================================================================

/// Events from background tasks.
pub enum AppEvent {
    /// The one-time index fetch finished.
    IndexLoaded(Result<FullIndex, LoadError>),
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

/// Which part of the page receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Cards,
    Topics,
}

// ============================================================================
// Application State
// ============================================================================

/// Terminal host for a [`FeedController`].
///
/// Holds the display surface the controller's deltas are applied to, plus
/// the purely visual state (selection, scroll offset, overlays).
pub struct App {
    pub controller: FeedController,
    pub keybindings: KeybindingRegistry,
    pub preferences: PreferenceStore,

    // Theme
    pub theme_variant: ThemeVariant,
    pub palette: ColorPalette,

    // Display surface
    pub cards: Vec<CardFragment>,
    pub error_notice: Option<String>,
    pub loading: bool,
    pub no_results: bool,
    pub filters_visible: bool,
    pub clear_selection_visible: bool,
    pub selected_topics: BTreeSet<String>,
    pub scroll_attached: bool,
    pub history: History,

    // UI state
    pub focus: Focus,
    pub selected_card: usize,
    pub topic_cursor: usize,
    /// First terminal row of the card grid that is on screen.
    pub scroll_offset: usize,
    pub show_info: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub terminal_size: (u16, u16),

    /// Absolute root that site-relative links are resolved against.
    pub link_site: Option<Url>,
}

impl App {
    pub fn new(
        controller: FeedController,
        location: PageLocation,
        preferences: PreferenceStore,
        fallback_theme: ThemeVariant,
    ) -> Self {
        let theme_variant = preferences.theme().unwrap_or(fallback_theme);
        Self {
            controller,
            keybindings: KeybindingRegistry::new(),
            preferences,
            theme_variant,
            palette: theme_variant.palette(),
            cards: Vec::new(),
            error_notice: None,
            loading: true,
            no_results: false,
            filters_visible: false,
            clear_selection_visible: false,
            selected_topics: BTreeSet::new(),
            scroll_attached: false,
            history: History::new(location),
            focus: Focus::Cards,
            selected_card: 0,
            topic_cursor: 0,
            scroll_offset: 0,
            show_info: false,
            status_message: None,
            needs_redraw: true,
            terminal_size: (80, 24),
            link_site: None,
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn layout(&self) -> GridLayout {
        let (width, height) = self.terminal_size;
        GridLayout::new(width, height, self.filters_visible)
    }

    /// The card area in controller pixels, with card measurements once a
    /// card is on screen.
    pub fn viewport_geometry(&self) -> ViewportGeometry {
        let layout = self.layout();
        let geometry = ViewportGeometry::new(
            f64::from(layout.width) * CELL_WIDTH_PX,
            f64::from(layout.viewport_rows) * CELL_HEIGHT_PX,
        );
        if self.cards.is_empty() {
            return geometry;
        }
        geometry.with_card(CardMeasure {
            card_width: f64::from(CARD_COLUMNS) * CELL_WIDTH_PX,
            card_height: f64::from(CARD_ROWS) * CELL_HEIGHT_PX,
            container_width: f64::from(layout.width) * CELL_WIDTH_PX,
        })
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        let layout = self.layout();
        let viewport = usize::from(layout.viewport_rows);
        let content = layout.content_rows(self.cards.len()).max(viewport);
        ScrollMetrics {
            scroll_top: self.scroll_offset as f64 * CELL_HEIGHT_PX,
            scroll_height: content as f64 * CELL_HEIGHT_PX,
            client_height: viewport as f64 * CELL_HEIGHT_PX,
        }
    }

    pub fn page_context(&self) -> PageContext {
        PageContext::new(self.history.current().clone(), self.viewport_geometry())
    }

    // ========================================================================
    // Applying Deltas
    // ========================================================================

    /// Apply a controller delta to the display surface.
    ///
    /// Releases the controller's loading flag once appended cards are in
    /// place.
    pub fn apply(&mut self, delta: DisplayDelta) {
        let mut appended = false;
        for op in delta {
            match op {
                DisplayOp::Clear => {
                    self.cards.clear();
                    self.error_notice = None;
                    self.selected_card = 0;
                    self.scroll_offset = 0;
                }
                DisplayOp::Append(cards) => {
                    self.cards.extend(cards);
                    appended = true;
                }
                DisplayOp::ShowError(notice) => {
                    self.cards.clear();
                    self.error_notice = Some(notice);
                }
                DisplayOp::LoadingIndicator(on) => self.loading = on,
                DisplayOp::NoResults(on) => self.no_results = on,
                DisplayOp::ClearSelectionVisible(on) => self.clear_selection_visible = on,
                DisplayOp::ShowFilters => self.filters_visible = true,
                DisplayOp::TopicSelected { topic, selected } => {
                    if selected {
                        self.selected_topics.insert(topic);
                    } else {
                        self.selected_topics.remove(&topic);
                    }
                }
                DisplayOp::AttachScroll => self.scroll_attached = true,
                DisplayOp::DetachScroll => self.scroll_attached = false,
                DisplayOp::PushLocation(location) => self.history.push(location),
            }
        }

        if appended {
            let done = self.controller.finish_load();
            self.apply(done);
        }
        self.needs_redraw = true;
    }

    /// Install the fetched index (or its failure) into the controller.
    pub fn on_index_loaded(&mut self, result: Result<FullIndex, LoadError>) {
        let delta = self.controller.install_index(result, self.page_context());
        self.apply(delta);
        if self.controller.has_failed() {
            self.set_status("Could not load the article index");
        }
    }

    /// Forward the current scroll position to the controller.
    pub fn scroll_signal(&mut self) {
        if !self.scroll_attached {
            return;
        }
        let delta = self.controller.on_scroll_signal(self.scroll_metrics());
        if !delta.is_empty() {
            self.apply(delta);
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn input_context(&self) -> Context {
        if self.show_info {
            Context::Info
        } else {
            match self.focus {
                Focus::Cards => Context::Cards,
                Focus::Topics => Context::Topics,
            }
        }
    }

    /// Move the card selection by `delta` cards and keep it on screen.
    pub fn move_selection(&mut self, delta: isize) {
        if self.cards.is_empty() {
            self.scroll_signal();
            return;
        }
        let last = self.cards.len() - 1;
        self.selected_card = self.selected_card.saturating_add_signed(delta).min(last);
        self.ensure_selected_visible();
        self.scroll_signal();
    }

    pub fn select_first(&mut self) {
        self.selected_card = 0;
        self.scroll_offset = 0;
        self.needs_redraw = true;
    }

    pub fn select_last(&mut self) {
        self.selected_card = self.cards.len().saturating_sub(1);
        self.ensure_selected_visible();
        self.scroll_signal();
    }

    /// Scroll by whole rows, dragging the selection along when it leaves
    /// the screen.
    pub fn scroll_rows(&mut self, rows: isize) {
        let layout = self.layout();
        let max = layout.max_scroll(self.cards.len());
        self.scroll_offset = self.scroll_offset.saturating_add_signed(rows).min(max);

        let card_rows = usize::from(CARD_ROWS);
        let first_visible_row = self.scroll_offset.div_ceil(card_rows);
        let last_visible_row =
            (self.scroll_offset + usize::from(layout.viewport_rows)) / card_rows;
        let row = layout.row_of(self.selected_card);
        if row < first_visible_row || row >= last_visible_row.max(first_visible_row + 1) {
            let target = if rows > 0 {
                first_visible_row
            } else {
                last_visible_row.saturating_sub(1).max(first_visible_row)
            };
            let column = self.selected_card % layout.columns;
            let last = self.cards.len().saturating_sub(1);
            self.selected_card = (target * layout.columns + column).min(last);
        }

        self.needs_redraw = true;
        self.scroll_signal();
    }

    pub fn page(&mut self, down: bool) {
        let rows = isize::try_from(self.layout().viewport_rows.max(1)).unwrap_or(isize::MAX);
        self.scroll_rows(if down { rows } else { -rows });
    }

    pub fn wheel(&mut self, down: bool) {
        let rows = WHEEL_ROWS as isize;
        self.scroll_rows(if down { rows } else { -rows });
    }

    fn ensure_selected_visible(&mut self) {
        let layout = self.layout();
        let card_rows = usize::from(CARD_ROWS);
        let top = layout.row_of(self.selected_card) * card_rows;
        let bottom = top + card_rows;
        let viewport = usize::from(layout.viewport_rows);

        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + viewport {
            self.scroll_offset = bottom.saturating_sub(viewport);
        }
        self.needs_redraw = true;
    }

    pub fn selected_card(&self) -> Option<&CardFragment> {
        self.cards.get(self.selected_card)
    }

    // ========================================================================
    // Topics
    // ========================================================================

    /// Show or hide the topic panel; only listing pages have one.
    pub fn toggle_filters(&mut self) {
        if self.controller.mode() != PageMode::FullListing {
            self.set_status("Topic filters are only available on the listing page");
            return;
        }
        self.filters_visible = !self.filters_visible;
        self.focus = if self.filters_visible {
            Focus::Topics
        } else {
            Focus::Cards
        };
        let max = self.layout().max_scroll(self.cards.len());
        self.scroll_offset = self.scroll_offset.min(max);
        self.needs_redraw = true;
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Cards if self.filters_visible => Focus::Topics,
            _ => Focus::Cards,
        };
        self.needs_redraw = true;
    }

    pub fn move_topic_cursor(&mut self, delta: isize) {
        let count = self.controller.available_topics().len();
        if count == 0 {
            return;
        }
        self.topic_cursor = self
            .topic_cursor
            .saturating_add_signed(delta)
            .min(count - 1);
        self.needs_redraw = true;
    }

    pub fn toggle_topic_at_cursor(&mut self) {
        let Some(topic) = self
            .controller
            .available_topics()
            .get(self.topic_cursor)
            .cloned()
        else {
            return;
        };
        let delta = self.controller.toggle_topic(&topic);
        self.apply(delta);
    }

    /// Toggle the selected card's first topic in the filter panel.
    ///
    /// Only topics with a toggle in the panel count; on pages without
    /// filters this does nothing but report it.
    pub fn toggle_card_topic(&mut self) {
        if !self.controller.mode().has_filters() {
            self.set_status("Topic filters are only available on the listing page");
            return;
        }
        let available = self.controller.available_topics();
        let Some((position, topic)) = self.selected_card().and_then(|card| {
            card.topics.iter().find_map(|link| {
                available
                    .iter()
                    .position(|t| *t == link.topic)
                    .map(|i| (i, link.topic.clone()))
            })
        }) else {
            return;
        };

        self.topic_cursor = position;
        self.filters_visible = true;
        let delta = self.controller.toggle_topic(&topic);
        self.apply(delta);
    }

    pub fn clear_topics(&mut self) {
        if self.selected_topics.is_empty() {
            return;
        }
        let delta = self.controller.clear_topics();
        self.apply(delta);
    }

    // ========================================================================
    // Theme, links and status
    // ========================================================================

    /// Flip dark/light and remember the choice.
    pub fn toggle_theme(&mut self) {
        self.theme_variant = self.theme_variant.next();
        self.palette = self.theme_variant.palette();
        self.needs_redraw = true;
        match self.preferences.set_theme(self.theme_variant) {
            Ok(()) => self.set_status(format!("Theme: {}", self.theme_variant.name())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save theme preference");
                self.set_status(format!(
                    "Theme: {} (not saved: {})",
                    self.theme_variant.name(),
                    e
                ));
            }
        }
    }

    /// Open the selected card in the system browser.
    pub fn open_selected(&mut self) {
        let Some(href) = self.selected_card().map(|card| card.href.clone()) else {
            return;
        };
        let url = match validate_url_for_open(&href, self.link_site.as_ref()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "Refusing to open link");
                self.set_status(format!("Cannot open link: {}", e));
                return;
            }
        };
        match open::that(url.as_str()) {
            Ok(()) => self.set_status(format!("Opened {}", url)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                self.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message once it is older than 3 seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Resize
    // ========================================================================

    pub fn on_terminal_resize(&mut self, width: u16, height: u16, now: Instant) {
        self.terminal_size = (width, height);
        let max = self.layout().max_scroll(self.cards.len());
        self.scroll_offset = self.scroll_offset.min(max);
        self.controller
            .on_resize_signal(self.viewport_geometry(), now);
        self.needs_redraw = true;
    }

    /// Let a settled resize through to the controller.
    pub fn tick(&mut self, now: Instant) {
        if let Some(batch) = self.controller.poll_resize(now) {
            tracing::debug!(batch, "Resize settled");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
