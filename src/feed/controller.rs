use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

use super::batch::{
    crossed_load_threshold, estimate_viewport_batch, BatchPolicy, ScrollMetrics, ViewportGeometry,
};
use super::delta::{DisplayDelta, DisplayOp};
use super::filter::{collect_topics, FilterSet};
use crate::card::{render_card, CardContext};
use crate::index::{ArticleRecord, FullIndex, IndexFetcher, LoadError};
use crate::location::{PageLocation, TOPIC_PARAM};

/// Records shown on a summary page.
pub const SUMMARY_PREFIX: usize = 3;

/// Quiet period before a resize recomputes the batch size.
pub const RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// Notice shown in place of the cards when the index cannot be loaded.
pub const LOAD_ERROR_NOTICE: &str = "Failed to load articles. Please try again later.";

/// Which kind of page the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PageMode {
    /// A fixed prefix of [`SUMMARY_PREFIX`] records, no scroll growth.
    #[serde(rename = "summary")]
    Summary,
    /// Scroll-paginated listing with topic filters.
    #[default]
    #[serde(rename = "listing")]
    FullListing,
}

impl PageMode {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "summary" | "home" => Some(Self::Summary),
            "listing" | "full" | "blog" => Some(Self::FullListing),
            _ => None,
        }
    }

    /// Whether pages of this kind show topic filters.
    pub fn has_filters(self) -> bool {
        self == Self::FullListing
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::FullListing => "listing",
        }
    }
}

/// Page state the controller needs when the index arrives.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub location: PageLocation,
    pub geometry: ViewportGeometry,
}

impl PageContext {
    pub fn new(location: PageLocation, geometry: ViewportGeometry) -> Self {
        Self { location, geometry }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    geometry: ViewportGeometry,
    last_signal: Instant,
}

/// Decides which prefix of the active article view is displayed.
///
/// The active view is the filtered view when a filter is set, otherwise the
/// full index. Every operation returns a [`DisplayDelta`] for the host to
/// apply; the controller never touches a display surface itself.
///
/// # Loading flag
///
/// [`load_more`](Self::load_more) sets the loading flag and returns an append
/// delta. The flag stays set until the host has applied that delta and calls
/// [`finish_load`](Self::finish_load); further loads in between are no-ops.
/// A filter change starts a new view and releases the flag.
pub struct FeedController {
    mode: PageMode,
    policy: BatchPolicy,
    card_context: CardContext,
    phase: Phase,
    index: FullIndex,
    available_topics: Vec<String>,
    filter: FilterSet,
    /// Positions into `index`; `None` means the full index is active.
    filtered: Option<Vec<usize>>,
    cursor: usize,
    loading: bool,
    batch_size: usize,
    scroll_attached: bool,
    location: PageLocation,
    pending_resize: Option<PendingResize>,
}

impl FeedController {
    pub fn new(mode: PageMode, policy: BatchPolicy, card_context: CardContext) -> Self {
        let batch_size = policy.default_batch;
        Self {
            mode,
            policy,
            card_context,
            phase: Phase::Pending,
            index: FullIndex::from(Vec::new()),
            available_topics: Vec::new(),
            filter: FilterSet::new(),
            filtered: None,
            cursor: 0,
            loading: false,
            batch_size,
            scroll_attached: false,
            location: PageLocation::parse(""),
            pending_resize: None,
        }
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Fetch the index once and set up the page.
    pub async fn initialize(&mut self, fetcher: &IndexFetcher, page: PageContext) -> DisplayDelta {
        let mut delta = DisplayDelta::from(DisplayOp::LoadingIndicator(true));
        let result = fetcher.fetch().await;
        delta.extend(self.install_index(result, page));
        delta
    }

    /// Synchronous half of [`initialize`](Self::initialize).
    ///
    /// - Failure: the surface is replaced by [`LOAD_ERROR_NOTICE`] and the
    ///   controller ignores every later operation.
    /// - [`PageMode::Summary`]: shows the first [`SUMMARY_PREFIX`] records.
    /// - [`PageMode::FullListing`]: sizes the batch from `page.geometry`,
    ///   attaches scroll growth, and either applies the location's `topic`
    ///   (when a toggle exists for it) or loads the first batch.
    ///
    /// Only the first call has any effect.
    pub fn install_index(
        &mut self,
        result: Result<FullIndex, LoadError>,
        page: PageContext,
    ) -> DisplayDelta {
        let mut delta = DisplayDelta::new();
        if self.phase != Phase::Pending {
            tracing::warn!("Article index already installed, ignoring");
            return delta;
        }
        self.location = page.location;

        let index = match result {
            Ok(index) => index,
            Err(e) => {
                tracing::error!(error = %e, "Error initializing article loading");
                self.phase = Phase::Failed;
                delta.push(DisplayOp::LoadingIndicator(false));
                delta.push(DisplayOp::ShowError(LOAD_ERROR_NOTICE.to_string()));
                return delta;
            }
        };

        tracing::info!(articles = index.len(), mode = ?self.mode, "Article index loaded");
        self.available_topics = collect_topics(&index);
        self.index = index;
        self.phase = Phase::Ready;
        delta.push(DisplayOp::LoadingIndicator(false));

        match self.mode {
            PageMode::Summary => delta.extend(self.load_more(Some(SUMMARY_PREFIX))),
            PageMode::FullListing => {
                self.batch_size = estimate_viewport_batch(&page.geometry, &self.policy);
                self.scroll_attached = true;
                delta.push(DisplayOp::AttachScroll);

                let preselected = self
                    .location
                    .topic()
                    .filter(|topic| self.available_topics.iter().any(|t| t == topic))
                    .map(str::to_string);

                match preselected {
                    Some(topic) => {
                        tracing::debug!(topic = %topic, "Applying topic from location");
                        delta.push(DisplayOp::ShowFilters);
                        delta.extend(self.set_filter(FilterSet::from_iter([topic])));
                    }
                    None => {
                        if let Some(topic) = self.location.topic() {
                            tracing::debug!(topic = %topic, "Location topic has no toggle, loading unfiltered");
                        }
                        delta.extend(self.load_more(None));
                    }
                }
            }
        }

        delta
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    /// Replace the filter and start a new view epoch.
    ///
    /// Recomputes the filtered view from scratch, resets the cursor, clears
    /// the surface and loads one batch, or shows "no results" when nothing
    /// matches. An empty set restores the full index and drops the `topic`
    /// parameter from the location.
    ///
    /// A load still in flight is abandoned: its cards are cleared with the
    /// old view, so it does not hold back the new view's first batch.
    pub fn set_filter(&mut self, topics: FilterSet) -> DisplayDelta {
        let mut delta = DisplayDelta::new();
        if self.phase != Phase::Ready {
            return delta;
        }

        self.filter = topics;
        self.filtered = if self.filter.is_empty() {
            None
        } else {
            Some(self.filter.apply(&self.index))
        };
        self.cursor = 0;

        delta.push(DisplayOp::Clear);
        // An append still in flight belongs to the previous view
        if self.loading {
            self.loading = false;
            delta.push(DisplayOp::LoadingIndicator(false));
        }
        delta.push(DisplayOp::NoResults(false));
        for topic in &self.available_topics {
            delta.push(DisplayOp::TopicSelected {
                topic: topic.clone(),
                selected: self.filter.contains(topic),
            });
        }
        delta.push(DisplayOp::ClearSelectionVisible(!self.filter.is_empty()));

        if self.filter.is_empty() && self.location.has_param(TOPIC_PARAM) {
            self.location = self.location.without_param(TOPIC_PARAM);
            delta.push(DisplayOp::PushLocation(self.location.clone()));
        }

        if self.filtered.as_ref().is_some_and(Vec::is_empty) {
            tracing::debug!(filter = ?self.filter, "No articles match the selected topics");
            delta.push(DisplayOp::NoResults(true));
            return delta;
        }

        if self.mode == PageMode::FullListing && !self.scroll_attached {
            self.scroll_attached = true;
            delta.push(DisplayOp::AttachScroll);
        }

        delta.extend(self.load_more(None));
        delta
    }

    /// Flip one topic toggle.
    pub fn toggle_topic(&mut self, topic: &str) -> DisplayDelta {
        let mut next = self.filter.clone();
        next.toggle(topic);
        self.set_filter(next)
    }

    /// Deselect every topic.
    pub fn clear_topics(&mut self) -> DisplayDelta {
        self.set_filter(FilterSet::new())
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Append up to `count` records (default: the current batch size).
    ///
    /// No-op while a load is in flight or once the view is fully shown.
    /// Reaching the end detaches scroll growth until the next filter change.
    pub fn load_more(&mut self, count: Option<usize>) -> DisplayDelta {
        let mut delta = DisplayDelta::new();
        let total = self.active_len();
        let count = count.unwrap_or(self.batch_size);

        if self.loading || self.cursor >= total || count == 0 {
            return delta;
        }
        self.loading = true;
        delta.push(DisplayOp::LoadingIndicator(true));

        let start = self.cursor;
        let end = start.saturating_add(count).min(total);
        let cards = (start..end)
            .map(|i| render_card(self.active_record(i), &self.card_context))
            .collect();
        delta.push(DisplayOp::Append(cards));
        self.cursor = end;

        tracing::debug!(from = start, to = end, total, "Appended article batch");

        if self.cursor >= total && self.scroll_attached {
            self.scroll_attached = false;
            delta.push(DisplayOp::DetachScroll);
        }

        delta
    }

    /// Release the loading flag once an append delta has been applied.
    pub fn finish_load(&mut self) -> DisplayDelta {
        if !self.loading {
            return DisplayDelta::new();
        }
        self.loading = false;
        DisplayOp::LoadingIndicator(false).into()
    }

    // ========================================================================
    // Signals
    // ========================================================================

    /// React to a scroll position change.
    pub fn on_scroll_signal(&mut self, metrics: ScrollMetrics) -> DisplayDelta {
        if self.phase != Phase::Ready
            || !self.scroll_attached
            || self.loading
            || self.cursor >= self.active_len()
        {
            return DisplayDelta::new();
        }
        if crossed_load_threshold(&metrics, &self.policy) {
            self.load_more(None)
        } else {
            DisplayDelta::new()
        }
    }

    /// Note a viewport resize; the batch size is recomputed by
    /// [`poll_resize`](Self::poll_resize) after [`RESIZE_QUIET_PERIOD`].
    pub fn on_resize_signal(&mut self, geometry: ViewportGeometry, now: Instant) {
        if self.mode == PageMode::Summary {
            return;
        }
        self.pending_resize = Some(PendingResize {
            geometry,
            last_signal: now,
        });
    }

    /// Apply a settled resize. Returns the recomputed batch size, if any.
    ///
    /// Cards already shown and the cursor are untouched; only later
    /// [`load_more`](Self::load_more) calls see the new size.
    pub fn poll_resize(&mut self, now: Instant) -> Option<usize> {
        let pending = self.pending_resize?;
        if now.duration_since(pending.last_signal) < RESIZE_QUIET_PERIOD {
            return None;
        }
        self.pending_resize = None;

        let batch = estimate_viewport_batch(&pending.geometry, &self.policy);
        if batch != self.batch_size {
            tracing::debug!(
                old = self.batch_size,
                new = batch,
                "Viewport resized, batch size changes on next load"
            );
            self.batch_size = batch;
        }
        Some(batch)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn has_failed(&self) -> bool {
        self.phase == Phase::Failed
    }

    /// Records of the active view already handed to the surface.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn scroll_attached(&self) -> bool {
        self.scroll_attached
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    pub fn index(&self) -> &FullIndex {
        &self.index
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    /// Positions of the filtered view into the full index, when filtering.
    pub fn filtered_view(&self) -> Option<&[usize]> {
        self.filtered.as_deref()
    }

    pub fn available_topics(&self) -> &[String] {
        &self.available_topics
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn card_context(&self) -> &CardContext {
        &self.card_context
    }

    /// Length of the active view.
    pub fn active_len(&self) -> usize {
        self.filtered.as_ref().map_or(self.index.len(), Vec::len)
    }

    /// Records of the active view in display order.
    pub fn active_records(&self) -> impl Iterator<Item = &ArticleRecord> + '_ {
        (0..self.active_len()).map(move |i| self.active_record(i))
    }

    fn active_record(&self, i: usize) -> &ArticleRecord {
        match &self.filtered {
            Some(positions) => &self.index[positions[i]],
            None => &self.index[i],
        }
    }
}
