use crate::card::CardFragment;
use crate::location::PageLocation;

/// One change the display surface should make.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayOp {
    /// Remove every card and any error notice.
    Clear,
    /// Append cards after the ones already shown.
    Append(Vec<CardFragment>),
    /// Replace the surface with a single user-facing error notice.
    ShowError(String),
    LoadingIndicator(bool),
    NoResults(bool),
    /// "Clear selection" affordance, visible while any topic is selected.
    ClearSelectionVisible(bool),
    /// Reveal the topic filter panel.
    ShowFilters,
    /// Mirror one topic toggle's selected state.
    TopicSelected { topic: String, selected: bool },
    /// Start delivering scroll signals.
    AttachScroll,
    /// Stop delivering scroll signals; the active view is exhausted.
    DetachScroll,
    /// Record a new location in history without navigating.
    PushLocation(PageLocation),
}

/// Ordered list of [`DisplayOp`]s produced by one controller operation.
///
/// Ops must be applied in order: `Clear` before `Append`, and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayDelta {
    ops: Vec<DisplayOp>,
}

impl DisplayDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DisplayOp) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, other: DisplayDelta) {
        self.ops.extend(other.ops);
    }

    pub fn ops(&self) -> &[DisplayOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total number of cards appended by this delta.
    pub fn appended(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DisplayOp::Append(cards) => cards.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn contains(&self, op: &DisplayOp) -> bool {
        self.ops.contains(op)
    }
}

impl IntoIterator for DisplayDelta {
    type Item = DisplayOp;
    type IntoIter = std::vec::IntoIter<DisplayOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl From<DisplayOp> for DisplayDelta {
    fn from(op: DisplayOp) -> Self {
        Self { ops: vec![op] }
    }
}
