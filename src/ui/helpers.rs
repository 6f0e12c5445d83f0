//! Shared helpers for the UI submodules.

use futures::FutureExt;
use ratatui::layout::Rect;
use std::panic::AssertUnwindSafe;

/// Run a future, turning a panic into an error message.
///
/// Background tasks use this so a panic is reported through
/// `AppEvent::TaskPanicked` instead of silently killing the task:
///
/// ```ignore
/// tokio::spawn(async move {
///     match catch_task_panic(fetcher.fetch()).await {
///         Ok(result) => { let _ = tx.send(AppEvent::IndexLoaded(result)).await; }
///         Err(panic_msg) => {
///             let _ = tx.send(AppEvent::TaskPanicked { task: "index_fetch", error: panic_msg }).await;
///         }
///     }
/// });
/// ```
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

/// A rectangle with the given percentage of the parent area, centered in it.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
