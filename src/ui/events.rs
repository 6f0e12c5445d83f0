//! Background task event processing.

use crate::app::{App, AppEvent};
use crate::index::LoadError;

/// Task name used when spawning the index fetch.
pub(super) const INDEX_FETCH_TASK: &str = "index_fetch";

/// Apply one background task event to the app.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::IndexLoaded(result) => {
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Index fetch failed");
            }
            app.on_index_loaded(result);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            if task == INDEX_FETCH_TASK {
                // The page would otherwise wait on the loading indicator forever
                app.on_index_loaded(Err(LoadError::Io(std::io::Error::other(error))));
            } else {
                app.set_status(format!("Internal error in {}: {}", task, error));
            }
        }
    }
}
