//! Entity services
//!
//! One service per entity type, each a thin, explicitly constructed wrapper
//! over a [`RecordStore`](crate::records::RecordStore) that adds the
//! entity's own rules (input validation, cascades, filtered reads).
//!
//! State containers talk to services through the [`EntityService`] trait so
//! they can be tested against any implementation.

pub mod category;
pub mod statistic;
pub mod subtask;
pub mod task;
pub mod traits;

pub use category::CategoryService;
pub use statistic::StatisticService;
pub use subtask::SubtaskService;
pub use task::TaskService;
pub use traits::EntityService;

use crate::error::StoreError;
use crate::notify::Notifier;
use std::sync::Arc;

/// Reject a blank required text field before any backend call.
pub(crate) fn require_text(
    notifier: Option<&Arc<dyn Notifier>>,
    label: &str,
    value: &str,
    message: &str,
) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        if let Some(n) = notifier {
            n.error(message);
        }
        return Err(StoreError::invalid_field(label, message));
    }
    Ok(())
}
