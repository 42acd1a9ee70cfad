use crate::error::SheetError;
use crate::sheet::{FormulaSheet, RowId, SharedSheet};
use log::{debug, info};
use std::sync::{Arc, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A lock toggle waiting on its simulated round trip.
pub struct LockTask {
    row: RowId,
    index: usize,
    sheet: SharedSheet,
    handle: JoinHandle<Option<bool>>,
}

/// Starts toggling the lock of row `index`. Must be called from within a
/// tokio runtime.
///
/// The row is marked as loading right away; after `delay` its locked flag
/// flips and loading clears. Editing is rejected while the row is locked.
pub fn toggle_lock(
    sheet: &SharedSheet,
    index: usize,
    delay: Duration,
) -> Result<LockTask, SheetError> {
    let row = {
        let mut guard = lock_sheet(sheet);
        let row = guard.row_mut(index)?;
        if row.loading {
            return Err(SheetError::LockPending(index));
        }
        row.loading = true;
        row.id
    };
    debug!("Lock toggle requested for row {}", index);

    let shared = Arc::clone(sheet);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let mut guard = lock_sheet(&shared);
        // The row may have been deleted while the request was in flight.
        let row = guard.row_by_id_mut(row)?;
        row.locked = !row.locked;
        row.loading = false;
        info!("Row {:?} is now {}", row.id, if row.locked { "locked" } else { "unlocked" });
        Some(row.locked)
    });

    Ok(LockTask {
        row,
        index,
        sheet: Arc::clone(sheet),
        handle,
    })
}

impl LockTask {
    pub fn row(&self) -> RowId {
        self.row
    }

    /// Waits for the toggle. Returns the new locked state, or `None` if the
    /// row no longer exists.
    pub async fn wait(self) -> Result<Option<bool>, SheetError> {
        let index = self.index;
        match self.handle.await {
            Ok(locked) => Ok(locked),
            Err(err) => {
                debug!("Lock task for row {} failed: {}", index, err);
                clear_loading(&self.sheet, self.row);
                Err(SheetError::LockInterrupted(index))
            }
        }
    }

    /// Abandons the toggle. The locked flag keeps its current value.
    pub fn cancel(self) {
        self.handle.abort();
        clear_loading(&self.sheet, self.row);
        debug!("Lock toggle for row {} cancelled", self.index);
    }
}

fn clear_loading(sheet: &SharedSheet, id: RowId) {
    if let Some(row) = lock_sheet(sheet).row_by_id_mut(id) {
        row.loading = false;
    }
}

fn lock_sheet(sheet: &SharedSheet) -> MutexGuard<'_, FormulaSheet> {
    sheet.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
