//! Download tracker
//!
//! Owns one record per observed transfer together with the live transfer
//! handle, if the hosting layer still has one. Events for transfers the
//! tracker no longer knows about are dropped.

use std::path::PathBuf;

use crate::download::Download;
use crate::error::DownloadError;
use crate::transfer::{Transfer, TransferId, TransferOutcome};
use crate::Result;

struct TrackedDownload {
    download: Download,
    transfer_id: TransferId,
    /// Released when the transfer reaches a terminal state
    live: Option<Box<dyn Transfer>>,
}

#[derive(Default)]
pub struct DownloadTracker {
    /// Records in the order transfers were first observed
    entries: Vec<TrackedDownload>,
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a transfer the hosting layer just reported.
    pub fn on_started(&mut self, transfer_id: TransferId, transfer: Box<dyn Transfer>) -> Download {
        // A reused transfer id detaches the stale record from its handle
        if let Some(previous) = self.by_transfer_mut(transfer_id) {
            tracing::warn!(
                download_id = %previous.download.id,
                transfer_id,
                "Transfer id reused, detaching previous record"
            );
            previous.live = None;
        }

        let download = Download::new(
            transfer.url(),
            transfer.filename(),
            transfer.save_path(),
            transfer.total_bytes(),
        );

        tracing::info!(
            download_id = %download.id,
            url = %download.url,
            filename = %download.filename,
            "Download started"
        );

        self.entries.push(TrackedDownload {
            download: download.clone(),
            transfer_id,
            live: Some(transfer),
        });

        download
    }

    /// Refresh a record from its live transfer. Returns true if anything was applied.
    pub fn on_updated(&mut self, transfer_id: TransferId) -> bool {
        let Some(entry) = self.live_entry_mut(transfer_id) else {
            tracing::debug!(transfer_id, "Dropping progress for untracked transfer");
            return false;
        };

        let Some(live) = entry.live.as_ref() else {
            return false;
        };

        entry
            .download
            .apply_progress(live.received_bytes(), live.total_bytes(), live.is_paused())
    }

    /// Apply the terminal event for a transfer and release its handle.
    pub fn on_done(&mut self, transfer_id: TransferId, outcome: TransferOutcome) -> bool {
        let Some(entry) = self.live_entry_mut(transfer_id) else {
            tracing::debug!(
                transfer_id,
                outcome = outcome.as_str(),
                "Dropping terminal event for untracked transfer"
            );
            return false;
        };

        let save_path = match entry.live.take() {
            Some(live) => {
                entry.download.apply_progress(
                    live.received_bytes(),
                    live.total_bytes(),
                    live.is_paused(),
                );
                live.save_path()
            }
            None => None,
        };

        let applied = entry.download.finish(outcome, save_path);
        if applied {
            tracing::info!(
                download_id = %entry.download.id,
                state = %entry.download.state,
                "Download finished"
            );
        }
        applied
    }

    /// Ask the live transfer to pause. `Ok(false)` when it is already paused.
    pub fn pause(&mut self, id: &str) -> Result<bool> {
        let (download, live) = self.controllable(id)?;
        if live.is_paused() {
            return Ok(false);
        }

        live.pause();
        tracing::info!(download_id = %download.id, "Paused download");
        Ok(true)
    }

    /// Ask the live transfer to resume. `Ok(false)` when it is not paused.
    pub fn resume(&mut self, id: &str) -> Result<bool> {
        let (download, live) = self.controllable(id)?;
        if !live.is_paused() {
            return Ok(false);
        }

        live.resume();
        tracing::info!(download_id = %download.id, "Resumed download");
        Ok(true)
    }

    /// Ask the live transfer to cancel. The record changes only when the
    /// hosting layer reports the terminal event.
    pub fn cancel(&mut self, id: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.download.id == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

        let live = entry
            .live
            .as_mut()
            .ok_or_else(|| DownloadError::NoLiveTransfer(id.to_string()))?;

        live.cancel();
        tracing::info!(download_id = %id, "Cancel requested");
        Ok(())
    }

    /// Path of the downloaded file, for handing off to the OS.
    pub fn save_path(&self, id: &str) -> Result<PathBuf> {
        let download = self.get(id)?;
        download
            .save_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| DownloadError::NoSavePath(id.to_string()))
    }

    /// Forget every record regardless of state.
    ///
    /// Transfers still running in the hosting layer keep running; their
    /// later events are dropped because nothing tracks them any more.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.entries.len();
        let orphaned = self.entries.iter().filter(|e| e.live.is_some()).count();
        self.entries.clear();

        tracing::info!(cleared, orphaned, "Cleared downloads");
        cleared
    }

    pub fn get(&self, id: &str) -> Result<&Download> {
        self.entries
            .iter()
            .find(|e| e.download.id == id)
            .map(|e| &e.download)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    pub fn find_by_transfer(&self, transfer_id: TransferId) -> Option<&Download> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.transfer_id == transfer_id)
            .map(|e| &e.download)
    }

    /// Serializable copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<Download> {
        self.entries.iter().map(|e| e.download.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn by_transfer_mut(&mut self, transfer_id: TransferId) -> Option<&mut TrackedDownload> {
        self.entries
            .iter_mut()
            .find(|e| e.transfer_id == transfer_id && e.live.is_some())
    }

    /// Newest record for a transfer id. Terminal records are returned too so
    /// the caller can see that the event is late.
    fn live_entry_mut(&mut self, transfer_id: TransferId) -> Option<&mut TrackedDownload> {
        self.entries
            .iter_mut()
            .rev()
            .find(|e| e.transfer_id == transfer_id)
    }

    fn controllable(&mut self, id: &str) -> Result<(&Download, &mut Box<dyn Transfer>)> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.download.id == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

        if entry.download.state.is_terminal() {
            return Err(DownloadError::NotProgressing(id.to_string()));
        }

        let live = entry
            .live
            .as_mut()
            .ok_or_else(|| DownloadError::NoLiveTransfer(id.to_string()))?;

        Ok((&entry.download, live))
    }
}
