//! Download data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transfer::TransferOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    /// Transfer in flight, possibly paused
    Progressing,
    /// Transfer finished and the file is on disk
    Completed,
    /// Transfer cancelled
    Cancelled,
    /// Transfer failed part way
    Interrupted,
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DownloadState::Progressing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Progressing => "progressing",
            DownloadState::Completed => "completed",
            DownloadState::Cancelled => "cancelled",
            DownloadState::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DownloadState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "progressing" => Ok(DownloadState::Progressing),
            "completed" => Ok(DownloadState::Completed),
            "cancelled" => Ok(DownloadState::Cancelled),
            "interrupted" => Ok(DownloadState::Interrupted),
            _ => Err(format!("Unknown download state: {}", s)),
        }
    }
}

/// Millisecond timestamp plus a short random suffix, e.g. `1718000000000-3f9a1c`
pub fn new_download_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..6])
}

/// Serializable download record. This is also the snapshot sent to the
/// presentation layer; it never holds the live transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub save_path: Option<String>,
    pub state: DownloadState,
    pub received_bytes: u64,
    /// 0 when the size is unknown
    pub total_bytes: u64,
    pub paused: bool,
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Download {
    pub fn new(url: String, filename: String, save_path: Option<String>, total_bytes: u64) -> Self {
        Self {
            id: new_download_id(),
            url,
            filename,
            save_path,
            state: DownloadState::Progressing,
            received_bytes: 0,
            total_bytes,
            paused: false,
            error: None,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Get download progress as percentage (0-100)
    pub fn progress(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.received_bytes as f64 / self.total_bytes as f64 * 100.0).min(100.0)
    }

    /// Refresh counters from the live transfer. Ignored once terminal.
    pub fn apply_progress(&mut self, received: u64, total: u64, paused: bool) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.total_bytes = total;
        self.received_bytes = if total > 0 { received.min(total) } else { received };
        self.paused = paused;
        true
    }

    /// Move to a terminal state. Only the first call has any effect.
    pub fn finish(&mut self, outcome: TransferOutcome, save_path: Option<String>) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.state = outcome.into();
        self.end_time = Some(Utc::now());
        self.paused = false;

        match outcome {
            TransferOutcome::Completed => {
                if save_path.is_some() {
                    self.save_path = save_path;
                }
            }
            TransferOutcome::Cancelled | TransferOutcome::Interrupted => {
                self.error = Some(outcome.as_str().to_string());
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Download {
        Download::new(
            "https://example.com/file.zip".to_string(),
            "file.zip".to_string(),
            None,
            1000,
        )
    }

    #[test]
    fn test_new_download() {
        let download = sample();

        assert_eq!(download.state, DownloadState::Progressing);
        assert_eq!(download.received_bytes, 0);
        assert!(download.end_time.is_none());
        assert!(download.error.is_none());
    }

    #[test]
    fn test_download_ids_are_distinct() {
        let a = new_download_id();
        let b = new_download_id();
        assert_ne!(a, b);

        let (millis, suffix) = a.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn test_progress_is_clamped_to_total() {
        let mut download = sample();

        assert!(download.apply_progress(500, 1000, false));
        assert!((download.progress() - 50.0).abs() < 0.01);

        download.apply_progress(1500, 1000, true);
        assert_eq!(download.received_bytes, 1000);
        assert!(download.paused);

        // Unknown size leaves received untouched
        download.apply_progress(4096, 0, false);
        assert_eq!(download.received_bytes, 4096);
        assert_eq!(download.progress(), 0.0);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let mut download = sample();

        assert!(download.finish(TransferOutcome::Interrupted, None));
        assert_eq!(download.state, DownloadState::Interrupted);
        assert_eq!(download.error.as_deref(), Some("interrupted"));
        let ended = download.end_time;
        assert!(ended.is_some());

        assert!(!download.finish(TransferOutcome::Completed, Some("/tmp/x".to_string())));
        assert!(!download.apply_progress(999, 1000, false));
        assert_eq!(download.state, DownloadState::Interrupted);
        assert_eq!(download.received_bytes, 0);
        assert_eq!(download.end_time, ended);
        assert!(download.save_path.is_none());
    }

    #[test]
    fn test_completed_captures_save_path() {
        let mut download = sample();

        download.finish(
            TransferOutcome::Completed,
            Some("/downloads/file.zip".to_string()),
        );
        assert_eq!(download.state, DownloadState::Completed);
        assert_eq!(download.save_path.as_deref(), Some("/downloads/file.zip"));
        assert!(download.error.is_none());
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["state"], "progressing");
        assert_eq!(json["totalBytes"], 1000);
        assert_eq!(json["receivedBytes"], 0);
        assert!(json["savePath"].is_null());
        assert!(json.get("startTime").is_some());
    }

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [
            DownloadState::Progressing,
            DownloadState::Completed,
            DownloadState::Cancelled,
            DownloadState::Interrupted,
        ] {
            assert_eq!(state.as_str().parse::<DownloadState>(), Ok(state));
        }
        assert!("paused".parse::<DownloadState>().is_err());
    }
}
