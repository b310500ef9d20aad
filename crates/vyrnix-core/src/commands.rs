//! Command surface for the presentation layer
//!
//! Each command carries a oneshot responder. Not-found conditions answer
//! with `false` or unit; only external-action and storage failures carry
//! an error message, wrapped in `CommandResult`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::oneshot;

use vyrnix_download::Download;
use vyrnix_privacy::BlockStats;
use vyrnix_tabs::{TabCreated, TabOverview};

use crate::extensions::ExtensionRecord;
use crate::library::{Bookmark, HistoryEntry, NewBookmark, NewHistoryEntry};
use crate::settings::BrowserSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Nothing to do: unknown id or the requested state already holds
    pub fn failed() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
pub enum Command {
    CreateTab {
        url: Option<String>,
        reply: Reply<CommandResult<TabCreated>>,
    },
    CloseTab {
        tab_id: String,
        reply: Reply<bool>,
    },
    SwitchTab {
        tab_id: String,
        reply: Reply<()>,
    },
    NavigateTab {
        tab_id: String,
        url: String,
        reply: Reply<()>,
    },
    GoBack {
        tab_id: String,
        reply: Reply<()>,
    },
    GoForward {
        tab_id: String,
        reply: Reply<()>,
    },
    Refresh {
        tab_id: String,
        reply: Reply<()>,
    },
    CanGoBack {
        tab_id: String,
        reply: Reply<bool>,
    },
    CanGoForward {
        tab_id: String,
        reply: Reply<bool>,
    },
    GetTabs {
        reply: Reply<TabOverview>,
    },
    RequestNewTab {
        reply: Reply<()>,
    },
    GetBlockStats {
        reply: Reply<BlockStats>,
    },
    GetDownloads {
        reply: Reply<Vec<Download>>,
    },
    PauseDownload {
        id: String,
        reply: Reply<()>,
    },
    ResumeDownload {
        id: String,
        reply: Reply<()>,
    },
    CancelDownload {
        id: String,
        reply: Reply<()>,
    },
    OpenDownload {
        id: String,
        reply: Reply<CommandResult<()>>,
    },
    ClearDownloads {
        reply: Reply<()>,
    },
    /// Hand a link to the system browser
    OpenExternal {
        url: String,
        reply: Reply<CommandResult<()>>,
    },
    GetSettings {
        reply: Reply<BrowserSettings>,
    },
    UpdateSettings {
        settings: BrowserSettings,
        reply: Reply<CommandResult<BrowserSettings>>,
    },
    GetBookmarks {
        reply: Reply<CommandResult<Vec<Bookmark>>>,
    },
    AddBookmark {
        bookmark: NewBookmark,
        reply: Reply<CommandResult<Vec<Bookmark>>>,
    },
    RemoveBookmark {
        id: i64,
        reply: Reply<CommandResult<Vec<Bookmark>>>,
    },
    GetHistory {
        reply: Reply<CommandResult<Vec<HistoryEntry>>>,
    },
    AddHistory {
        entry: NewHistoryEntry,
        reply: Reply<CommandResult<Vec<HistoryEntry>>>,
    },
    ClearHistory {
        reply: Reply<CommandResult<Vec<HistoryEntry>>>,
    },
    LoadExtension {
        path: PathBuf,
        reply: Reply<CommandResult<ExtensionRecord>>,
    },
    GetExtensions {
        reply: Reply<Vec<ExtensionRecord>>,
    },
    EnableExtension {
        id: String,
        reply: Reply<CommandResult<()>>,
    },
    DisableExtension {
        id: String,
        reply: Reply<CommandResult<()>>,
    },
    RemoveExtension {
        id: String,
        reply: Reply<CommandResult<()>>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateTab { .. } => "createTab",
            Command::CloseTab { .. } => "closeTab",
            Command::SwitchTab { .. } => "switchTab",
            Command::NavigateTab { .. } => "navigateTab",
            Command::GoBack { .. } => "goBack",
            Command::GoForward { .. } => "goForward",
            Command::Refresh { .. } => "refresh",
            Command::CanGoBack { .. } => "canGoBack",
            Command::CanGoForward { .. } => "canGoForward",
            Command::GetTabs { .. } => "getTabs",
            Command::RequestNewTab { .. } => "requestNewTab",
            Command::GetBlockStats { .. } => "getBlockStats",
            Command::GetDownloads { .. } => "getDownloads",
            Command::PauseDownload { .. } => "pauseDownload",
            Command::ResumeDownload { .. } => "resumeDownload",
            Command::CancelDownload { .. } => "cancelDownload",
            Command::OpenDownload { .. } => "openDownload",
            Command::ClearDownloads { .. } => "clearDownloads",
            Command::OpenExternal { .. } => "openExternal",
            Command::GetSettings { .. } => "getSettings",
            Command::UpdateSettings { .. } => "updateSettings",
            Command::GetBookmarks { .. } => "getBookmarks",
            Command::AddBookmark { .. } => "addBookmark",
            Command::RemoveBookmark { .. } => "removeBookmark",
            Command::GetHistory { .. } => "getHistory",
            Command::AddHistory { .. } => "addHistory",
            Command::ClearHistory { .. } => "clearHistory",
            Command::LoadExtension { .. } => "loadExtension",
            Command::GetExtensions { .. } => "getExtensions",
            Command::EnableExtension { .. } => "enableExtension",
            Command::DisableExtension { .. } => "disableExtension",
            Command::RemoveExtension { .. } => "removeExtension",
        }
    }
}
