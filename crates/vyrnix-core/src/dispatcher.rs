//! Single-task dispatcher
//!
//! Moves the control plane into one tokio task. Commands from any number of
//! `SessionHandle`s and events from any number of `EventSink`s are applied
//! one at a time, so no state is ever shared between tasks.
//!
//! The session ends when the last `SessionHandle` is dropped. Hosting-layer
//! callbacks usually keep `EventSink` clones alive for as long as their views
//! exist, so the sinks never decide shutdown.

use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use vyrnix_download::Download;
use vyrnix_privacy::BlockStats;
use vyrnix_tabs::{TabCreated, TabOverview};

use crate::commands::{Command, CommandResult};
use crate::control_plane::ControlPlane;
use crate::error::CoreError;
use crate::events::EventStream;
use crate::extensions::ExtensionRecord;
use crate::host::HostingLayer;
use crate::library::{Bookmark, HistoryEntry, NewBookmark, NewHistoryEntry};
use crate::settings::BrowserSettings;
use crate::Result;

pub struct Dispatcher;

impl Dispatcher {
    /// Start the dispatcher loop. It runs until every `SessionHandle` has
    /// been dropped, then yields the control plane. Events already queued at
    /// that point are still applied.
    pub fn spawn<H: HostingLayer>(
        plane: ControlPlane<H>,
        events: EventStream,
    ) -> (SessionHandle, JoinHandle<ControlPlane<H>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(plane, rx, events));

        tracing::info!("Session dispatcher started");
        (SessionHandle { commands: tx }, task)
    }
}

async fn run<H: HostingLayer>(
    mut plane: ControlPlane<H>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut events: EventStream,
) -> ControlPlane<H> {
    let mut events_open = true;

    loop {
        tokio::select! {
            // Host events first: a command sees every event reported before it
            biased;

            event = events.recv(), if events_open => match event {
                Some(event) => plane.handle_event(event),
                None => {
                    tracing::debug!("All event sinks dropped");
                    events_open = false;
                }
            },
            command = commands.recv() => match command {
                Some(command) => plane.handle_command(command),
                None => {
                    tracing::debug!("All session handles dropped");
                    break;
                }
            },
        }
    }

    tracing::info!("Session dispatcher stopped");
    plane
}

/// Cloneable command surface for the presentation layer
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| CoreError::DispatcherClosed)?;
        rx.await.map_err(|_| CoreError::DispatcherClosed)
    }

    pub async fn create_tab(&self, url: Option<String>) -> Result<CommandResult<TabCreated>> {
        self.request(|reply| Command::CreateTab { url, reply }).await
    }

    pub async fn close_tab(&self, tab_id: &str) -> Result<bool> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::CloseTab { tab_id, reply }).await
    }

    pub async fn switch_tab(&self, tab_id: &str) -> Result<()> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::SwitchTab { tab_id, reply }).await
    }

    pub async fn navigate_tab(&self, tab_id: &str, url: &str) -> Result<()> {
        let (tab_id, url) = (tab_id.to_string(), url.to_string());
        self.request(|reply| Command::NavigateTab { tab_id, url, reply })
            .await
    }

    pub async fn go_back(&self, tab_id: &str) -> Result<()> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::GoBack { tab_id, reply }).await
    }

    pub async fn go_forward(&self, tab_id: &str) -> Result<()> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::GoForward { tab_id, reply }).await
    }

    pub async fn refresh(&self, tab_id: &str) -> Result<()> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::Refresh { tab_id, reply }).await
    }

    pub async fn can_go_back(&self, tab_id: &str) -> Result<bool> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::CanGoBack { tab_id, reply }).await
    }

    pub async fn can_go_forward(&self, tab_id: &str) -> Result<bool> {
        let tab_id = tab_id.to_string();
        self.request(|reply| Command::CanGoForward { tab_id, reply })
            .await
    }

    pub async fn get_tabs(&self) -> Result<TabOverview> {
        self.request(|reply| Command::GetTabs { reply }).await
    }

    pub async fn request_new_tab(&self) -> Result<()> {
        self.request(|reply| Command::RequestNewTab { reply }).await
    }

    pub async fn get_block_stats(&self) -> Result<BlockStats> {
        self.request(|reply| Command::GetBlockStats { reply }).await
    }

    pub async fn get_downloads(&self) -> Result<Vec<Download>> {
        self.request(|reply| Command::GetDownloads { reply }).await
    }

    pub async fn pause_download(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request(|reply| Command::PauseDownload { id, reply }).await
    }

    pub async fn resume_download(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request(|reply| Command::ResumeDownload { id, reply }).await
    }

    pub async fn cancel_download(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request(|reply| Command::CancelDownload { id, reply }).await
    }

    pub async fn open_download(&self, id: &str) -> Result<CommandResult<()>> {
        let id = id.to_string();
        self.request(|reply| Command::OpenDownload { id, reply }).await
    }

    pub async fn clear_downloads(&self) -> Result<()> {
        self.request(|reply| Command::ClearDownloads { reply }).await
    }

    pub async fn open_external(&self, url: &str) -> Result<CommandResult<()>> {
        let url = url.to_string();
        self.request(|reply| Command::OpenExternal { url, reply }).await
    }

    pub async fn get_settings(&self) -> Result<BrowserSettings> {
        self.request(|reply| Command::GetSettings { reply }).await
    }

    pub async fn update_settings(
        &self,
        settings: BrowserSettings,
    ) -> Result<CommandResult<BrowserSettings>> {
        self.request(|reply| Command::UpdateSettings { settings, reply })
            .await
    }

    pub async fn get_bookmarks(&self) -> Result<CommandResult<Vec<Bookmark>>> {
        self.request(|reply| Command::GetBookmarks { reply }).await
    }

    pub async fn add_bookmark(&self, bookmark: NewBookmark) -> Result<CommandResult<Vec<Bookmark>>> {
        self.request(|reply| Command::AddBookmark { bookmark, reply })
            .await
    }

    pub async fn remove_bookmark(&self, id: i64) -> Result<CommandResult<Vec<Bookmark>>> {
        self.request(|reply| Command::RemoveBookmark { id, reply }).await
    }

    pub async fn get_history(&self) -> Result<CommandResult<Vec<HistoryEntry>>> {
        self.request(|reply| Command::GetHistory { reply }).await
    }

    pub async fn add_history(
        &self,
        entry: NewHistoryEntry,
    ) -> Result<CommandResult<Vec<HistoryEntry>>> {
        self.request(|reply| Command::AddHistory { entry, reply }).await
    }

    pub async fn clear_history(&self) -> Result<CommandResult<Vec<HistoryEntry>>> {
        self.request(|reply| Command::ClearHistory { reply }).await
    }

    pub async fn load_extension(&self, path: PathBuf) -> Result<CommandResult<ExtensionRecord>> {
        self.request(|reply| Command::LoadExtension { path, reply })
            .await
    }

    pub async fn get_extensions(&self) -> Result<Vec<ExtensionRecord>> {
        self.request(|reply| Command::GetExtensions { reply }).await
    }

    pub async fn enable_extension(&self, id: &str) -> Result<CommandResult<()>> {
        let id = id.to_string();
        self.request(|reply| Command::EnableExtension { id, reply })
            .await
    }

    pub async fn disable_extension(&self, id: &str) -> Result<CommandResult<()>> {
        let id = id.to_string();
        self.request(|reply| Command::DisableExtension { id, reply })
            .await
    }

    pub async fn remove_extension(&self, id: &str) -> Result<CommandResult<()>> {
        let id = id.to_string();
        self.request(|reply| Command::RemoveExtension { id, reply })
            .await
    }
}
