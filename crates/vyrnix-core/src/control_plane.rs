//! Session control plane
//!
//! Owns the view registry, block list engine, block counters, download
//! tracker and extension records. Commands and host events are plain
//! method calls on `&mut self`; the dispatcher serializes them.

use std::path::Path;
use tokio::sync::oneshot;

use vyrnix_download::{Download, DownloadTracker};
use vyrnix_privacy::{BlockListEngine, BlockStats};
use vyrnix_storage::Database;
use vyrnix_tabs::{TabCreated, TabOverview, ViewRegistry};

use crate::commands::{Command, CommandResult};
use crate::config::Config;
use crate::events::{HostEvent, RequestVerdict};
use crate::extensions::{ExtensionRecord, ExtensionRegistry};
use crate::host::HostingLayer;
use crate::library::{Bookmark, HistoryEntry, Library, NewBookmark, NewHistoryEntry};
use crate::notification::{Notification, NotificationSender};
use crate::settings::BrowserSettings;
use crate::Result;

pub struct ControlPlane<H: HostingLayer> {
    host: H,
    db: Database,
    registry: ViewRegistry,
    blocklist: BlockListEngine,
    stats: BlockStats,
    downloads: DownloadTracker,
    extensions: ExtensionRegistry,
    library: Library,
    settings: BrowserSettings,
    notifier: NotificationSender,
}

impl<H: HostingLayer> ControlPlane<H> {
    pub fn new(host: H, db: Database, config: &Config, notifier: NotificationSender) -> Self {
        let settings = BrowserSettings::load(&db).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load settings, using defaults");
            BrowserSettings::default()
        });

        let mut blocklist = BlockListEngine::new();
        blocklist.set_dev_host(&config.dev_host);
        settings.apply_to(&mut blocklist);

        tracing::info!(
            ad_domains = blocklist.ad_domain_count(),
            tracker_domains = blocklist.tracker_domain_count(),
            dev_host = %blocklist.dev_host(),
            "Control plane initialized"
        );

        Self {
            host,
            library: Library::new(db.clone(), config.history_limit),
            db,
            registry: ViewRegistry::new(config.chrome_offset, config.blank_url.clone()),
            blocklist,
            stats: BlockStats::new(),
            downloads: DownloadTracker::new(),
            extensions: ExtensionRegistry::new(),
            settings,
            notifier,
        }
    }

    /// Open the store at `config.database_path`, creating its directory,
    /// and build a plane on top of it.
    pub fn open(host: H, config: &Config, notifier: NotificationSender) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(host, db, config, notifier))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    // === Dispatch ===

    pub fn handle_command(&mut self, command: Command) {
        tracing::debug!(command = command.name(), "Handling command");

        match command {
            Command::CreateTab { url, reply } => respond(reply, self.create_tab(url.as_deref())),
            Command::CloseTab { tab_id, reply } => respond(reply, self.close_tab(&tab_id)),
            Command::SwitchTab { tab_id, reply } => respond(reply, self.switch_tab(&tab_id)),
            Command::NavigateTab { tab_id, url, reply } => {
                respond(reply, self.navigate_tab(&tab_id, &url))
            }
            Command::GoBack { tab_id, reply } => respond(reply, self.go_back(&tab_id)),
            Command::GoForward { tab_id, reply } => respond(reply, self.go_forward(&tab_id)),
            Command::Refresh { tab_id, reply } => respond(reply, self.refresh(&tab_id)),
            Command::CanGoBack { tab_id, reply } => {
                respond(reply, self.registry.can_go_back(&tab_id))
            }
            Command::CanGoForward { tab_id, reply } => {
                respond(reply, self.registry.can_go_forward(&tab_id))
            }
            Command::GetTabs { reply } => respond(reply, self.tabs()),
            Command::RequestNewTab { reply } => respond(reply, self.request_new_tab()),
            Command::GetBlockStats { reply } => respond(reply, self.stats),
            Command::GetDownloads { reply } => respond(reply, self.downloads()),
            Command::PauseDownload { id, reply } => respond(reply, self.pause_download(&id)),
            Command::ResumeDownload { id, reply } => respond(reply, self.resume_download(&id)),
            Command::CancelDownload { id, reply } => respond(reply, self.cancel_download(&id)),
            Command::OpenDownload { id, reply } => respond(reply, self.open_download(&id)),
            Command::ClearDownloads { reply } => respond(reply, self.clear_downloads()),
            Command::OpenExternal { url, reply } => respond(reply, self.open_external(&url)),
            Command::GetSettings { reply } => respond(reply, self.settings.clone()),
            Command::UpdateSettings { settings, reply } => {
                respond(reply, self.update_settings(settings))
            }
            Command::GetBookmarks { reply } => respond(reply, self.library.bookmarks().into()),
            Command::AddBookmark { bookmark, reply } => respond(reply, self.add_bookmark(bookmark)),
            Command::RemoveBookmark { id, reply } => {
                respond(reply, self.library.remove_bookmark(id).into())
            }
            Command::GetHistory { reply } => respond(reply, self.library.history().into()),
            Command::AddHistory { entry, reply } => respond(reply, self.add_history(entry)),
            Command::ClearHistory { reply } => respond(reply, self.library.clear_history().into()),
            Command::LoadExtension { path, reply } => respond(reply, self.load_extension(&path)),
            Command::GetExtensions { reply } => respond(reply, self.extensions.list()),
            Command::EnableExtension { id, reply } => {
                respond(reply, self.extensions.enable(&mut self.host, &id))
            }
            Command::DisableExtension { id, reply } => {
                respond(reply, self.extensions.disable(&mut self.host, &id))
            }
            Command::RemoveExtension { id, reply } => {
                respond(reply, self.extensions.remove(&mut self.host, &id))
            }
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::LoadFinished { tab_id, seq } => {
                if let Some(snapshot) = self.registry.on_load_finished(&tab_id, seq) {
                    self.notify(Notification::TabUpdated(snapshot));
                }
            }
            HostEvent::LoadFailed {
                tab_id,
                seq,
                code,
                description,
            } => self.registry.on_load_failed(&tab_id, seq, code, &description),
            HostEvent::FaviconUpdated {
                tab_id,
                seq,
                favicon,
            } => {
                if let Some(snapshot) = self.registry.on_favicon(&tab_id, seq, favicon) {
                    self.notify(Notification::TabUpdated(snapshot));
                }
            }
            HostEvent::NewWindowRequested { tab_id, url } => {
                tracing::info!(opener = %tab_id, url = %url, "Redirecting new window into a tab");
                let created = self.create_tab(Some(url.as_str()));
                if let Some(error) = created.error {
                    tracing::warn!(opener = %tab_id, error = %error, "Failed to open new window as tab");
                }
            }
            HostEvent::RequestIntercepted { url, tab_id, reply } => {
                let verdict = self.evaluate_request(&url);
                if reply.send(verdict).is_err() {
                    tracing::debug!(url = %url, tab_id = ?tab_id, "Request verdict no longer awaited");
                }
            }
            HostEvent::DownloadStarted {
                transfer_id,
                transfer,
            } => {
                self.downloads.on_started(transfer_id, transfer);
                self.publish_downloads();
            }
            HostEvent::DownloadUpdated { transfer_id } => {
                if self.downloads.on_updated(transfer_id) {
                    self.publish_downloads();
                }
            }
            HostEvent::DownloadDone {
                transfer_id,
                outcome,
            } => {
                if self.downloads.on_done(transfer_id, outcome) {
                    self.publish_downloads();
                }
            }
        }
    }

    // === Tabs ===

    pub fn create_tab(&mut self, url: Option<&str>) -> CommandResult<TabCreated> {
        match self.registry.create_tab(&mut self.host, url) {
            Ok(created) => CommandResult::ok(created),
            Err(e) => {
                tracing::error!(url = ?url, error = %e, "Failed to create tab");
                CommandResult::err(e.to_string())
            }
        }
    }

    pub fn close_tab(&mut self, tab_id: &str) -> bool {
        self.registry.close_tab(&mut self.host, tab_id)
    }

    pub fn switch_tab(&mut self, tab_id: &str) {
        if let Err(e) = self.registry.switch_tab(&mut self.host, tab_id) {
            tracing::warn!(tab_id = %tab_id, error = %e, "switchTab ignored");
        }
    }

    pub fn navigate_tab(&mut self, tab_id: &str, url: &str) {
        if let Err(e) = self.registry.navigate_tab(tab_id, url) {
            tracing::warn!(tab_id = %tab_id, error = %e, "navigateTab ignored");
        }
    }

    pub fn go_back(&mut self, tab_id: &str) {
        if let Err(e) = self.registry.go_back(tab_id) {
            tracing::warn!(tab_id = %tab_id, error = %e, "goBack ignored");
        }
    }

    pub fn go_forward(&mut self, tab_id: &str) {
        if let Err(e) = self.registry.go_forward(tab_id) {
            tracing::warn!(tab_id = %tab_id, error = %e, "goForward ignored");
        }
    }

    pub fn refresh(&mut self, tab_id: &str) {
        if let Err(e) = self.registry.refresh(tab_id) {
            tracing::warn!(tab_id = %tab_id, error = %e, "refresh ignored");
        }
    }

    pub fn tabs(&self) -> TabOverview {
        self.registry.overview()
    }

    pub fn request_new_tab(&self) {
        self.notify(Notification::NewTab);
    }

    // === Requests ===

    /// Blocking is evaluated first; a blocked request is never upgraded.
    pub fn evaluate_request(&mut self, url: &str) -> RequestVerdict {
        let decision = self.blocklist.classify(url);
        if decision.blocked {
            self.stats.record(&decision);
            tracing::debug!(
                url = %url,
                is_ad = decision.is_ad,
                is_tracker = decision.is_tracker,
                "Blocked request"
            );
            self.notify(Notification::BlockStats(self.stats));
            return RequestVerdict::Cancel;
        }

        match self.blocklist.upgrade(url) {
            Some(upgraded) => {
                tracing::debug!(from = %url, to = %upgraded, "Upgraded request to https");
                RequestVerdict::Redirect { url: upgraded }
            }
            None => RequestVerdict::Proceed,
        }
    }

    pub fn block_stats(&self) -> BlockStats {
        self.stats
    }

    // === Downloads ===

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.snapshot()
    }

    pub fn pause_download(&mut self, id: &str) {
        if let Err(e) = self.downloads.pause(id) {
            tracing::debug!(download_id = %id, error = %e, "pauseDownload ignored");
        }
    }

    pub fn resume_download(&mut self, id: &str) {
        if let Err(e) = self.downloads.resume(id) {
            tracing::debug!(download_id = %id, error = %e, "resumeDownload ignored");
        }
    }

    pub fn cancel_download(&mut self, id: &str) {
        if let Err(e) = self.downloads.cancel(id) {
            tracing::debug!(download_id = %id, error = %e, "cancelDownload ignored");
        }
    }

    pub fn open_download(&mut self, id: &str) -> CommandResult<()> {
        let path = match self.downloads.save_path(id) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(download_id = %id, error = %e, "openDownload ignored");
                return CommandResult::failed();
            }
        };

        match self.host.open_path(&path) {
            Ok(()) => CommandResult::ok(()),
            Err(e) => {
                tracing::warn!(download_id = %id, error = %e, "Failed to open download");
                CommandResult::err(e.to_string())
            }
        }
    }

    /// Forget every record. Running transfers are not stopped.
    pub fn clear_downloads(&mut self) {
        self.downloads.clear_all();
        self.publish_downloads();
    }

    pub fn open_external(&mut self, url: &str) -> CommandResult<()> {
        match self.host.open_external(url) {
            Ok(()) => {
                tracing::info!(url = %url, "Opened link externally");
                CommandResult::ok(())
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to open link externally");
                CommandResult::err(e.to_string())
            }
        }
    }

    // === Settings and library ===

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: BrowserSettings) -> CommandResult<BrowserSettings> {
        if let Err(e) = settings.save(&self.db) {
            tracing::error!(error = %e, "Failed to save settings");
            return CommandResult::err(e.to_string());
        }

        settings.apply_to(&mut self.blocklist);
        self.settings = settings.clone();

        tracing::info!("Settings updated");
        CommandResult::ok(settings)
    }

    pub fn add_bookmark(&self, bookmark: NewBookmark) -> CommandResult<Vec<Bookmark>> {
        self.library.add_bookmark(bookmark).into()
    }

    pub fn add_history(&self, entry: NewHistoryEntry) -> CommandResult<Vec<HistoryEntry>> {
        self.library.add_history(entry).into()
    }

    pub fn load_extension(&mut self, path: &Path) -> CommandResult<ExtensionRecord> {
        self.extensions.load(&mut self.host, path)
    }

    fn publish_downloads(&self) {
        self.notify(Notification::DownloadsUpdate(self.downloads.snapshot()));
    }

    fn notify(&self, notification: Notification) {
        let name = notification.name();
        if self.notifier.send(notification).is_err() {
            tracing::debug!(event = name, "Presentation layer gone, dropping notification");
        }
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::debug!("Command caller went away before the reply");
    }
}
