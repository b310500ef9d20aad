//! View Registry
//!
//! Maps tab ids to tabs, keeps creation order, and owns the single active
//! tab pointer. Every operation that touches a surface takes the view host
//! explicitly; the registry never stores it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TabError;
use crate::host::{ViewBounds, ViewHost};
use crate::tab::{Tab, TabCreated, TabSnapshot};
use crate::Result;

/// Neutral address used in place of blank or unparseable URLs
pub const BLANK_URL: &str = "about:blank";

/// Height reserved at the top of the window for browser chrome
pub const DEFAULT_CHROME_OFFSET: u32 = 64;

/// Every tab in creation order, plus the active one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabOverview {
    pub active_tab_id: Option<String>,
    pub tabs: Vec<TabSnapshot>,
}

pub struct ViewRegistry {
    tabs: HashMap<String, Tab>,
    /// Tab ids in creation order
    order: Vec<String>,
    active_tab_id: Option<String>,
    chrome_offset: u32,
    blank_url: String,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHROME_OFFSET, BLANK_URL)
    }
}

impl ViewRegistry {
    pub fn new(chrome_offset: u32, blank_url: impl Into<String>) -> Self {
        Self {
            tabs: HashMap::new(),
            order: Vec::new(),
            active_tab_id: None,
            chrome_offset,
            blank_url: blank_url.into(),
        }
    }

    /// Create a tab and make it active.
    ///
    /// No URL (or an empty one) yields a placeholder. Otherwise a surface is
    /// created and its first load is issued without waiting for it.
    pub fn create_tab(&mut self, host: &mut dyn ViewHost, url: Option<&str>) -> Result<TabCreated> {
        let Some(raw) = url.filter(|u| !u.is_empty()) else {
            let tab = Tab::placeholder();
            let created = TabCreated {
                id: tab.id.clone(),
                url: None,
                title: tab.title.clone(),
            };

            self.insert(tab);
            self.activate(host, &created.id);

            tracing::info!(tab_id = %created.id, "Created placeholder tab");
            return Ok(created);
        };

        let target = self.normalize_url(raw);
        let mut handle = host.create_view()?;

        if let Err(e) = handle.load_url(&target, 1) {
            tracing::warn!(url = %target, error = %e, "Initial load rejected");
        }

        let tab = Tab::live(target.clone(), handle);
        let created = TabCreated {
            id: tab.id.clone(),
            url: Some(target),
            title: tab.title.clone(),
        };

        self.insert(tab);
        self.activate(host, &created.id);

        tracing::info!(
            tab_id = %created.id,
            url = ?created.url,
            "Created new tab"
        );
        Ok(created)
    }

    /// Close a tab, handing the active pointer to a successor first.
    /// Returns false if the id is unknown.
    pub fn close_tab(&mut self, host: &mut dyn ViewHost, tab_id: &str) -> bool {
        let Some(tab) = self.tabs.get(tab_id) else {
            tracing::warn!(tab_id = %tab_id, "closeTab: tab not found");
            return false;
        };

        if self.active_tab_id.as_deref() == Some(tab_id) {
            if let Some(handle) = tab.handle() {
                host.detach_view(handle);
            }
            self.active_tab_id = None;

            let successor = self.order.iter().find(|id| id.as_str() != tab_id).cloned();
            if let Some(next) = successor {
                self.activate(host, &next);
            }
        }

        self.order.retain(|id| id != tab_id);
        if let Some(mut tab) = self.tabs.remove(tab_id) {
            if let Some(mut handle) = tab.close() {
                if !handle.is_destroyed() {
                    handle.destroy();
                }
            }
        }

        tracing::info!(tab_id = %tab_id, active = ?self.active_tab_id, "Closed tab");
        true
    }

    /// Bind a live tab's surface as the visible one and make it active.
    pub fn switch_tab(&mut self, host: &mut dyn ViewHost, tab_id: &str) -> Result<()> {
        let tab = self
            .tabs
            .get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        let handle = tab.handle_mut()?;

        let (width, height) = host.content_size();
        handle.set_bounds(ViewBounds::below_chrome(width, height, self.chrome_offset));
        handle.set_auto_resize(true, true);
        host.attach_view(&**handle);

        self.active_tab_id = Some(tab_id.to_string());

        tracing::debug!(tab_id = %tab_id, width, height, "Switched tab");
        Ok(())
    }

    /// Issue a load for `url` on a live tab. Does not wait for completion.
    pub fn navigate_tab(&mut self, tab_id: &str, url: &str) -> Result<u64> {
        let target = self.normalize_url(url);
        let tab = self.get_mut(tab_id)?;
        let seq = tab.start_load(Some(target.clone()))?;

        if let Err(e) = tab.handle_mut()?.load_url(&target, seq) {
            tracing::warn!(tab_id = %tab_id, url = %target, seq, error = %e, "Load rejected");
        }

        tracing::info!(tab_id = %tab_id, url = %target, seq, "Navigating tab");
        Ok(seq)
    }

    /// Go back if the surface reports history. Returns the new load
    /// sequence, or None when there is nowhere to go.
    pub fn go_back(&mut self, tab_id: &str) -> Result<Option<u64>> {
        let tab = self.get_mut(tab_id)?;
        if !tab.handle_mut()?.can_go_back() {
            tracing::debug!(tab_id = %tab_id, "No back history");
            return Ok(None);
        }

        let seq = tab.start_load(None)?;
        tab.handle_mut()?.go_back(seq);
        Ok(Some(seq))
    }

    /// Go forward if the surface reports history.
    pub fn go_forward(&mut self, tab_id: &str) -> Result<Option<u64>> {
        let tab = self.get_mut(tab_id)?;
        if !tab.handle_mut()?.can_go_forward() {
            tracing::debug!(tab_id = %tab_id, "No forward history");
            return Ok(None);
        }

        let seq = tab.start_load(None)?;
        tab.handle_mut()?.go_forward(seq);
        Ok(Some(seq))
    }

    pub fn refresh(&mut self, tab_id: &str) -> Result<u64> {
        let tab = self.get_mut(tab_id)?;
        let seq = tab.start_load(None)?;
        tab.handle_mut()?.reload(seq);
        Ok(seq)
    }

    /// False for unknown tabs and placeholders
    pub fn can_go_back(&self, tab_id: &str) -> bool {
        self.tabs
            .get(tab_id)
            .and_then(|t| t.handle())
            .is_some_and(|h| h.can_go_back())
    }

    pub fn can_go_forward(&self, tab_id: &str) -> bool {
        self.tabs
            .get(tab_id)
            .and_then(|t| t.handle())
            .is_some_and(|h| h.can_go_forward())
    }

    /// Apply a load-finished event. Returns the updated snapshot, or None
    /// if the tab is gone or the event belongs to a superseded load.
    pub fn on_load_finished(&mut self, tab_id: &str, seq: u64) -> Option<TabSnapshot> {
        let Some(tab) = self.tabs.get_mut(tab_id) else {
            tracing::debug!(tab_id = %tab_id, seq, "Dropping load finish for closed tab");
            return None;
        };

        if !tab.finish_load(seq) {
            tracing::debug!(tab_id = %tab_id, seq, current = ?tab.load_seq(), "Dropping stale load finish");
            return None;
        }

        tracing::info!(tab_id = %tab_id, seq, title = %tab.title, "Finished loading");
        Some(tab.snapshot())
    }

    /// Load failures are diagnostic only; no state changes.
    pub fn on_load_failed(&self, tab_id: &str, seq: u64, code: i32, description: &str) {
        match self.tabs.get(tab_id) {
            Some(tab) if tab.is_current(seq) => {
                tracing::warn!(tab_id = %tab_id, seq, code, description, "Tab failed to load");
            }
            Some(_) => {
                tracing::debug!(tab_id = %tab_id, seq, code, "Ignoring failure of superseded load");
            }
            None => {
                tracing::debug!(tab_id = %tab_id, seq, code, "Ignoring failure for closed tab");
            }
        }
    }

    pub fn on_favicon(&mut self, tab_id: &str, seq: u64, favicon: Option<String>) -> Option<TabSnapshot> {
        let tab = self.tabs.get_mut(tab_id)?;
        if !tab.apply_favicon(seq, favicon) {
            tracing::debug!(tab_id = %tab_id, seq, "Dropping stale favicon");
            return None;
        }
        Some(tab.snapshot())
    }

    pub fn get(&self, tab_id: &str) -> Result<&Tab> {
        self.tabs
            .get(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.tabs.contains_key(tab_id)
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.tabs.get(id))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Tab ids in creation order
    pub fn tab_ids(&self) -> &[String] {
        &self.order
    }

    pub fn overview(&self) -> TabOverview {
        TabOverview {
            active_tab_id: self.active_tab_id.clone(),
            tabs: self
                .order
                .iter()
                .filter_map(|id| self.tabs.get(id))
                .map(Tab::snapshot)
                .collect(),
        }
    }

    /// Blank, whitespace-only, or unparseable input becomes the blank address.
    pub fn normalize_url(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return self.blank_url.clone();
        }

        match url::Url::parse(trimmed) {
            Ok(parsed) => parsed.to_string(),
            Err(e) => {
                tracing::debug!(url = %trimmed, error = %e, "Unparseable URL, using blank page");
                self.blank_url.clone()
            }
        }
    }

    fn get_mut(&mut self, tab_id: &str) -> Result<&mut Tab> {
        self.tabs
            .get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    fn insert(&mut self, tab: Tab) {
        self.order.push(tab.id.clone());
        self.tabs.insert(tab.id.clone(), tab);
    }

    /// Make any tab active. Placeholders have nothing to show, so the
    /// previously visible surface is detached instead.
    fn activate(&mut self, host: &mut dyn ViewHost, tab_id: &str) {
        let is_placeholder = match self.tabs.get(tab_id) {
            Some(tab) => tab.is_placeholder(),
            None => return,
        };

        if !is_placeholder {
            if let Err(e) = self.switch_tab(host, tab_id) {
                tracing::warn!(tab_id = %tab_id, error = %e, "Failed to activate tab");
            }
            return;
        }

        if let Some(visible) = self.active_tab().and_then(|t| t.handle()) {
            host.detach_view(visible);
        }
        self.active_tab_id = Some(tab_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::host::ContentHandle;
    use crate::state::TabPhase;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct ViewLog {
        loads: Vec<(String, u64)>,
        bounds: Option<ViewBounds>,
        back: bool,
        back_calls: Vec<u64>,
        forward: bool,
        forward_calls: Vec<u64>,
        reloads: Vec<u64>,
        destroyed: bool,
    }

    /// Host-visible calls in the order they happened, e.g. `detach:3`
    type CallLog = Arc<Mutex<Vec<String>>>;

    struct TestView {
        id: u64,
        log: Arc<Mutex<ViewLog>>,
        calls: CallLog,
    }

    impl ContentHandle for TestView {
        fn view_id(&self) -> u64 {
            self.id
        }

        fn load_url(&mut self, url: &str, seq: u64) -> std::result::Result<(), ViewError> {
            self.log.lock().loads.push((url.to_string(), seq));
            Ok(())
        }

        fn title(&self) -> String {
            format!("View {}", self.id)
        }

        fn url(&self) -> Option<String> {
            self.log.lock().loads.last().map(|(u, _)| u.clone())
        }

        fn can_go_back(&self) -> bool {
            self.log.lock().back
        }

        fn can_go_forward(&self) -> bool {
            self.log.lock().forward
        }

        fn go_back(&mut self, seq: u64) {
            self.log.lock().back_calls.push(seq);
        }

        fn go_forward(&mut self, seq: u64) {
            self.log.lock().forward_calls.push(seq);
        }

        fn reload(&mut self, seq: u64) {
            self.log.lock().reloads.push(seq);
        }

        fn set_bounds(&mut self, bounds: ViewBounds) {
            self.log.lock().bounds = Some(bounds);
        }

        fn set_auto_resize(&mut self, _width: bool, _height: bool) {}

        fn is_destroyed(&self) -> bool {
            self.log.lock().destroyed
        }

        fn destroy(&mut self) {
            self.log.lock().destroyed = true;
            self.calls.lock().push(format!("destroy:{}", self.id));
        }
    }

    #[derive(Default)]
    struct TestHost {
        next_id: u64,
        views: Vec<Arc<Mutex<ViewLog>>>,
        visible: Option<u64>,
        calls: CallLog,
        fail_create: bool,
    }

    impl ViewHost for TestHost {
        fn create_view(&mut self) -> std::result::Result<Box<dyn ContentHandle>, ViewError> {
            if self.fail_create {
                return Err(ViewError::CreateFailed("no window".to_string()));
            }
            self.next_id += 1;
            let log = Arc::new(Mutex::new(ViewLog::default()));
            self.views.push(Arc::clone(&log));
            Ok(Box::new(TestView {
                id: self.next_id,
                log,
                calls: Arc::clone(&self.calls),
            }))
        }

        fn content_size(&self) -> (u32, u32) {
            (1024, 768)
        }

        fn attach_view(&mut self, view: &dyn ContentHandle) {
            self.calls.lock().push(format!("attach:{}", view.view_id()));
            self.visible = Some(view.view_id());
        }

        fn detach_view(&mut self, view: &dyn ContentHandle) {
            self.calls.lock().push(format!("detach:{}", view.view_id()));
            if self.visible == Some(view.view_id()) {
                self.visible = None;
            }
        }
    }

    #[test]
    fn test_placeholder_tab_becomes_active() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let created = registry.create_tab(&mut host, None).unwrap();
        assert_eq!(created.url, None);
        assert_eq!(created.title, "New Tab");
        assert_eq!(registry.active_tab_id(), Some(created.id.as_str()));
        assert!(host.views.is_empty());

        // Empty string is the same as no URL
        let second = registry.create_tab(&mut host, Some("")).unwrap();
        assert_eq!(registry.active_tab_id(), Some(second.id.as_str()));
        assert!(registry.get(&second.id).unwrap().is_placeholder());
    }

    #[test]
    fn test_live_tab_loads_and_attaches() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let created = registry
            .create_tab(&mut host, Some("https://a.test"))
            .unwrap();
        assert_eq!(created.title, "Loading...");
        assert_eq!(created.url.as_deref(), Some("https://a.test/"));
        assert_eq!(host.visible, Some(1));

        let log = host.views[0].lock();
        assert_eq!(log.loads, vec![("https://a.test/".to_string(), 1)]);
        assert_eq!(
            log.bounds,
            Some(ViewBounds {
                x: 0,
                y: 64,
                width: 1024,
                height: 704
            })
        );
    }

    #[test]
    fn test_malformed_url_loads_blank_page() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let created = registry.create_tab(&mut host, Some("   ")).unwrap();
        assert_eq!(created.url.as_deref(), Some("about:blank"));

        registry.navigate_tab(&created.id, "not a url").unwrap();
        let log = host.views[0].lock();
        assert_eq!(log.loads.last().map(|(u, _)| u.as_str()), Some("about:blank"));
    }

    #[test]
    fn test_view_creation_failure_registers_nothing() {
        let mut host = TestHost {
            fail_create: true,
            ..Default::default()
        };
        let mut registry = ViewRegistry::default();

        let result = registry.create_tab(&mut host, Some("https://a.test"));
        assert!(matches!(result, Err(TabError::View(_))));
        assert!(registry.is_empty());
        assert_eq!(registry.active_tab_id(), None);
    }

    #[test]
    fn test_switch_rejects_placeholder_and_unknown() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let live = registry
            .create_tab(&mut host, Some("https://a.test"))
            .unwrap();
        let home = registry.create_tab(&mut host, None).unwrap();
        assert_eq!(host.visible, None);

        assert_eq!(
            registry.switch_tab(&mut host, &home.id),
            Err(TabError::NoContentHandle(home.id.clone()))
        );
        assert_eq!(
            registry.switch_tab(&mut host, "missing"),
            Err(TabError::NotFound("missing".to_string()))
        );
        assert_eq!(registry.active_tab_id(), Some(home.id.as_str()));

        registry.switch_tab(&mut host, &live.id).unwrap();
        assert_eq!(registry.active_tab_id(), Some(live.id.as_str()));
        assert_eq!(host.visible, Some(1));
    }

    #[test]
    fn test_close_active_picks_first_remaining() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let a = registry.create_tab(&mut host, Some("https://a.test")).unwrap();
        let b = registry.create_tab(&mut host, Some("https://b.test")).unwrap();
        let c = registry.create_tab(&mut host, Some("https://c.test")).unwrap();
        assert_eq!(registry.active_tab_id(), Some(c.id.as_str()));
        host.calls.lock().clear();

        // Detach the closing view, show the successor, only then destroy
        assert!(registry.close_tab(&mut host, &c.id));
        assert_eq!(registry.active_tab_id(), Some(a.id.as_str()));
        assert_eq!(host.visible, Some(1));
        assert!(host.views[2].lock().destroyed);
        assert_eq!(*host.calls.lock(), vec!["detach:3", "attach:1", "destroy:3"]);
        host.calls.lock().clear();

        // Closing a background tab leaves the active one alone
        assert!(registry.close_tab(&mut host, &b.id));
        assert_eq!(registry.active_tab_id(), Some(a.id.as_str()));
        assert_eq!(*host.calls.lock(), vec!["destroy:2"]);

        assert!(registry.close_tab(&mut host, &a.id));
        assert_eq!(registry.active_tab_id(), None);
        assert_eq!(host.visible, None);
        assert!(registry.is_empty());

        assert!(!registry.close_tab(&mut host, &a.id));
    }

    #[test]
    fn test_stale_finish_does_not_overwrite_newer_load() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let tab = registry.create_tab(&mut host, Some("https://a.test")).unwrap();
        let first = registry.navigate_tab(&tab.id, "https://b.test").unwrap();
        let second = registry.navigate_tab(&tab.id, "https://c.test").unwrap();
        assert_eq!(second, first + 1);

        let snapshot = registry.on_load_finished(&tab.id, second).unwrap();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.url.as_deref(), Some("https://c.test/"));

        // The earlier load finishing late is dropped
        assert!(registry.on_load_finished(&tab.id, first).is_none());
        let current = registry.get(&tab.id).unwrap();
        assert_eq!(current.phase(), TabPhase::Ready);
        assert_eq!(current.url.as_deref(), Some("https://c.test/"));

        // Events for a closed tab are dropped
        registry.close_tab(&mut host, &tab.id);
        assert!(registry.on_load_finished(&tab.id, second).is_none());
        assert!(registry.on_favicon(&tab.id, second, None).is_none());
        registry.on_load_failed(&tab.id, second, -3, "aborted");
    }

    #[test]
    fn test_history_navigation_respects_handle() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let tab = registry.create_tab(&mut host, Some("https://a.test")).unwrap();
        assert!(!registry.can_go_back(&tab.id));
        assert_eq!(registry.go_back(&tab.id), Ok(None));
        assert!(host.views[0].lock().back_calls.is_empty());

        host.views[0].lock().back = true;
        assert!(registry.can_go_back(&tab.id));
        assert_eq!(registry.go_back(&tab.id), Ok(Some(2)));
        assert_eq!(host.views[0].lock().back_calls, vec![2]);

        assert_eq!(registry.refresh(&tab.id), Ok(3));
        assert_eq!(host.views[0].lock().reloads, vec![3]);

        assert!(!registry.can_go_forward(&tab.id));
        assert_eq!(registry.go_forward(&tab.id), Ok(None));
        assert!(host.views[0].lock().forward_calls.is_empty());

        host.views[0].lock().forward = true;
        assert!(registry.can_go_forward(&tab.id));
        assert_eq!(registry.go_forward(&tab.id), Ok(Some(4)));
        assert_eq!(host.views[0].lock().forward_calls, vec![4]);
        assert!(registry.get(&tab.id).unwrap().is_loading());

        // A finish for the superseded reload is ignored
        assert!(registry.on_load_finished(&tab.id, 3).is_none());
        assert!(registry.on_load_finished(&tab.id, 4).is_some());

        let home = registry.create_tab(&mut host, None).unwrap();
        assert!(!registry.can_go_back(&home.id));
        assert!(!registry.can_go_forward(&home.id));
        assert!(registry.go_forward(&home.id).is_err());
        assert!(registry.refresh(&home.id).is_err());
        assert!(!registry.can_go_forward("missing"));
    }

    #[test]
    fn test_overview_in_creation_order() {
        let mut host = TestHost::default();
        let mut registry = ViewRegistry::default();

        let a = registry.create_tab(&mut host, None).unwrap();
        let b = registry.create_tab(&mut host, Some("https://b.test")).unwrap();

        let overview = registry.overview();
        assert_eq!(overview.active_tab_id.as_deref(), Some(b.id.as_str()));
        let ids: Vec<&str> = overview.tabs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
        assert_eq!(registry.tab_ids().len(), 2);
    }
}
