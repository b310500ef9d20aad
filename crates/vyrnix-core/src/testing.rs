//! Scripted hosting layer for tests
//!
//! Everything the fakes observe lands in shared state so tests can inspect
//! it after the host has been moved into a control plane.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vyrnix_download::Transfer;
use vyrnix_tabs::{ContentHandle, ViewBounds, ViewError, ViewHost};

use crate::error::HostError;
use crate::host::{HostingLayer, LoadedExtension};

#[derive(Debug, Default)]
pub struct HostState {
    pub views_created: u64,
    /// View currently bound to the display region
    pub visible: Option<u64>,
    /// (view id, url, seq) for every load issued
    pub loads: Vec<(u64, String, u64)>,
    pub bounds: Vec<(u64, ViewBounds)>,
    pub destroyed: Vec<u64>,
    /// Views that report back history
    pub back_history: HashSet<u64>,
    pub forward_history: HashSet<u64>,
    /// Attach, detach and destroy calls in order, e.g. `attach:2`
    pub calls: Vec<String>,
    pub opened: Vec<PathBuf>,
    /// URLs handed to the system browser
    pub external: Vec<String>,
    /// Ids of extensions currently loaded
    pub extensions: Vec<String>,
    pub fail_create: bool,
    pub fail_open: bool,
    pub fail_extensions: bool,
}

impl HostState {
    pub fn last_load(&self, view_id: u64) -> Option<(String, u64)> {
        self.loads
            .iter()
            .rev()
            .find(|(id, _, _)| *id == view_id)
            .map(|(_, url, seq)| (url.clone(), *seq))
    }
}

#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock()
    }
}

pub struct FakeView {
    id: u64,
    state: Arc<Mutex<HostState>>,
}

impl ContentHandle for FakeView {
    fn view_id(&self) -> u64 {
        self.id
    }

    fn load_url(&mut self, url: &str, seq: u64) -> Result<(), ViewError> {
        self.state.lock().loads.push((self.id, url.to_string(), seq));
        Ok(())
    }

    fn title(&self) -> String {
        match self.state.lock().last_load(self.id) {
            Some((url, _)) => format!("Title of {url}"),
            None => String::new(),
        }
    }

    fn url(&self) -> Option<String> {
        self.state.lock().last_load(self.id).map(|(url, _)| url)
    }

    fn can_go_back(&self) -> bool {
        self.state.lock().back_history.contains(&self.id)
    }

    fn can_go_forward(&self) -> bool {
        self.state.lock().forward_history.contains(&self.id)
    }

    fn go_back(&mut self, _seq: u64) {}

    fn go_forward(&mut self, _seq: u64) {}

    fn reload(&mut self, _seq: u64) {}

    fn set_bounds(&mut self, bounds: ViewBounds) {
        self.state.lock().bounds.push((self.id, bounds));
    }

    fn set_auto_resize(&mut self, _width: bool, _height: bool) {}

    fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed.contains(&self.id)
    }

    fn destroy(&mut self) {
        let mut state = self.state.lock();
        state.destroyed.push(self.id);
        state.calls.push(format!("destroy:{}", self.id));
    }
}

impl ViewHost for FakeHost {
    fn create_view(&mut self) -> Result<Box<dyn ContentHandle>, ViewError> {
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(ViewError::CreateFailed("window closed".to_string()));
        }

        state.views_created += 1;
        Ok(Box::new(FakeView {
            id: state.views_created,
            state: Arc::clone(&self.state),
        }))
    }

    fn content_size(&self) -> (u32, u32) {
        (1200, 800)
    }

    fn attach_view(&mut self, view: &dyn ContentHandle) {
        let mut state = self.state.lock();
        state.calls.push(format!("attach:{}", view.view_id()));
        state.visible = Some(view.view_id());
    }

    fn detach_view(&mut self, view: &dyn ContentHandle) {
        let mut state = self.state.lock();
        state.calls.push(format!("detach:{}", view.view_id()));
        if state.visible == Some(view.view_id()) {
            state.visible = None;
        }
    }
}

impl HostingLayer for FakeHost {
    fn open_path(&mut self, path: &Path) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(HostError::OpenFailed {
                path: path.display().to_string(),
                reason: "no handler".to_string(),
            });
        }
        state.opened.push(path.to_path_buf());
        Ok(())
    }

    fn open_external(&mut self, url: &str) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(HostError::OpenExternalFailed {
                url: url.to_string(),
                reason: "no handler".to_string(),
            });
        }
        state.external.push(url.to_string());
        Ok(())
    }

    fn load_extension(&mut self, path: &Path) -> Result<LoadedExtension, HostError> {
        let mut state = self.state.lock();
        if state.fail_extensions {
            return Err(HostError::Extension("manifest.json missing".to_string()));
        }

        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        state.extensions.push(id.clone());

        Ok(LoadedExtension {
            name: id.clone(),
            id,
            version: "1.0.0".to_string(),
            path: path.display().to_string(),
        })
    }

    fn remove_extension(&mut self, id: &str) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_extensions {
            return Err(HostError::Extension(format!("{id} is not loaded")));
        }
        state.extensions.retain(|e| e != id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TransferState {
    pub received: u64,
    pub total: u64,
    pub paused: bool,
    pub cancelled: bool,
    pub save_path: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeTransfer {
    state: Arc<Mutex<TransferState>>,
}

impl FakeTransfer {
    pub fn with_total(total: u64) -> Self {
        let transfer = Self::default();
        transfer.state().total = total;
        transfer
    }

    pub fn state(&self) -> MutexGuard<'_, TransferState> {
        self.state.lock()
    }
}

impl Transfer for FakeTransfer {
    fn url(&self) -> String {
        "https://files.test/archive.zip".to_string()
    }

    fn filename(&self) -> String {
        "archive.zip".to_string()
    }

    fn save_path(&self) -> Option<String> {
        self.state.lock().save_path.clone()
    }

    fn received_bytes(&self) -> u64 {
        self.state.lock().received
    }

    fn total_bytes(&self) -> u64 {
        self.state.lock().total
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn resume(&mut self) {
        self.state.lock().paused = false;
    }

    fn cancel(&mut self) {
        self.state.lock().cancelled = true;
    }
}
