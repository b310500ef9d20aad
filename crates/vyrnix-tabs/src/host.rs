//! Capabilities the hosting layer provides for content surfaces

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// Region of the window a surface is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewBounds {
    /// Fill the window content area below the chrome strip.
    pub fn below_chrome(width: u32, height: u32, chrome_offset: u32) -> Self {
        Self {
            x: 0,
            y: chrome_offset as i32,
            width,
            height: height.saturating_sub(chrome_offset),
        }
    }
}

/// One content surface. Owned exclusively by its tab.
///
/// Load operations carry the tab's load sequence number; the hosting layer
/// echoes it back in the matching finish/fail/favicon events.
pub trait ContentHandle: Send {
    /// Hosting-layer identifier, for diagnostics
    fn view_id(&self) -> u64;

    /// Start loading `url`. Completion arrives later as an event.
    fn load_url(&mut self, url: &str, seq: u64) -> Result<(), ViewError>;

    fn title(&self) -> String;

    /// Committed address, if the surface has one
    fn url(&self) -> Option<String>;

    fn can_go_back(&self) -> bool;

    fn can_go_forward(&self) -> bool;

    fn go_back(&mut self, seq: u64);

    fn go_forward(&mut self, seq: u64);

    fn reload(&mut self, seq: u64);

    fn set_bounds(&mut self, bounds: ViewBounds);

    fn set_auto_resize(&mut self, width: bool, height: bool);

    fn is_destroyed(&self) -> bool;

    fn destroy(&mut self);
}

/// The window that creates and displays content surfaces.
pub trait ViewHost: Send {
    fn create_view(&mut self) -> Result<Box<dyn ContentHandle>, ViewError>;

    /// Current window content size as (width, height)
    fn content_size(&self) -> (u32, u32);

    /// Bind `view` as the sole visible surface, replacing any other.
    fn attach_view(&mut self, view: &dyn ContentHandle);

    fn detach_view(&mut self, view: &dyn ContentHandle);
}
