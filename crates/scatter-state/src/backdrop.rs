//! Backdrop image load bookkeeping
//!
//! The image's natural size is only known once the browser has loaded it. Loading is the
//! single async boundary of the visual: a finished load triggers one more render, but only
//! when the image differs from the one the last render already used.

use scatter_charts::BackdropImage;

/// Tracks the in-flight request and the image the last render used
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackdropLoader {
    pending: Option<String>,
    loaded: Option<BackdropImage>,
}

impl BackdropLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `url`; `true` when the host must start a load
    pub fn request(&mut self, url: &str) -> bool {
        let already_loaded = self.loaded.as_ref().is_some_and(|image| image.url == url);
        let in_flight = self.pending.as_deref() == Some(url);
        if already_loaded || in_flight {
            return false;
        }
        self.pending = Some(url.to_string());
        true
    }

    /// Record a finished load; `true` when another render is needed
    pub fn on_loaded(&mut self, image: BackdropImage) -> bool {
        if self.pending.as_deref() != Some(image.url.as_str()) {
            tracing::debug!("Ignoring stale backdrop load: {}", image.url);
            return false;
        }
        self.pending = None;
        if self.loaded.as_ref() == Some(&image) {
            return false;
        }
        self.loaded = Some(image);
        true
    }

    /// A failed load never re-renders; the next request for the same url retries
    pub fn on_failed(&mut self, url: &str) {
        if self.pending.as_deref() == Some(url) {
            tracing::warn!("Backdrop failed to load: {}", url);
            self.pending = None;
        }
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn image(&self) -> Option<&BackdropImage> {
        self.loaded.as_ref()
    }
}
