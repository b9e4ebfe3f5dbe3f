//! `/` endpoint — the static page that opens the WebSocket from the browser.

use std::sync::Arc;

use fragwire_templates::{Result, TemplateRegistry};

/// Landing page: one block of a page template, rendered with no data.
#[derive(Clone, Debug)]
pub struct LandingPage {
    registry: Arc<TemplateRegistry>,
    block: String,
}

impl LandingPage {
    /// Page rendered from `block` of `registry`.
    pub fn new(registry: Arc<TemplateRegistry>, block: impl Into<String>) -> Self {
        Self {
            registry,
            block: block.into(),
        }
    }

    /// Render the page.
    pub fn render(&self) -> Result<String> {
        self.registry.render_static(&self.block)
    }
}
