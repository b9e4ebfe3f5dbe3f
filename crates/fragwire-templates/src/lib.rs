//! # fragwire-templates
//!
//! Template registry for server-rendered HTML fragments.
//!
//! - One template source (file or inline string) holds every fragment as a
//!   named `{% block %}`
//! - The source is parsed lazily, exactly once, on first use
//! - A failed load is recorded and every later render fails with
//!   [`TemplateError::Unavailable`]
//! - [`FragmentRenderer`] is the seam the WebSocket session loop renders through

#![deny(unsafe_code)]

pub mod error;
pub mod registry;

pub use error::{Result, TemplateError};
pub use registry::{
    DATUM_KEY, FragmentRenderer, RegistryStatus, TemplateName, TemplateRegistry, TemplateSource,
};
