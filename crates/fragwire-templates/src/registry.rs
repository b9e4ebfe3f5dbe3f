//! Lazily loaded template registry.
//!
//! All fragments live in a single template source, each one declared as a
//! top-level block:
//!
//! ```text
//! {% block buttonTemplate1 %}
//! <div id="{{ id }}"><button>Test button</button></div>
//! {% endblock %}
//! ```
//!
//! Rendering a [`TemplateName`] renders the block of that name with the datum
//! bound as [`DATUM_KEY`]. Nothing else is visible to the template.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use minijinja::{Environment, ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TemplateError};

/// Name the datum is bound to inside fragment templates.
pub const DATUM_KEY: &str = "id";

/// Identifier of a renderable fragment (a block in the template source).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateName(String);

impl TemplateName {
    /// Wrap a fragment name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TemplateName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Renders a named fragment with a single numeric datum.
///
/// Implementations must be safe to call concurrently from many sessions.
pub trait FragmentRenderer: Send + Sync {
    /// Expand the fragment `name` with `datum` as its only input.
    fn render(&self, name: &TemplateName, datum: u64) -> Result<String>;
}

/// Where the registry reads its template source from.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    /// A template file on disk, read on first use.
    File(PathBuf),
    /// An in-memory template.
    Inline {
        /// Name the source is registered under (its extension picks auto-escaping).
        name: String,
        /// Template text.
        source: String,
    },
}

impl TemplateSource {
    /// Name the source is registered under in the environment.
    fn root_name(&self) -> String {
        match self {
            Self::File(path) => path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            ),
            Self::Inline { name, .. } => name.clone(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            }),
            Self::Inline { source, .. } => Ok(source.clone()),
        }
    }
}

/// Load state of a [`TemplateRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryStatus {
    /// Nothing has rendered yet; the source has not been read.
    Pending,
    /// The source loaded and parsed.
    Ready,
    /// The one-time load failed.
    Failed,
}

/// Template registry loaded at most once, on first use.
///
/// Concurrent first uses block on the same initialization; exactly one load
/// attempt runs and every caller observes its outcome, success or failure.
pub struct TemplateRegistry {
    source: TemplateSource,
    root: String,
    loaded: OnceLock<Result<Environment<'static>>>,
}

impl TemplateRegistry {
    /// Create a registry over `source`. Nothing is read until first use.
    pub fn new(source: TemplateSource) -> Self {
        let root = source.root_name();
        Self {
            source,
            root,
            loaded: OnceLock::new(),
        }
    }

    /// Registry backed by a template file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(TemplateSource::File(path.into()))
    }

    /// Registry backed by an in-memory template.
    pub fn inline(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(TemplateSource::Inline {
            name: name.into(),
            source: source.into(),
        })
    }

    /// Force the one-time load now.
    pub fn load(&self) -> Result<()> {
        self.environment().map(|_| ())
    }

    /// Current load state.
    pub fn status(&self) -> RegistryStatus {
        match self.loaded.get() {
            None => RegistryStatus::Pending,
            Some(Ok(_)) => RegistryStatus::Ready,
            Some(Err(_)) => RegistryStatus::Failed,
        }
    }

    /// Render block `name` with an arbitrary serializable context.
    pub fn render_block<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let env = self.environment()?;
        let template = env.get_template(&self.root)?;
        let mut state = template.eval_to_state(ctx)?;
        state.render_block(name).map_err(|e| {
            if matches!(e.kind(), ErrorKind::UnknownBlock) {
                TemplateError::UnknownTemplate {
                    name: name.to_owned(),
                }
            } else {
                TemplateError::Render(e)
            }
        })
    }

    /// Render block `name` with an empty context.
    pub fn render_static(&self, name: &str) -> Result<String> {
        self.render_block(name, minijinja::context! {})
    }

    // The first caller reads the source synchronously, on whatever thread it
    // runs. The fragment file is small and read once per process.
    fn environment(&self) -> Result<&Environment<'static>> {
        self.loaded
            .get_or_init(|| self.load_environment())
            .as_ref()
            .map_err(|e| TemplateError::Unavailable {
                reason: e.to_string(),
            })
    }

    fn load_environment(&self) -> Result<Environment<'static>> {
        debug!(template = %self.root, "loading templates");
        let result = self.source.read().and_then(|text| {
            let mut env = Environment::new();
            env.add_template_owned(self.root.clone(), text)
                .map_err(|source| TemplateError::Syntax {
                    name: self.root.clone(),
                    source,
                })?;
            Ok(env)
        });
        match &result {
            Ok(_) => info!(template = %self.root, "templates loaded"),
            Err(e) => warn!(template = %self.root, error = %e, "template load failed"),
        }
        result
    }
}

impl FragmentRenderer for TemplateRegistry {
    fn render(&self, name: &TemplateName, datum: u64) -> Result<String> {
        self.render_block(name.as_str(), BTreeMap::from([(DATUM_KEY, datum)]))
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("root", &self.root)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FRAGMENTS: &str = "\
{% block buttonTemplate1 %}
<div id=\"{{ id }}\">
    <button>Test button</button>
</div>
{% endblock %}
{% block paragraphTemplate1 %}
<p id=\"{{ id }}\">paragraph</p>
{% endblock %}
";

    fn registry() -> TemplateRegistry {
        TemplateRegistry::inline("socketTemplates.html", FRAGMENTS)
    }

    #[test]
    fn status_pending_until_first_use() {
        let reg = registry();
        assert_eq!(reg.status(), RegistryStatus::Pending);
        let _ = reg.render(&"buttonTemplate1".into(), 0).unwrap();
        assert_eq!(reg.status(), RegistryStatus::Ready);
    }

    #[test]
    fn renders_block_with_datum() {
        let reg = registry();
        let out = reg.render(&"buttonTemplate1".into(), 7).unwrap();
        assert!(out.contains("<div id=\"7\">"));
        assert!(out.contains("<button>Test button</button>"));
    }

    #[test]
    fn render_keeps_template_whitespace() {
        let reg = registry();
        let out = reg.render(&"paragraphTemplate1".into(), 0).unwrap();
        assert!(out.starts_with('\n'));
        assert_eq!(out.trim(), "<p id=\"0\">paragraph</p>");
    }

    #[test]
    fn unknown_block_is_unknown_template() {
        let reg = registry();
        let err = reg.render(&"nope".into(), 0).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTemplate { ref name } if name == "nope"));
    }

    #[test]
    fn missing_file_fails_every_render() {
        let reg = TemplateRegistry::from_file("/definitely/not/here/socketTemplates.html");
        let first = reg.render(&"buttonTemplate1".into(), 0).unwrap_err();
        assert!(matches!(first, TemplateError::Unavailable { .. }));
        assert_eq!(reg.status(), RegistryStatus::Failed);
        let second = reg.render(&"buttonTemplate1".into(), 1).unwrap_err();
        assert!(matches!(second, TemplateError::Unavailable { .. }));
        assert!(second.to_string().contains("socketTemplates.html"));
    }

    #[test]
    fn syntax_error_fails_load() {
        let reg = TemplateRegistry::inline("broken.html", "{% block a %}{{ id ");
        let err = reg.load().unwrap_err();
        assert!(err.to_string().contains("broken.html"));
        assert_eq!(reg.status(), RegistryStatus::Failed);
    }

    #[test]
    fn file_is_read_only_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{% block a %}}first {{{{ id }}}}{{% endblock %}}").unwrap();
        let reg = TemplateRegistry::from_file(file.path());
        assert_eq!(reg.render(&"a".into(), 1).unwrap(), "first 1");

        std::fs::write(file.path(), "{% block a %}second{% endblock %}").unwrap();

        assert_eq!(reg.render(&"a".into(), 2).unwrap(), "first 2");
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let reg = registry();
        std::thread::scope(|s| {
            for i in 0..8_u64 {
                let reg = &reg;
                let _ = s.spawn(move || {
                    let out = reg.render(&"paragraphTemplate1".into(), i).unwrap();
                    assert!(out.contains(&format!("id=\"{i}\"")));
                });
            }
        });
        assert_eq!(reg.status(), RegistryStatus::Ready);
    }

    #[test]
    fn render_static_block() {
        let reg = TemplateRegistry::inline("page.html", "{% block websocket %}<html></html>{% endblock %}");
        let out = reg.render_static("websocket").unwrap();
        assert_eq!(out, "<html></html>");
    }

    #[test]
    fn template_name_display_and_serde() {
        let name = TemplateName::from("socketTemplate1");
        assert_eq!(name.to_string(), "socketTemplate1");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"socketTemplate1\"");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&RegistryStatus::Ready).unwrap();
        assert_eq!(json, "\"ready\"");
    }

    #[test]
    fn file_root_name_is_file_name() {
        let source = TemplateSource::File(PathBuf::from("templates/socketTemplates.html"));
        assert_eq!(source.root_name(), "socketTemplates.html");
    }
}
