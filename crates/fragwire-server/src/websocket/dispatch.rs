//! Command dispatch — turns one inbound payload into one outbound payload.

use std::sync::Arc;

use fragwire_templates::FragmentRenderer;
use metrics::counter;
use tracing::{debug, warn};

use crate::commands::{CommandAction, CommandTable};
use crate::metrics::{FRAGMENTS_RENDERED_TOTAL, FRAGMENT_RENDER_FAILURES_TOTAL, MESSAGES_ECHOED_TOTAL};

/// Per-session element identifier handed to fragment templates.
///
/// Starts at 0 and advances by one after each successful render.
#[derive(Debug, Default)]
pub struct ElementCounter(u64);

impl ElementCounter {
    /// Value the next render will use.
    pub fn current(&self) -> u64 {
        self.0
    }

    fn advance(&mut self) {
        self.0 += 1;
    }
}

/// Outcome of dispatching one payload.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A fragment rendered and trimmed.
    Rendered(String),
    /// A fixed reply from the command table.
    Literal(String),
    /// Reply with the inbound payload unchanged.
    Echo,
}

/// Shared, read-only dispatcher: command table plus fragment renderer.
pub struct Dispatcher {
    commands: Arc<CommandTable>,
    renderer: Arc<dyn FragmentRenderer>,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(commands: Arc<CommandTable>, renderer: Arc<dyn FragmentRenderer>) -> Self {
        Self { commands, renderer }
    }

    /// The command table.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Dispatch `text` for a session whose counter is `counter`.
    ///
    /// Unknown commands and failed renders both echo; the counter only moves
    /// on a successful render.
    pub fn dispatch(&self, text: &str, counter: &mut ElementCounter) -> Dispatch {
        let outcome = match self.commands.get(text) {
            None => Dispatch::Echo,
            Some(CommandAction::Literal(markup)) => Dispatch::Literal(markup.clone()),
            Some(CommandAction::Template(name)) => {
                match self.renderer.render(name, counter.current()) {
                    Ok(fragment) => {
                        debug!(command = text, template = %name, id = counter.current(), "fragment rendered");
                        counter.advance();
                        counter!(FRAGMENTS_RENDERED_TOTAL).increment(1);
                        Dispatch::Rendered(fragment.trim().to_owned())
                    }
                    Err(e) => {
                        warn!(command = text, template = %name, error = %e, "render failed, echoing payload");
                        counter!(FRAGMENT_RENDER_FAILURES_TOTAL).increment(1);
                        Dispatch::Echo
                    }
                }
            }
        };
        if outcome == Dispatch::Echo {
            counter!(MESSAGES_ECHOED_TOTAL).increment(1);
        }
        outcome
    }

    /// Dispatch a binary payload. Bytes that are not valid UTF-8 match no
    /// command and are echoed.
    pub fn dispatch_bytes(&self, data: &[u8], counter: &mut ElementCounter) -> Dispatch {
        if let Ok(text) = std::str::from_utf8(data) {
            self.dispatch(text, counter)
        } else {
            debug!(len = data.len(), "binary payload is not UTF-8, echoing");
            counter!(MESSAGES_ECHOED_TOTAL).increment(1);
            Dispatch::Echo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragwire_templates::{TemplateError, TemplateName, TemplateRegistry};

    const FRAGMENTS: &str = "\
{% block buttonTemplate1 %}

   <div id=\"{{ id }}\">
       <button>Test button</button>
   </div>

{% endblock %}
";

    struct FailingRenderer;

    impl FragmentRenderer for FailingRenderer {
        fn render(&self, name: &TemplateName, _datum: u64) -> fragwire_templates::Result<String> {
            Err(TemplateError::UnknownTemplate {
                name: name.to_string(),
            })
        }
    }

    fn dispatcher(renderer: Arc<dyn FragmentRenderer>) -> Dispatcher {
        let table = CommandTable::builder()
            .template("addButton", "buttonTemplate1")
            .template("addGhost", "noSuchTemplate")
            .literal("addInput", "<input placeholder='put something here'></input>")
            .build();
        Dispatcher::new(Arc::new(table), renderer)
    }

    fn registry_dispatcher() -> Dispatcher {
        dispatcher(Arc::new(TemplateRegistry::inline("socketTemplates.html", FRAGMENTS)))
    }

    #[test]
    fn rendered_fragment_is_trimmed_and_counter_advances() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        let out = d.dispatch("addButton", &mut counter);
        assert_eq!(
            out,
            Dispatch::Rendered(
                "<div id=\"0\">\n       <button>Test button</button>\n   </div>".into()
            )
        );
        assert_eq!(counter.current(), 1);
    }

    #[test]
    fn nth_render_uses_n_minus_one() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        for n in 0..5_u64 {
            let Dispatch::Rendered(fragment) = d.dispatch("addButton", &mut counter) else {
                panic!("expected a rendered fragment");
            };
            assert!(fragment.starts_with(&format!("<div id=\"{n}\">")));
        }
        assert_eq!(counter.current(), 5);
    }

    #[test]
    fn unknown_command_echoes_without_counting() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        assert_eq!(d.dispatch("unknownCmd", &mut counter), Dispatch::Echo);
        assert_eq!(d.dispatch("", &mut counter), Dispatch::Echo);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn literal_command_leaves_counter() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        assert_eq!(
            d.dispatch("addInput", &mut counter),
            Dispatch::Literal("<input placeholder='put something here'></input>".into())
        );
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn unknown_template_echoes() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        assert_eq!(d.dispatch("addGhost", &mut counter), Dispatch::Echo);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn renderer_failure_echoes() {
        let d = dispatcher(Arc::new(FailingRenderer));
        let mut counter = ElementCounter::default();
        assert_eq!(d.dispatch("addButton", &mut counter), Dispatch::Echo);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn failed_load_echoes_every_time() {
        let d = dispatcher(Arc::new(TemplateRegistry::from_file("/missing/socketTemplates.html")));
        let mut counter = ElementCounter::default();
        assert_eq!(d.dispatch("addButton", &mut counter), Dispatch::Echo);
        assert_eq!(d.dispatch("addButton", &mut counter), Dispatch::Echo);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn binary_lookup_matches_valid_utf8() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        assert!(matches!(
            d.dispatch_bytes(b"addButton", &mut counter),
            Dispatch::Rendered(_)
        ));
        assert_eq!(counter.current(), 1);
    }

    #[test]
    fn invalid_utf8_never_matches_replacement_char_command() {
        let table = CommandTable::builder()
            .literal("\u{FFFD}", "<hr>")
            .build();
        let d = Dispatcher::new(
            Arc::new(table),
            Arc::new(TemplateRegistry::inline("socketTemplates.html", FRAGMENTS)),
        );
        let mut counter = ElementCounter::default();
        assert_eq!(d.dispatch_bytes(&[0xff], &mut counter), Dispatch::Echo);
        assert_eq!(
            d.dispatch_bytes("\u{FFFD}".as_bytes(), &mut counter),
            Dispatch::Literal("<hr>".into())
        );
    }

    #[test]
    fn counter_survives_interleaved_misses() {
        let d = registry_dispatcher();
        let mut counter = ElementCounter::default();
        let _ = d.dispatch("addButton", &mut counter);
        let _ = d.dispatch("nope", &mut counter);
        let _ = d.dispatch("addInput", &mut counter);
        let Dispatch::Rendered(fragment) = d.dispatch("addButton", &mut counter) else {
            panic!("expected a rendered fragment");
        };
        assert!(fragment.starts_with("<div id=\"1\">"));
    }
}
