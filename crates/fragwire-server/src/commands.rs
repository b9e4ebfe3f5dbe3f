//! Command table — fixed mapping from inbound command tokens to actions.
//!
//! Built once with [`CommandTableBuilder`] before the server starts, then
//! shared read-only by every session.

use std::collections::HashMap;

use fragwire_templates::TemplateName;

/// What the server does for a recognized command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandAction {
    /// Render the named fragment with the session counter, then advance it.
    Template(TemplateName),
    /// Reply with fixed markup. The counter is not touched.
    Literal(String),
}

/// Immutable command → action table. Matching is exact and case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct CommandTable {
    entries: HashMap<String, CommandAction>,
}

impl CommandTable {
    /// Start building a table.
    pub fn builder() -> CommandTableBuilder {
        CommandTableBuilder::default()
    }

    /// Action for `command`, if any.
    pub fn get(&self, command: &str) -> Option<&CommandAction> {
        self.entries.get(command)
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no commands.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command tokens, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builder for [`CommandTable`]. Registering a command twice keeps the last action.
#[derive(Debug, Default)]
pub struct CommandTableBuilder {
    entries: HashMap<String, CommandAction>,
}

impl CommandTableBuilder {
    /// Map `command` to a template render.
    #[must_use]
    pub fn template(self, command: impl Into<String>, name: impl Into<TemplateName>) -> Self {
        self.action(command, CommandAction::Template(name.into()))
    }

    /// Map `command` to a fixed reply.
    #[must_use]
    pub fn literal(self, command: impl Into<String>, markup: impl Into<String>) -> Self {
        self.action(command, CommandAction::Literal(markup.into()))
    }

    /// Map `command` to `action`.
    #[must_use]
    pub fn action(mut self, command: impl Into<String>, action: CommandAction) -> Self {
        let _ = self.entries.insert(command.into(), action);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> CommandTable {
        CommandTable {
            entries: self.entries,
        }
    }
}
