use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Handler for one host command. Receives `params` exactly as sent.
pub type CommandHandler = Rc<dyn Fn(&Value)>;

/// Command name → handler. Re-registering a name replaces its handler.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `command`, returning the handler it replaced.
    pub fn register(
        &mut self,
        command: impl Into<String>,
        handler: CommandHandler,
    ) -> Option<CommandHandler> {
        self.handlers.insert(command.into(), handler)
    }

    /// Handler for `command`, cloned so it can run without borrowing the registry.
    pub fn get(&self, command: &str) -> Option<CommandHandler> {
        self.handlers.get(command).cloned()
    }

    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

/// Wrap a handler that wants `params` decoded into `T`.
///
/// Params that do not decode are logged and the handler is skipped.
pub fn typed_handler<T, F>(command: &str, handler: F) -> CommandHandler
where
    T: DeserializeOwned + 'static,
    F: Fn(T) + 'static,
{
    let command = command.to_string();
    Rc::new(move |params: &Value| match T::deserialize(params) {
        Ok(parsed) => handler(parsed),
        Err(err) => warn!(
            command = %command,
            error = %err,
            "command params do not match the expected shape"
        ),
    })
}
