//! Scripted transport for exercising the driver without a router.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::Transport;
use crate::channel::PromptMatcher;
use crate::error::{ChannelError, Result};

/// Shared view of what a [`ScriptedTransport`] was asked to do.
#[derive(Debug, Default, Clone)]
pub(crate) struct Journal {
    inner: Arc<Mutex<JournalInner>>,
}

#[derive(Debug, Default)]
struct JournalInner {
    commands: Vec<String>,
    closed: usize,
}

impl Journal {
    /// Every line written, in order.
    pub(crate) fn commands(&self) -> Vec<String> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub(crate) fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }
}

/// Answers commands from a script, wrapping each reply the way the
/// RouterOS console would: command echo first, prompt last.
///
/// Unless scripted otherwise, identity reads answer with the current
/// identity, which follows `/system identity set`.
pub(crate) struct ScriptedTransport {
    username: String,
    identity: String,

    /// Replies keyed by exact command text; reused on every call.
    replies: HashMap<String, String>,

    /// Replies consumed in order, ahead of the keyed ones.
    queue: VecDeque<String>,

    /// Output the router prints before its first prompt.
    banner: Option<String>,

    pending: Option<String>,
    journal: Journal,
}

impl ScriptedTransport {
    pub(crate) fn new(username: &str, identity: &str) -> Self {
        Self {
            username: username.to_string(),
            identity: identity.to_string(),
            replies: HashMap::new(),
            queue: VecDeque::new(),
            banner: Some(String::new()),
            pending: None,
            journal: Journal::default(),
        }
    }

    /// Reply `output` whenever `command` is written.
    pub(crate) fn reply(mut self, command: &str, output: &str) -> Self {
        self.replies.insert(command.to_string(), output.to_string());
        self
    }

    /// Reply to `return [<expr>]`.
    pub(crate) fn scalar(self, expr: &str, value: &str) -> Self {
        self.reply(&format!("return [{expr}]"), value)
    }

    /// Reply with `output` to the next command, whatever it is.
    pub(crate) fn then(mut self, output: &str) -> Self {
        self.queue.push_back(output.to_string());
        self
    }

    /// Change the identity shown in subsequent prompts.
    pub(crate) fn rename(&mut self, identity: &str) {
        self.identity = identity.to_string();
    }

    pub(crate) fn journal(&self) -> Journal {
        self.journal.clone()
    }

    fn identity_reply(&self, line: &str) -> Option<String> {
        match line {
            "/system identity print" => Some(format!("  name: {}", self.identity)),
            "return [/system identity get name]" => Some(self.identity.clone()),
            _ => None,
        }
    }

    fn prompt(&self) -> String {
        format!("[{}@{}] > ", self.username, self.identity)
    }
}

impl Transport for ScriptedTransport {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.journal
            .inner
            .lock()
            .unwrap()
            .commands
            .push(line.to_string());

        if let Some(identity) = line.strip_prefix("/system identity set name=") {
            self.rename(identity);
        }

        let output = self
            .queue
            .pop_front()
            .or_else(|| self.replies.get(line).cloned())
            .or_else(|| self.identity_reply(line))
            .unwrap_or_default();

        let mut text = format!("{line}\r\n");
        if !output.is_empty() {
            text.push_str(&output.replace('\n', "\r\n"));
            text.push_str("\r\n");
        }
        self.pending = Some(text);
        Ok(())
    }

    async fn read_until(&mut self, prompt: &dyn PromptMatcher) -> Result<String> {
        let mut text = match (self.pending.take(), self.banner.take()) {
            (Some(text), _) => text,
            (None, Some(banner)) => banner,
            (None, None) => return Err(ChannelError::Closed.into()),
        };
        text.push_str(&self.prompt());

        if !prompt.is_match(text.as_bytes()) {
            return Err(ChannelError::PatternTimeout(std::time::Duration::ZERO).into());
        }
        Ok(text)
    }

    async fn close(self) -> Result<()> {
        self.journal.inner.lock().unwrap().closed += 1;
        Ok(())
    }
}
