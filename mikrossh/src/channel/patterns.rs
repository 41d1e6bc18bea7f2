//! Prompt detection.
//!
//! RouterOS prompts look like `[admin@MikroTik] > ` or, inside a menu,
//! `[admin@MikroTik] /system> `. The identity segment is matched as a
//! wildcard so a renamed router never stalls the session.

use regex::bytes::Regex;

/// Trait for prompt matching - regex by default, extensible for custom parsers.
pub trait PromptMatcher: Send + Sync {
    /// Returns byte offset where match ends, or None if no match.
    fn find_match(&self, data: &[u8]) -> Option<usize>;

    /// Check if the data matches the pattern.
    fn is_match(&self, data: &[u8]) -> bool {
        self.find_match(data).is_some()
    }
}

/// Regex-based prompt matcher (the default implementation).
impl PromptMatcher for Regex {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        self.find(data).map(|m| m.end())
    }
}

/// The session's expected prompt, derived from the login user and the
/// router identity.
#[derive(Debug, Clone)]
pub struct PromptPattern {
    username: String,

    /// Identity the router displayed when the pattern was last derived.
    anchor: String,

    pattern: Regex,
}

impl PromptPattern {
    /// Derive the prompt pattern for `username` on a router called `identity`.
    pub fn new(username: &str, identity: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            username: username.to_string(),
            anchor: identity.to_string(),
            pattern: Self::derive(username)?,
        })
    }

    /// Re-derive the pattern after the router identity changed.
    ///
    /// The only caller is the identity setter; the username never changes
    /// for the lifetime of a session.
    pub fn update_anchor(&mut self, identity: &str) -> Result<(), regex::Error> {
        self.pattern = Self::derive(&self.username)?;
        self.anchor = identity.to_string();
        Ok(())
    }

    /// `\[<user>@[^\]]+\]`, then an optional menu path, then `>` at the end.
    fn derive(username: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            r"\[{}@[^\]]+\][^\r\n\]]*>\s*$",
            regex::escape(username)
        ))
    }

    /// The identity currently anchoring the pattern.
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// The prompt text the router is expected to show, e.g. `[admin@MikroTik]`.
    pub fn expected(&self) -> String {
        format!("[{}@{}]", self.username, self.anchor)
    }

    /// Get a reference to the underlying regex.
    pub fn regex(&self) -> &Regex {
        &self.pattern
    }
}

impl PromptMatcher for PromptPattern {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        self.pattern.find_match(data)
    }
}
