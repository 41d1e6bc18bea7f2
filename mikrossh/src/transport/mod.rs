//! Remote shell transport.
//!
//! [`Transport`] is the contract the session driver needs from an
//! interactive shell: write a line, read until a prompt, close.
//! [`SshTransport`] implements it on top of russh.

pub mod config;
mod ssh;
#[cfg(test)]
pub(crate) mod testing;

pub use config::{AuthMethod, DEFAULT_CONSOLE_FLAGS, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;

use std::future::Future;

use crate::channel::PromptMatcher;
use crate::error::Result;

/// An interactive shell that can be driven line by line.
pub trait Transport: Send {
    /// Write one line (the transport adds the line terminator).
    fn write_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;

    /// Read until `prompt` matches the tail of the output.
    ///
    /// Returns everything read, including the prompt itself.
    fn read_until(
        &mut self,
        prompt: &dyn PromptMatcher,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Close the shell and the underlying connection.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;

    /// Send a command and read its output up to the prompt.
    fn send_command(
        &mut self,
        command: &str,
        prompt: &dyn PromptMatcher,
    ) -> impl Future<Output = Result<String>> + Send {
        async move {
            self.write_line(command).await?;
            self.read_until(prompt).await
        }
    }

    /// Send several commands through one exchange.
    ///
    /// Output blocks are concatenated in input order.
    fn send_batch(
        &mut self,
        commands: &[&str],
        prompt: &dyn PromptMatcher,
    ) -> impl Future<Output = Result<String>> + Send {
        async move {
            let mut transcript = String::new();
            for command in commands {
                transcript.push_str(&self.send_command(command, prompt).await?);
            }
            Ok(transcript)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use crate::channel::PromptPattern;

    #[test]
    fn test_send_batch_concatenates_in_order() {
        let mut transport = ScriptedTransport::new("admin", "r1")
            .reply("/system identity print", "name: r1")
            .reply("/system note print", "note: hello");
        let journal = transport.journal();
        let prompt = PromptPattern::new("admin", "r1").unwrap();

        let transcript = tokio_test::block_on(async {
            transport.read_until(&prompt).await.unwrap();
            transport
                .send_batch(&["/system identity print", "/system note print"], &prompt)
                .await
                .unwrap()
        });

        assert_eq!(
            transcript,
            "/system identity print\r\nname: r1\r\n[admin@r1] > \
             /system note print\r\nnote: hello\r\n[admin@r1] > "
        );
        assert_eq!(
            journal.commands(),
            vec!["/system identity print", "/system note print"]
        );
    }

    #[test]
    fn test_read_without_pending_output_is_closed() {
        let mut transport = ScriptedTransport::new("admin", "r1");
        let prompt = PromptPattern::new("admin", "r1").unwrap();

        tokio_test::block_on(async {
            transport.read_until(&prompt).await.unwrap();
            let err = transport.read_until(&prompt).await.unwrap_err();
            assert!(matches!(err, crate::Error::Channel(crate::error::ChannelError::Closed)));
        });
    }
}
