//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::Transport;
use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::channel::{PromptMatcher, PtyChannel};
use crate::error::{ChannelError, Result, TransportError};

/// Bytes from the end of the output searched for the prompt.
const SEARCH_DEPTH: usize = 1000;

/// SSH transport wrapping a russh client and one interactive shell.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// The interactive console.
    channel: PtyChannel,
}

impl SshTransport {
    /// Connect to the SSH server, authenticate and start a shell.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("connecting to {}", config.socket_addr());
        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // check_server_key may have left a more specific reason behind
            let detailed = host_key_error.lock().ok().and_then(|mut slot| slot.take());
            match (detailed, e) {
                (Some(hk_err), _) => hk_err,
                (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                    host: config.host.clone(),
                    port: config.port,
                    source,
                },
                (None, e) => TransportError::Ssh(e),
            }
        })?;

        Self::authenticate(&mut session, config).await?;
        debug!("authenticated as {}", config.username);

        let channel = session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "dumb",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(|_| ChannelError::PtyOpenFailed)?;

        channel
            .request_shell(true)
            .await
            .map_err(|_| ChannelError::ShellRequestFailed)?;

        Ok(Self {
            session,
            channel: PtyChannel::new(channel, SEARCH_DEPTH, config.timeout),
        })
    }

    /// Log in as `user+flags` with the configured credentials.
    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let login = config.login_name();
        let outcome = match &config.auth {
            AuthMethod::Password(password) => {
                session
                    .authenticate_password(&login, password.expose_secret())
                    .await
            }
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(format!("{}: {}", path.display(), e)))?;
                // None unless the key is RSA
                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(TransportError::Ssh)?
                    .flatten();
                session
                    .authenticate_publickey(&login, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                    .await
            }
        };

        if outcome.map_err(TransportError::Ssh)?.success() {
            Ok(())
        } else {
            Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into())
        }
    }
}

impl Transport for SshTransport {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.channel.clear_buffer();
        self.channel.send(line).await
    }

    async fn read_until(&mut self, prompt: &dyn PromptMatcher) -> Result<String> {
        let data = self.channel.read_until_pattern(prompt).await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    async fn close(self) -> Result<()> {
        if let Err(e) = self.channel.close().await {
            debug!("closing console channel: {}", e);
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Host key policy for one connection attempt.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,

    /// Why the key was refused; russh itself only reports `UnknownKey`.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Whether known_hosts already lists `key` for this host.
    ///
    /// A different key on record is [`TransportError::HostKeyChanged`].
    fn is_known(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let lookup = match &self.known_hosts_path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        lookup.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) {
        let saved = match &self.known_hosts_path {
            Some(path) => russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        match saved {
            Ok(()) => debug!("learned host key for {}:{}", self.host, self.port),
            Err(e) => warn!("could not record host key for {}: {}", self.host, e),
        }
    }

    fn verify(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let known = match self.host_key_verification {
            HostKeyVerification::Disabled => return Ok(()),
            HostKeyVerification::AcceptNew | HostKeyVerification::Strict => self.is_known(key)?,
        };
        match (known, &self.host_key_verification) {
            (true, _) => Ok(()),
            (false, HostKeyVerification::Strict) => Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
            (false, _) => {
                self.remember(key);
                Ok(())
            }
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.verify(server_public_key) {
            Ok(()) => Ok(true),
            Err(reason) => {
                if let Ok(mut slot) = self.host_key_error.lock() {
                    *slot = Some(reason);
                }
                Ok(false)
            }
        }
    }
}
