//! Builder for connecting to a router.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::session::settle_pause;
use crate::error::{DriverError, Result};
use crate::router::Router;
use crate::transport::config::{
    AuthMethod, DEFAULT_CONSOLE_FLAGS, HostKeyVerification, SshConfig,
};
use crate::transport::SshTransport;
use crate::validate::validate_port;

/// Builder for constructing a connected [`Router`].
///
/// # Example
///
/// ```rust,no_run
/// use mikrossh::RouterBuilder;
///
/// # async fn example() -> Result<(), mikrossh::Error> {
/// let mut router = RouterBuilder::new("192.168.88.1")
///     .username("admin")
///     .password("secret")
///     .delay_factor(1.0)
///     .connect()
///     .await?;
///
/// println!("{}", router);
/// router.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RouterBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    delay_factor: f64,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    console_flags: String,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl RouterBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            delay_factor: 0.0,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            console_flags: DEFAULT_CONSOLE_FLAGS.to_string(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Password(SecretString::from(password.into())));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        });
        self
    }

    /// Slow the session down on sluggish links (default: 0).
    ///
    /// Each command waits `delay * 100ms` before reading, and the prompt
    /// wait is stretched to `timeout * max(1, delay)`.
    pub fn delay_factor(mut self, delay_factor: f64) -> Self {
        self.delay_factor = delay_factor;
        self
    }

    /// Set the connection and prompt timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Override the console flags sent as `user+flags`. Empty disables them.
    pub fn console_flags(mut self, flags: impl Into<String>) -> Self {
        self.console_flags = flags.into();
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Validate the settings and produce the transport configuration.
    ///
    /// Returns the config together with the delay factor.
    pub fn build_config(self) -> Result<(SshConfig, f64)> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        let auth = self.auth.ok_or_else(|| DriverError::InvalidConfig {
            message: "A password or private key is required".to_string(),
        })?;

        let port = validate_port(self.port.into())?;
        settle_pause(self.delay_factor)?;
        let timeout = Duration::try_from_secs_f64(
            self.timeout.as_secs_f64() * self.delay_factor.max(1.0),
        )
        .map_err(|_| DriverError::InvalidConfig {
            message: format!(
                "Timeout {:?} scaled by delay factor {} is out of range",
                self.timeout, self.delay_factor
            ),
        })?;

        let config = SshConfig {
            host: self.host,
            port,
            username,
            auth,
            timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            console_flags: self.console_flags,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok((config, self.delay_factor))
    }

    /// Connect, authenticate and load the router snapshot.
    pub async fn connect(self) -> Result<Router<SshTransport>> {
        let (config, delay_factor) = self.build_config()?;
        Router::connect(&config, delay_factor).await
    }
}
