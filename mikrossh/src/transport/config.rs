//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Console flags appended to the login name: no colours (`c`), dumb
/// terminal (`e`), no capability probing (`t`), and a wide terminal so
/// long values are never wrapped.
pub const DEFAULT_CONSOLE_FLAGS: &str = "cet511w4098h";

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connect timeout, also used as the prompt wait for each command.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// RouterOS console flags appended as `user+flags`. Empty disables.
    pub console_flags: String,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The name sent during authentication.
    pub fn login_name(&self) -> String {
        if self.console_flags.is_empty() {
            self.username.clone()
        } else {
            format!("{}+{}", self.username, self.console_flags)
        }
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(flags: &str) -> SshConfig {
        SshConfig {
            host: "192.168.88.1".to_string(),
            port: 2222,
            username: "admin".to_string(),
            auth: AuthMethod::Password(SecretString::from("hunter2")),
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            console_flags: flags.to_string(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    #[test]
    fn test_login_name_with_flags() {
        assert_eq!(config(DEFAULT_CONSOLE_FLAGS).login_name(), "admin+cet511w4098h");
        assert_eq!(config("").login_name(), "admin");
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(config("").socket_addr(), "192.168.88.1:2222");
    }

    #[test]
    fn test_password_not_in_debug() {
        let rendered = format!("{:?}", config(""));
        assert!(!rendered.contains("hunter2"));
    }
}
