//! Error types for mikrossh.

use std::io;
use thiserror::Error;

/// Main error type for mikrossh operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session driver errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Router output could not be turned into a typed value
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Caller-supplied value rejected before anything was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts (strict verification)
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Failed to request shell
    #[error("Failed to request shell")]
    ShellRequestFailed,

    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(std::time::Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session driver errors (command execution, configuration).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Session not connected, or already disconnected
    #[error("Session not connected")]
    NotConnected,

    /// The router answered with one of its failure markers
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Invalid configuration in the router builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Errors turning router text into typed values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Undefined boolean value: {0}")]
    InvalidBooleanLiteral(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid {kind}: {value}")]
    InvalidNumber { kind: &'static str, value: String },

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Output did not have the shape the command is known to produce
    #[error("Unexpected output from '{command}': {output}")]
    UnexpectedOutput { command: String, output: String },
}

/// Caller input rejected before any command reaches the router.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(i64),

    #[error("Invalid mode: {0}")]
    InvalidNtpMode(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),
}

/// Result type alias using mikrossh's Error.
pub type Result<T> = std::result::Result<T, Error>;
