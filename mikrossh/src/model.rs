//! Typed records returned by the accessor layer.
//!
//! Every read accessor returns one of these instead of a loosely-typed map.
//! NTP snapshots are never cached; the hardware descriptors and the IP
//! service table are captured once at connect time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::IpAddress;
use crate::error::ValidationError;

/// NTP client operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NtpMode {
    Unicast,
    Broadcast,
    Multicast,
    Manycast,
}

impl NtpMode {
    /// All modes the router accepts.
    pub const ALL: [NtpMode; 4] = [
        NtpMode::Unicast,
        NtpMode::Broadcast,
        NtpMode::Multicast,
        NtpMode::Manycast,
    ];

    /// The router's spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            NtpMode::Unicast => "unicast",
            NtpMode::Broadcast => "broadcast",
            NtpMode::Multicast => "multicast",
            NtpMode::Manycast => "manycast",
        }
    }
}

impl FromStr for NtpMode {
    type Err = ValidationError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        NtpMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or(ValidationError::InvalidNtpMode(normalized))
    }
}

impl fmt::Display for NtpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of `/system ntp client`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NtpClientConfig {
    pub enabled: bool,
    pub mode: NtpMode,
    pub servers: Vec<IpAddress>,
    pub vrf: String,

    /// Frequency drift in PPM.
    pub freq_drift: f64,

    /// Free-form sync status (`synchronized`, `waiting`, ...).
    pub status: String,

    /// `None` until the client has synchronised with a server.
    pub synced_server: Option<IpAddress>,
    pub synced_stratum: i64,

    /// Offset from the synced server, in milliseconds.
    pub system_offset: f64,
}

/// Snapshot of `/system ntp server`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtpServerConfig {
    pub enabled: bool,
    pub broadcast: bool,
    pub multicast: bool,
    pub manycast: bool,
    pub broadcast_address: Option<IpAddress>,
    pub vrf: String,
}

/// The well-known services under `/ip service`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceName {
    Api,
    ApiSsl,
    Ftp,
    Ssh,
    Telnet,
    Winbox,
    Www,
    WwwSsl,
}

impl ServiceName {
    /// Every service, in the order the router lists them.
    pub const ALL: [ServiceName; 8] = [
        ServiceName::Api,
        ServiceName::ApiSsl,
        ServiceName::Ftp,
        ServiceName::Ssh,
        ServiceName::Telnet,
        ServiceName::Winbox,
        ServiceName::Www,
        ServiceName::WwwSsl,
    ];

    /// The router's spelling of the service name.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceName::Api => "api",
            ServiceName::ApiSsl => "api-ssl",
            ServiceName::Ftp => "ftp",
            ServiceName::Ssh => "ssh",
            ServiceName::Telnet => "telnet",
            ServiceName::Winbox => "winbox",
            ServiceName::Www => "www",
            ServiceName::WwwSsl => "www-ssl",
        }
    }
}

impl FromStr for ServiceName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownService(s.to_string()))
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One `/ip service` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpService {
    pub port: u16,
    pub disabled: bool,

    /// Address restriction; empty means reachable from anywhere.
    pub available_from: Vec<String>,
}

/// `/system routerboard` descriptor. Only present on RouterBOARD hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routerboard {
    pub model: String,
    pub revision: String,
    pub serial_number: String,
    pub firmware_type: String,
    pub factory_firmware: String,
    pub current_firmware: String,
    pub upgrade_firmware: String,
}

/// `/system license` descriptor. Only read on RouterBOARD hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub software_id: String,
    pub level: i64,
    pub features: String,
}

/// `/system resource` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub cpu: String,
    /// MHz.
    pub cpu_frequency: i64,
    /// Total memory in bytes.
    pub memory: i64,
    /// Total storage in bytes.
    pub storage: i64,
    pub architecture: String,
    pub board_name: String,
    pub version: String,
}
