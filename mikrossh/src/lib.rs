//! # mikrossh
//!
//! Async MikroTik RouterOS automation over the SSH console.
//!
//! mikrossh drives the interactive RouterOS CLI the way a person would:
//! it writes a command, waits for the `[user@identity] >` prompt and
//! parses what came back into typed values.
//!
//! ## Features
//!
//! - Async SSH connections via russh, with known_hosts verification
//! - Prompt detection that survives identity changes
//! - Typed accessors for identity, note, clock, health, NTP and IP services
//! - RouterOS error markers surfaced as errors instead of empty values
//! - Input validation before any mutating command is sent
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mikrossh::RouterBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mikrossh::Error> {
//!     let mut router = RouterBuilder::new("192.168.88.1")
//!         .username("admin")
//!         .password("secret")
//!         .connect()
//!         .await?;
//!
//!     println!("{}", router);
//!     println!("{}", router.cmd("/system identity print").await?);
//!
//!     let ntp = router.system().ntp_client_get().await?;
//!     println!("NTP status: {}", ntp.status);
//!
//!     router.ip().port_set("api", 8730).await?;
//!
//!     router.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod channel;
pub mod codec;
pub mod driver;
pub mod error;
pub mod ip;
pub mod model;
pub mod router;
pub mod system;
pub mod transport;
pub mod validate;

// Re-export main types for convenience
pub use address::{AddressClass, AddressType, IpAddress};
pub use driver::{Response, RouterBuilder, Session};
pub use error::{Error, Result};
pub use ip::{Ip, ServiceTable};
pub use model::{
    IpService, License, NtpClientConfig, NtpMode, NtpServerConfig, Resources, Routerboard,
    ServiceName,
};
pub use router::Router;
pub use system::System;
pub use transport::{AuthMethod, HostKeyVerification, SshConfig, SshTransport, Transport};
