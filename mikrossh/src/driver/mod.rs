//! Session driver.
//!
//! The driver layer owns the interactive console: it writes commands,
//! waits for the RouterOS prompt and turns what came back into a
//! [`Response`].

mod builder;
pub(crate) mod response;
mod session;

pub use builder::RouterBuilder;
pub use response::Response;
pub use session::Session;
