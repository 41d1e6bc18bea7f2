//! The interactive RouterOS session.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use super::response::Response;
use crate::address::IpAddress;
use crate::channel::PromptPattern;
use crate::codec;
use crate::error::{ChannelError, DriverError, Result};
use crate::transport::{SshConfig, SshTransport, Transport};

/// Settle pause per unit of delay factor.
const SETTLE_UNIT: Duration = Duration::from_millis(100);

/// One authenticated console on a router.
///
/// Commands run strictly one at a time: each call writes a line and waits
/// for the prompt before returning. A session starts connected and moves
/// to disconnected exactly once, through [`Session::disconnect`].
pub struct Session<T: Transport = SshTransport> {
    host: String,
    username: String,
    port: u16,
    delay_factor: f64,
    settle: Duration,

    /// `None` once disconnected.
    transport: Option<T>,

    /// Prompt the console is expected to show after every command.
    prompt: PromptPattern,

    /// Router identity, as last read or set through this session.
    identity: String,
}

impl Session<SshTransport> {
    /// Open an SSH console and seed the prompt from the router identity.
    pub async fn connect(config: &SshConfig, delay_factor: f64) -> Result<Self> {
        let transport = SshTransport::connect(config).await?;
        Self::open(
            transport,
            &config.host,
            &config.username,
            config.port,
            delay_factor,
        )
        .await
    }
}

impl<T: Transport> Session<T> {
    /// Start a session on an already-authenticated transport.
    ///
    /// Waits for the first prompt, then queries the identity to anchor the
    /// prompt pattern. A delay factor that is negative, not finite or too
    /// large is rejected with [`DriverError::InvalidConfig`].
    pub async fn open(
        mut transport: T,
        host: &str,
        username: &str,
        port: u16,
        delay_factor: f64,
    ) -> Result<Self> {
        let settle = settle_pause(delay_factor)?;
        let prompt = PromptPattern::new(username, "").map_err(ChannelError::InvalidPattern)?;

        let banner = transport.read_until(&prompt).await?;
        trace!("initial output: {:?}", banner);

        let mut session = Self {
            host: host.to_string(),
            username: username.to_string(),
            port,
            delay_factor,
            settle,
            transport: Some(transport),
            prompt,
            identity: String::new(),
        };

        let identity = session
            .query_scalar("/system identity get name")
            .await?
            .unwrap_or_default();
        session.update_prompt_anchor(&identity)?;
        debug!("session open on {} ({})", session.host, session.prompt.expected());

        Ok(session)
    }

    /// Run one command and wait for the prompt.
    ///
    /// Router-side failures are flagged on the returned [`Response`], not
    /// raised.
    pub async fn run_command(&mut self, command: &str) -> Result<Response> {
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;

        let start = Instant::now();
        debug!("sending: {}", command);
        transport.write_line(command).await?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let raw = transport.read_until(&self.prompt).await?;
        let response = Response::from_raw(command, raw, &self.prompt, start.elapsed());

        if let Some(ref message) = response.failure_message {
            warn!("'{}' failed on {}: {}", command, self.host, message);
        }
        Ok(response)
    }

    /// Run a command and raise router-side failures as
    /// [`DriverError::CommandFailed`].
    pub async fn execute(&mut self, command: &str) -> Result<Response> {
        self.run_command(command).await?.into_result()
    }

    /// Send several commands in one exchange and return the combined
    /// transcript, output blocks in input order.
    pub async fn run_multiple(&mut self, commands: &[&str]) -> Result<String> {
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;

        debug!("sending {} commands", commands.len());
        let transcript = transport.send_batch(commands, &self.prompt).await?;
        Ok(transcript.replace('\r', ""))
    }

    /// Evaluate `return [<expr>]`.
    ///
    /// The router prints nothing for unset fields, so an empty reply is
    /// `None`.
    pub async fn query_scalar(&mut self, expr: &str) -> Result<Option<String>> {
        let response = self.execute(&format!("return [{expr}]")).await?;
        let value = response.result.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    /// String field; unset reads as empty.
    pub async fn query_string(&mut self, expr: &str) -> Result<String> {
        Ok(self.query_scalar(expr).await?.unwrap_or_default())
    }

    /// Integer field; unset reads as 0.
    pub async fn query_int(&mut self, expr: &str) -> Result<i64> {
        Ok(codec::parse_int(&self.query_string(expr).await?)?)
    }

    /// Float field; unset reads as 0.0.
    pub async fn query_float(&mut self, expr: &str) -> Result<f64> {
        Ok(codec::parse_float(&self.query_string(expr).await?)?)
    }

    /// Boolean field; unset reads as `false`.
    pub async fn query_bool(&mut self, expr: &str) -> Result<bool> {
        Ok(codec::parse_bool(&self.query_string(expr).await?)?.unwrap_or(false))
    }

    /// `;`-separated address list.
    pub async fn query_ip_list(&mut self, expr: &str) -> Result<Vec<IpAddress>> {
        Ok(codec::parse_ip_list(&self.query_string(expr).await?)?)
    }

    /// Point the prompt at a new identity and update the cached one.
    ///
    /// Only the identity setter (and session start) call this.
    pub(crate) fn update_prompt_anchor(&mut self, identity: &str) -> Result<()> {
        self.prompt
            .update_anchor(identity)
            .map_err(ChannelError::InvalidPattern)?;
        self.identity = identity.to_string();
        Ok(())
    }

    /// Close the console. A second call fails with
    /// [`DriverError::NotConnected`].
    pub async fn disconnect(&mut self) -> Result<()> {
        let transport = self.transport.take().ok_or(DriverError::NotConnected)?;
        debug!("disconnecting from {}", self.host);
        transport.close().await
    }

    /// Check if the session can still run commands.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Cached router identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the host this session is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn delay_factor(&self) -> f64 {
        self.delay_factor
    }

    /// The prompt pattern commands wait for.
    pub fn prompt(&self) -> &PromptPattern {
        &self.prompt
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            warn!(
                "session to {} dropped without disconnect(); the console is left open",
                self.host
            );
        }
    }
}

/// Pause after writing a command before reading its output.
pub(crate) fn settle_pause(delay_factor: f64) -> Result<Duration> {
    if delay_factor.is_finite() && delay_factor >= 0.0 {
        if let Ok(pause) = Duration::try_from_secs_f64(SETTLE_UNIT.as_secs_f64() * delay_factor) {
            return Ok(pause);
        }
    }
    Err(DriverError::InvalidConfig {
        message: format!("Invalid delay factor: {delay_factor}"),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::transport::testing::ScriptedTransport;

    async fn open(transport: ScriptedTransport) -> Session<ScriptedTransport> {
        Session::open(transport, "192.168.88.1", "admin", 22, 0.0)
            .await
            .unwrap()
    }

    fn router() -> ScriptedTransport {
        ScriptedTransport::new("admin", "MikroTik")
    }

    #[tokio::test]
    async fn test_open_seeds_identity() {
        let transport = router();
        let journal = transport.journal();
        let mut session = open(transport).await;

        assert_eq!(session.identity(), "MikroTik");
        assert_eq!(session.prompt().expected(), "[admin@MikroTik]");
        assert_eq!(journal.commands(), vec!["return [/system identity get name]"]);

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_command_normalizes_output() {
        let transport = router().reply("/system identity print", "  name: MikroTik");
        let mut session = open(transport).await;

        let response = session.run_command("/system identity print").await.unwrap();
        assert_eq!(response.result, "name: MikroTik");
        assert_eq!(response.prompt, "[admin@MikroTik] >");

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_query_scalar_empty_is_none() {
        let transport = router().scalar("/ip service get api address", "");
        let mut session = open(transport).await;

        let value = session.query_scalar("/ip service get api address").await.unwrap();
        assert_eq!(value, None);

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_query_scalar_raises_router_failure() {
        let transport = router().scalar("/system bogus get x", "bad command name bogus (line 1 column 17)");
        let mut session = open(transport).await;

        let err = session.query_scalar("/system bogus get x").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Driver(DriverError::CommandFailed { ref command, .. })
                if command == "return [/system bogus get x]"
        ));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_typed_queries() {
        let transport = router()
            .scalar("/system resource get cpu-frequency", "880")
            .scalar("/system health get number=0 value", "24.1")
            .scalar("/system clock get dst-active", "")
            .scalar("/system ntp client get servers", "200.160.7.186;201.49.148.135");
        let mut session = open(transport).await;

        assert_eq!(session.query_int("/system resource get cpu-frequency").await.unwrap(), 880);
        assert_eq!(session.query_float("/system health get number=0 value").await.unwrap(), 24.1);
        assert!(!session.query_bool("/system clock get dst-active").await.unwrap());

        let servers = session.query_ip_list("/system ntp client get servers").await.unwrap();
        assert_eq!(
            servers,
            vec![IpAddress::new([200, 160, 7, 186]), IpAddress::new([201, 49, 148, 135])]
        );

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_commands_after_disconnect_fail_fast() {
        let transport = router();
        let journal = transport.journal();
        let mut session = open(transport).await;

        session.disconnect().await.unwrap();
        assert!(!session.is_connected());
        assert_eq!(journal.closed(), 1);

        let err = session.run_command("/system identity print").await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NotConnected)));

        let err = session.disconnect().await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NotConnected)));
        assert_eq!(journal.closed(), 1);
    }

    #[tokio::test]
    async fn test_run_multiple_keeps_order() {
        let transport = router()
            .reply("/system identity print", "  name: MikroTik")
            .reply("/system note print", "  show-at-login: no\n           note: Test note");
        let mut session = open(transport).await;

        let transcript = session
            .run_multiple(&["/system identity print", "/system note print"])
            .await
            .unwrap();

        let identity_at = transcript.find("name: MikroTik").unwrap();
        let note_at = transcript.find("note: Test note").unwrap();
        assert!(identity_at < note_at);
        assert!(!transcript.contains('\r'));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_delay_factor_settles() {
        let transport = router().reply("/system note print", "note: x");
        let mut session = Session::open(transport, "r1", "admin", 22, 0.5)
            .await
            .unwrap();

        let response = session.run_command("/system note print").await.unwrap();
        assert!(response.elapsed >= Duration::from_millis(50));

        session.disconnect().await.unwrap();
    }

    #[test]
    fn test_settle_pause() {
        assert_eq!(settle_pause(0.0).unwrap(), Duration::ZERO);
        assert_eq!(settle_pause(1.0).unwrap(), Duration::from_millis(100));
        assert_eq!(settle_pause(2.5).unwrap(), Duration::from_millis(250));

        for delay in [-1.0, f64::NAN, f64::INFINITY, 1e21, f64::MAX] {
            assert!(matches!(
                settle_pause(delay),
                Err(Error::Driver(DriverError::InvalidConfig { .. }))
            ));
        }
    }

    #[tokio::test]
    async fn test_open_rejects_huge_delay() {
        let transport = router();
        let journal = transport.journal();

        let err = Session::open(transport, "r1", "admin", 22, 1e21)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Driver(DriverError::InvalidConfig { .. })));
        assert!(journal.commands().is_empty());
    }
}
