//! `/system` accessors: identity, note, clock, health, history, NTP and
//! the hardware descriptors.
//!
//! Every read issues fresh queries; nothing here is cached except the
//! identity, which lives on the [`Session`].

use chrono::{NaiveDate, NaiveTime};
use log::debug;

use crate::codec;
use crate::driver::Session;
use crate::error::{ParseError, Result};
use crate::model::{License, NtpClientConfig, NtpMode, NtpServerConfig, Resources, Routerboard};
use crate::transport::{SshTransport, Transport};
use crate::validate::{validate_ip_address, validate_ntp_mode};

/// Borrowed view of a session exposing the `/system` menu.
///
/// Obtained from [`Router::system`](crate::Router::system).
pub struct System<'a, T: Transport = SshTransport> {
    session: &'a mut Session<T>,
}

impl<'a, T: Transport> System<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>) -> Self {
        Self { session }
    }

    // Clock

    /// Router-local time of day.
    pub async fn clock_time_get(&mut self) -> Result<NaiveTime> {
        let text = self.session.query_string("/system clock get time").await?;
        Ok(codec::parse_time(&text)?)
    }

    /// Router-local calendar date.
    pub async fn clock_date_get(&mut self) -> Result<NaiveDate> {
        let text = self.session.query_string("/system clock get date").await?;
        Ok(codec::parse_date(&text)?)
    }

    /// Time zone name, e.g. `America/Cuiaba`.
    pub async fn clock_time_zone_get(&mut self) -> Result<String> {
        self.session.query_string("/system clock get time-zone-name").await
    }

    /// Signed UTC offset, e.g. `-04:00`.
    pub async fn clock_gmt_offset_get(&mut self) -> Result<String> {
        self.session
            .query_string("/system clock get gmt-offset as-string")
            .await
    }

    pub async fn clock_dst_active_get(&mut self) -> Result<bool> {
        self.session.query_bool("/system clock get dst-active").await
    }

    pub async fn clock_time_zone_autodetect_get(&mut self) -> Result<bool> {
        self.session
            .query_bool("/system clock get time-zone-autodetect")
            .await
    }

    // Health

    /// Supply voltage in volts (sensor 0).
    pub async fn health_voltage(&mut self) -> Result<f64> {
        self.session
            .query_float("/system health get number=0 value")
            .await
    }

    /// Board temperature in Celsius (sensor 1).
    pub async fn health_temperature(&mut self) -> Result<f64> {
        self.session
            .query_float("/system health get number=1 value")
            .await
    }

    /// The undoable change log, as printed.
    pub async fn history_system_get(&mut self) -> Result<String> {
        Ok(self.session.execute("/system history print").await?.result)
    }

    // Identity

    /// Read the identity from the router (not the cached copy).
    pub async fn identity_get(&mut self) -> Result<String> {
        self.session.query_string("/system identity get name").await
    }

    /// Read the identity through `/system identity print`.
    pub async fn identity_print(&mut self) -> Result<String> {
        let command = "/system identity print";
        let response = self.session.execute(command).await?;

        response
            .lines()
            .find_map(|line| line.trim().strip_prefix("name:"))
            .map(|name| name.trim().to_string())
            .ok_or_else(|| {
                ParseError::UnexpectedOutput {
                    command: command.to_string(),
                    output: response.result.clone(),
                }
                .into()
            })
    }

    /// Rename the router.
    ///
    /// Surrounding whitespace is stripped. The session's cached identity and
    /// prompt anchor follow the new name once the router accepts it.
    pub async fn identity_set(&mut self, identity: &str) -> Result<()> {
        let identity = identity.trim();
        self.session
            .execute(&format!("/system identity set name={identity}"))
            .await?;
        self.session.update_prompt_anchor(identity)?;
        debug!("identity is now {}", identity);
        Ok(())
    }

    // Note

    pub async fn note_get(&mut self) -> Result<String> {
        self.session.query_string("/system note get note").await
    }

    /// Set the login note.
    ///
    /// Double quotes inside `note` are not escaped and will break the
    /// command.
    pub async fn note_set(&mut self, note: &str, show_at_login: bool) -> Result<()> {
        self.session
            .execute(&format!(
                "/system note set note=\"{note}\" show-at-login={}",
                codec::yes_no(show_at_login)
            ))
            .await?;
        Ok(())
    }

    // NTP

    /// Snapshot of the NTP client settings and sync state.
    pub async fn ntp_client_get(&mut self) -> Result<NtpClientConfig> {
        const PREFIX: &str = "/system ntp client get";

        let enabled = self.session.query_bool(&format!("{PREFIX} enabled")).await?;

        let mode_command = format!("{PREFIX} mode");
        let mode_text = self.session.query_string(&mode_command).await?;
        let mode: NtpMode = mode_text.parse().map_err(|_| ParseError::UnexpectedOutput {
            command: mode_command,
            output: mode_text.clone(),
        })?;

        let servers = self.session.query_ip_list(&format!("{PREFIX} servers")).await?;
        let vrf = self.session.query_string(&format!("{PREFIX} vrf")).await?;
        let freq_drift =
            codec::parse_measurement(&self.session.query_string(&format!("{PREFIX} freq-drift")).await?)?;
        let status = self.session.query_string(&format!("{PREFIX} status")).await?;
        let synced_server = codec::parse_optional_ip(
            &self.session.query_string(&format!("{PREFIX} synced-server")).await?,
        )?;
        let synced_stratum = self.session.query_int(&format!("{PREFIX} synced-stratum")).await?;
        let system_offset = codec::parse_measurement(
            &self.session.query_string(&format!("{PREFIX} system-offset")).await?,
        )?;

        Ok(NtpClientConfig {
            enabled,
            mode,
            servers,
            vrf,
            freq_drift,
            status,
            synced_server,
            synced_stratum,
            system_offset,
        })
    }

    /// Configure the NTP client.
    ///
    /// Every server address and the mode are validated first; if any is
    /// rejected nothing is sent. Mode and VRF are lowercased.
    pub async fn ntp_client_set(
        &mut self,
        servers: &[&str],
        enabled: bool,
        mode: &str,
        vrf: &str,
    ) -> Result<()> {
        let servers = servers
            .iter()
            .map(|server| validate_ip_address(server))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mode = validate_ntp_mode(&mode.trim().to_lowercase())?;
        let vrf = vrf.trim().to_lowercase();

        self.session
            .execute(&format!(
                "/system ntp client set enabled={} mode={} servers={} vrf={}",
                codec::yes_no(enabled),
                mode,
                servers.join(","),
                vrf
            ))
            .await?;
        Ok(())
    }

    /// Snapshot of the NTP server settings.
    pub async fn ntp_server_get(&mut self) -> Result<NtpServerConfig> {
        const PREFIX: &str = "/system ntp server get";

        Ok(NtpServerConfig {
            enabled: self.session.query_bool(&format!("{PREFIX} enabled")).await?,
            broadcast: self.session.query_bool(&format!("{PREFIX} broadcast")).await?,
            multicast: self.session.query_bool(&format!("{PREFIX} multicast")).await?,
            manycast: self.session.query_bool(&format!("{PREFIX} manycast")).await?,
            broadcast_address: codec::parse_optional_ip(
                &self
                    .session
                    .query_string(&format!("{PREFIX} broadcast-address"))
                    .await?,
            )?,
            vrf: self.session.query_string(&format!("{PREFIX} vrf")).await?,
        })
    }

    // Hardware

    /// Whether the target is RouterBOARD hardware rather than CHR/x86.
    pub async fn is_routerboard(&mut self) -> Result<bool> {
        self.session
            .query_bool("/system routerboard get routerboard")
            .await
    }

    pub async fn routerboard_get(&mut self) -> Result<Routerboard> {
        const PREFIX: &str = "/system routerboard get";

        Ok(Routerboard {
            model: self.session.query_string(&format!("{PREFIX} model")).await?,
            revision: self.session.query_string(&format!("{PREFIX} revision")).await?,
            serial_number: self.session.query_string(&format!("{PREFIX} serial-number")).await?,
            firmware_type: self.session.query_string(&format!("{PREFIX} firmware-type")).await?,
            factory_firmware: self
                .session
                .query_string(&format!("{PREFIX} factory-firmware"))
                .await?,
            current_firmware: self
                .session
                .query_string(&format!("{PREFIX} current-firmware"))
                .await?,
            upgrade_firmware: self
                .session
                .query_string(&format!("{PREFIX} upgrade-firmware"))
                .await?,
        })
    }

    pub async fn license_get(&mut self) -> Result<License> {
        const PREFIX: &str = "/system license get";

        Ok(License {
            software_id: self.session.query_string(&format!("{PREFIX} software-id")).await?,
            level: self.session.query_int(&format!("{PREFIX} nlevel")).await?,
            features: self.session.query_string(&format!("{PREFIX} features")).await?,
        })
    }

    pub async fn resources_get(&mut self) -> Result<Resources> {
        const PREFIX: &str = "/system resource get";

        Ok(Resources {
            cpu: self.session.query_string(&format!("{PREFIX} cpu")).await?,
            cpu_frequency: self.session.query_int(&format!("{PREFIX} cpu-frequency")).await?,
            memory: self.session.query_int(&format!("{PREFIX} total-memory")).await?,
            storage: self.session.query_int(&format!("{PREFIX} total-hdd-space")).await?,
            architecture: self
                .session
                .query_string(&format!("{PREFIX} architecture-name"))
                .await?,
            board_name: self.session.query_string(&format!("{PREFIX} board-name")).await?,
            version: self.session.query_string(&format!("{PREFIX} version")).await?,
        })
    }
}
