//! A connected RouterOS device.

use std::fmt;

use log::{debug, info};

use crate::driver::Session;
use crate::error::Result;
use crate::ip::{Ip, ServiceTable};
use crate::model::{IpService, License, Resources, Routerboard, ServiceName};
use crate::system::System;
use crate::transport::{SshConfig, SshTransport, Transport};

/// A router: one [`Session`] plus what was learned about the device when
/// it connected.
///
/// The `/system` and `/ip` accessors are borrowed views over the session,
/// see [`Router::system`] and [`Router::ip`].
pub struct Router<T: Transport = SshTransport> {
    session: Session<T>,
    routerboard: Option<Routerboard>,
    license: Option<License>,
    resources: Resources,
    services: ServiceTable,
}

impl Router<SshTransport> {
    /// Connect over SSH and load the device snapshot.
    ///
    /// Most callers want [`RouterBuilder`](crate::RouterBuilder).
    pub async fn connect(config: &SshConfig, delay_factor: f64) -> Result<Self> {
        let session = Session::connect(config, delay_factor).await?;
        Self::from_session(session).await
    }
}

impl<T: Transport> Router<T> {
    /// Wrap an open session, reading hardware, license, resources and
    /// services.
    ///
    /// On failure the session is disconnected before the error is returned.
    pub async fn from_session(mut session: Session<T>) -> Result<Self> {
        match Self::load(&mut session).await {
            Ok((routerboard, license, resources, services)) => {
                let router = Self {
                    session,
                    routerboard,
                    license,
                    resources,
                    services,
                };
                info!("connected to {}", router);
                Ok(router)
            }
            Err(e) => {
                if let Err(close_err) = session.disconnect().await {
                    debug!("disconnect after failed load: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn load(
        session: &mut Session<T>,
    ) -> Result<(Option<Routerboard>, Option<License>, Resources, ServiceTable)> {
        let mut system = System::new(session);

        let (routerboard, license) = if system.is_routerboard().await? {
            (
                Some(system.routerboard_get().await?),
                Some(system.license_get().await?),
            )
        } else {
            (None, None)
        };
        let resources = system.resources_get().await?;
        let services = Ip::load_services(session).await?;

        Ok((routerboard, license, resources, services))
    }

    /// `/system` accessors.
    pub fn system(&mut self) -> System<'_, T> {
        System::new(&mut self.session)
    }

    /// `/ip service` accessors.
    pub fn ip(&mut self) -> Ip<'_, T> {
        Ip::new(&mut self.session, &mut self.services)
    }

    /// Run a raw command and return its output.
    ///
    /// Output is returned as-is, even when the router reports an error.
    pub async fn cmd(&mut self, command: &str) -> Result<String> {
        Ok(self.session.run_command(command).await?.result)
    }

    /// Run several raw commands and return the combined transcript.
    pub async fn cmd_multiline(&mut self, commands: &[&str]) -> Result<String> {
        self.session.run_multiple(commands).await
    }

    /// Cached identity.
    pub fn identity(&self) -> &str {
        self.session.identity()
    }

    pub fn host(&self) -> &str {
        self.session.host()
    }

    /// RouterBOARD details; `None` on CHR and x86.
    pub fn routerboard(&self) -> Option<&Routerboard> {
        self.routerboard.as_ref()
    }

    /// License details; `None` on CHR and x86.
    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Cached `/ip service` entry.
    pub fn service(&self, name: ServiceName) -> Option<&IpService> {
        self.services.get(&name)
    }

    pub fn services(&self) -> &ServiceTable {
        &self.services
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Close the console. Call once.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.session.disconnect().await
    }
}

impl<T: Transport> fmt::Display for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) on {} ({})",
            self.identity(),
            self.host(),
            self.resources.board_name,
            self.resources.architecture
        )
    }
}
