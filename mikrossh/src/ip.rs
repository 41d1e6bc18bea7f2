//! `/ip service` accessors.

use indexmap::IndexMap;
use log::debug;

use crate::codec;
use crate::driver::Session;
use crate::error::Result;
use crate::model::{IpService, ServiceName};
use crate::transport::{SshTransport, Transport};
use crate::validate::validate_port;

/// Cached `/ip service` entries, in the router's listing order.
pub type ServiceTable = IndexMap<ServiceName, IpService>;

/// Borrowed view of a session and the service cache.
///
/// Obtained from [`Router::ip`](crate::Router::ip).
pub struct Ip<'a, T: Transport = SshTransport> {
    session: &'a mut Session<T>,
    services: &'a mut ServiceTable,
}

impl<'a, T: Transport> Ip<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>, services: &'a mut ServiceTable) -> Self {
        Self { session, services }
    }

    /// Read every well-known service from the router.
    pub(crate) async fn load_services(session: &mut Session<T>) -> Result<ServiceTable> {
        let mut services = ServiceTable::with_capacity(ServiceName::ALL.len());
        for name in ServiceName::ALL {
            services.insert(name, read_service(session, name).await?);
        }
        Ok(services)
    }

    /// Cached entry for `name`.
    pub fn service(&self, name: ServiceName) -> Option<&IpService> {
        self.services.get(&name)
    }

    pub fn services(&self) -> &ServiceTable {
        &*self.services
    }

    /// Read one service from the router without touching the cache.
    pub async fn service_get(&mut self, name: ServiceName) -> Result<IpService> {
        read_service(self.session, name).await
    }

    /// Re-read one service and replace its cached entry.
    pub async fn service_refresh(&mut self, name: ServiceName) -> Result<&IpService> {
        let service = read_service(self.session, name).await?;
        self.services.insert(name, service);
        Ok(&self.services[&name])
    }

    /// Move `service_name` to `port`.
    ///
    /// The name and port are checked before anything is sent. The cached
    /// port changes only after the router accepts the command.
    pub async fn port_set(&mut self, service_name: &str, port: i64) -> Result<()> {
        let name: ServiceName = service_name.parse()?;
        let port = validate_port(port)?;

        self.session
            .execute(&format!("/ip service set {name} port={port}"))
            .await?;

        if let Some(service) = self.services.get_mut(&name) {
            service.port = port;
        }
        debug!("{} now listens on {}", name, port);
        Ok(())
    }
}

async fn read_service<T: Transport>(session: &mut Session<T>, name: ServiceName) -> Result<IpService> {
    let prefix = format!("/ip service get {name}");

    let port = codec::parse_port(&session.query_string(&format!("{prefix} port")).await?)?;
    let disabled = session.query_bool(&format!("{prefix} disabled")).await?;
    let available_from = codec::parse_list(&session.query_string(&format!("{prefix} address")).await?);

    Ok(IpService {
        port,
        disabled,
        available_from,
    })
}
