//! IPv4 address value type with class and address-type classification.
//!
//! Classification is a fixed octet-prefix table; the longest matching prefix
//! wins and anything without a match is [`AddressType::Unknown`].

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::validate::is_valid_ip_address;

/// Classful network class, derived from the first octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressClass {
    A,
    B,
    C,
    D,
    E,
}

impl AddressClass {
    fn of(first_octet: u8) -> Self {
        match first_octet {
            0..=127 => AddressClass::A,
            128..=191 => AddressClass::B,
            192..=223 => AddressClass::C,
            224..=239 => AddressClass::D,
            240..=255 => AddressClass::E,
        }
    }

    /// Addresses in a classful network of this class. `None` for D and E.
    pub fn network_size(self) -> Option<u32> {
        match self {
            AddressClass::A => Some(1 << 24),
            AddressClass::B => Some(1 << 16),
            AddressClass::C => Some(1 << 8),
            AddressClass::D | AddressClass::E => None,
        }
    }
}

impl fmt::Display for AddressClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressClass::A => "A",
            AddressClass::B => "B",
            AddressClass::C => "C",
            AddressClass::D => "D",
            AddressClass::E => "E",
        };
        f.write_str(s)
    }
}

/// Semantic address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    Current,
    Private,
    Public,
    Reserved,
    Localhost,
    ReservedIana,
    Zeroconf,
    Documentation,
    Ipv6ToIpv4,
    TestNet,
    Multicast,
    Broadcast,
    Unknown,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressType::Current => "CURRENT",
            AddressType::Private => "PRIVATE",
            AddressType::Public => "PUBLIC",
            AddressType::Reserved => "RESERVED",
            AddressType::Localhost => "LOCALHOST",
            AddressType::ReservedIana => "RESERVED (IANA)",
            AddressType::Zeroconf => "ZEROCONF",
            AddressType::Documentation => "DOCUMENTATION",
            AddressType::Ipv6ToIpv4 => "IPv6 to IPv4",
            AddressType::TestNet => "TEST-NET",
            AddressType::Multicast => "MULTICAST",
            AddressType::Broadcast => "BROADCAST",
            AddressType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

const ADDRESS_TYPES: &[(&[u8], AddressType)] = &[
    (&[0], AddressType::Current),
    (&[10], AddressType::Private),
    (&[172, 16], AddressType::Private),
    (&[192, 168], AddressType::Private),
    (&[14], AddressType::Public),
    (&[39], AddressType::Reserved),
    (&[127], AddressType::Localhost),
    (&[128], AddressType::ReservedIana),
    (&[169, 254], AddressType::Zeroconf),
    (&[191, 255], AddressType::ReservedIana),
    (&[192, 0, 2], AddressType::Documentation),
    (&[192, 88, 99], AddressType::Ipv6ToIpv4),
    (&[198, 18], AddressType::TestNet),
    (&[223, 255, 255], AddressType::Reserved),
    (&[224], AddressType::Multicast),
    (&[240], AddressType::Reserved),
    (&[255], AddressType::Broadcast),
];

/// Classify four octets against the prefix table.
pub fn classify(octets: [u8; 4]) -> AddressType {
    ADDRESS_TYPES
        .iter()
        .filter(|(prefix, _)| octets.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, address_type)| *address_type)
        .unwrap_or(AddressType::Unknown)
}

/// An IPv4 address as the router prints it.
///
/// Equality and hashing look at the four octets only; everything else is
/// derived on demand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IpAddress(Ipv4Addr);

impl IpAddress {
    pub fn new(octets: [u8; 4]) -> Self {
        Self(Ipv4Addr::from(octets))
    }

    pub fn octets(&self) -> [u8; 4] {
        self.0.octets()
    }

    /// Dotted binary form, e.g. `11000000.10101000.01011000.00000001`.
    pub fn binary(&self) -> String {
        self.octets()
            .iter()
            .map(|octet| format!("{octet:08b}"))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn class(&self) -> AddressClass {
        AddressClass::of(self.octets()[0])
    }

    /// Addresses on the classful network, `None` for classes D and E.
    pub fn addresses_on_network(&self) -> Option<u32> {
        self.class().network_size()
    }

    pub fn address_type(&self) -> AddressType {
        classify(self.octets())
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_ip_address(s) {
            return Err(ParseError::InvalidIpAddress(s.to_string()));
        }
        s.parse::<Ipv4Addr>()
            .map(Self)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl TryFrom<String> for IpAddress {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpAddress> for String {
    fn from(address: IpAddress) -> Self {
        address.to_string()
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(address: Ipv4Addr) -> Self {
        Self(address)
    }
}

impl From<IpAddress> for Ipv4Addr {
    fn from(address: IpAddress) -> Self {
        address.0
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IpAddress(address=\"{}\")", self.0)
    }
}
