//! Host addressing.
//!
//! An address packs the fabric position of a host into four bytes,
//! `network.pod.tor.server`, network byte most significant. Traces and
//! records carry addresses in dotted form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Endpoint address in the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostAddr(pub u32);

impl HostAddr {
    /// Network byte shared by every fabric host.
    pub const NET: u8 = 10;

    pub fn new(pod: u8, tor: u8, server: u8) -> HostAddr {
        HostAddr(u32::from_be_bytes([Self::NET, pod, tor, server]))
    }

    pub fn net(self) -> u8 {
        (self.0 >> 24) as u8
    }
    pub fn pod(self) -> u8 {
        (self.0 >> 16) as u8
    }
    pub fn tor(self) -> u8 {
        (self.0 >> 8) as u8
    }
    pub fn server(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.net(),
            self.pod(),
            self.tor(),
            self.server()
        )
    }
}

impl FromStr for HostAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];
        let mut fields = s.split('.');
        for slot in &mut bytes {
            let field = fields
                .next()
                .ok_or_else(|| format!("address {s:?} must have four dotted fields"))?;
            *slot = field
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("address {s:?}: field {field:?} is not a byte"))?;
        }
        if fields.next().is_some() {
            return Err(format!("address {s:?} must have four dotted fields"));
        }
        Ok(HostAddr(u32::from_be_bytes(bytes)))
    }
}

impl Serialize for HostAddr {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HostAddr {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
