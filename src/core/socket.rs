use std::net::SocketAddr;

use netstat2::{get_sockets_info, AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo};
use tracing::{debug, warn};

use super::connection::{peer_of, Protocol, RawSocket};
use super::error::MonitorError;

/// Source of the raw socket inventory. Each call is an independent snapshot.
pub trait SocketSource {
    fn enumerate(&mut self) -> Vec<RawSocket>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Inet,
    Inet6,
}

impl Family {
    fn as_str(&self) -> &'static str {
        match self {
            Family::Inet => "inet",
            Family::Inet6 => "inet6",
        }
    }

    fn flags(&self) -> AddressFamilyFlags {
        match self {
            Family::Inet => AddressFamilyFlags::IPV4,
            Family::Inet6 => AddressFamilyFlags::IPV6,
        }
    }
}

/// Reads the kernel socket tables through netstat2.
#[derive(Debug, Default)]
pub struct NetstatSource;

impl NetstatSource {
    pub fn new() -> Self {
        Self
    }
}

impl SocketSource for NetstatSource {
    fn enumerate(&mut self) -> Vec<RawSocket> {
        enumerate_with(query_table)
    }
}

/// Runs one query per family and protocol, keeping whatever succeeded.
pub fn enumerate_with<F>(mut query: F) -> Vec<RawSocket>
where
    F: FnMut(Family, Protocol) -> Result<Vec<RawSocket>, MonitorError>,
{
    let mut sockets = Vec::new();
    for family in [Family::Inet6, Family::Inet] {
        for protocol in [Protocol::Tcp, Protocol::Udp] {
            match query(family, protocol) {
                Ok(mut found) => {
                    debug!(family = family.as_str(), protocol = protocol.as_str(), count = found.len(), "socket table read");
                    sockets.append(&mut found);
                }
                Err(err) => warn!("skipping this cycle: {}", err),
            }
        }
    }
    sockets
}

fn query_table(family: Family, protocol: Protocol) -> Result<Vec<RawSocket>, MonitorError> {
    let proto_flags = match protocol {
        Protocol::Tcp => ProtocolFlags::TCP,
        Protocol::Udp => ProtocolFlags::UDP,
    };

    let sockets_info = get_sockets_info(family.flags(), proto_flags).map_err(|e| MonitorError::SocketQuery {
        family: family.as_str(),
        protocol: protocol.as_str(),
        reason: e.to_string(),
    })?;

    let sockets = sockets_info
        .into_iter()
        .map(|si| {
            let pid = si.associated_pids.first().copied().filter(|pid| *pid != 0);
            match si.protocol_socket_info {
                ProtocolSocketInfo::Tcp(tcp_si) => RawSocket::tcp(
                    SocketAddr::new(tcp_si.local_addr, tcp_si.local_port),
                    peer_of(Some(SocketAddr::new(tcp_si.remote_addr, tcp_si.remote_port))),
                    tcp_si.state,
                    pid,
                ),
                ProtocolSocketInfo::Udp(udp_si) => {
                    RawSocket::udp(SocketAddr::new(udp_si.local_addr, udp_si.local_port), pid)
                }
            }
        })
        .collect();

    Ok(sockets)
}

/// Fixed socket list, used where the OS must not be queried.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticSockets(pub Vec<RawSocket>);

#[cfg(test)]
impl SocketSource for StaticSockets {
    fn enumerate(&mut self) -> Vec<RawSocket> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netstat2::TcpState;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn failed_query_keeps_other_results() {
        let sockets = enumerate_with(|family, protocol| match (family, protocol) {
            (Family::Inet6, Protocol::Udp) => Err(MonitorError::SocketQuery {
                family: "inet6",
                protocol: "UDP",
                reason: "permission denied".to_string(),
            }),
            (Family::Inet, Protocol::Tcp) => Ok(vec![RawSocket::tcp(
                addr("10.0.0.1:80"),
                Some(addr("1.1.1.1:443")),
                TcpState::Established,
                Some(100),
            )]),
            (Family::Inet, Protocol::Udp) => Ok(vec![RawSocket::udp(addr("0.0.0.0:53"), Some(5))]),
            _ => Ok(Vec::new()),
        });

        assert_eq!(sockets.len(), 2);
        assert_eq!(sockets[0].protocol, Protocol::Tcp);
        assert_eq!(sockets[1].protocol, Protocol::Udp);
    }

    #[test]
    fn every_query_failing_yields_empty_snapshot() {
        let mut calls = 0;
        let sockets = enumerate_with(|_, _| {
            calls += 1;
            Err(MonitorError::SocketQuery {
                family: "inet",
                protocol: "TCP",
                reason: "boom".to_string(),
            })
        });
        assert!(sockets.is_empty());
        assert_eq!(calls, 4);
    }
}
