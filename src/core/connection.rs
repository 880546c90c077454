use std::borrow::Cow;
use std::fmt;
use std::net::SocketAddr;

use netstat2::TcpState;
use serde::Serialize;

use super::color::Rgb;

/// Placeholder for a process name that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Derived from the textual form of the local IP: any ':' means IPv6.
    pub fn from_ip_literal(ip: &str) -> Self {
        if ip.contains(':') {
            IpVersion::V6
        } else {
            IpVersion::V4
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "IPv4",
            IpVersion::V6 => "IPv6",
        }
    }
}

/// The seven displayed columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Protocol,
    IpVersion,
    Local,
    Remote,
    Status,
    Pid,
    Process,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Protocol,
        Column::IpVersion,
        Column::Local,
        Column::Remote,
        Column::Status,
        Column::Pid,
        Column::Process,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Protocol => "Proto",
            Column::IpVersion => "IP Ver",
            Column::Local => "Local Address",
            Column::Remote => "Remote Address",
            Column::Status => "Status",
            Column::Pid => "PID",
            Column::Process => "Process",
        }
    }

    pub fn index(&self) -> usize {
        Column::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Column::ALL.get(index).copied()
    }

    /// Accepts the short names used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "proto" | "protocol" => Some(Column::Protocol),
            "ipver" | "ip" | "ip_version" => Some(Column::IpVersion),
            "local" => Some(Column::Local),
            "remote" => Some(Column::Remote),
            "status" | "state" => Some(Column::Status),
            "pid" => Some(Column::Pid),
            "process" | "name" => Some(Column::Process),
            _ => None,
        }
    }
}

/// One socket as reported by the OS, before enrichment.
#[derive(Debug, Clone)]
pub struct RawSocket {
    pub protocol: Protocol,
    pub local: Option<SocketAddr>,
    pub remote: Option<SocketAddr>,
    pub state: Option<TcpState>,
    pub pid: Option<u32>,
}

impl RawSocket {
    pub fn tcp(local: SocketAddr, remote: Option<SocketAddr>, state: TcpState, pid: Option<u32>) -> Self {
        Self {
            protocol: Protocol::Tcp,
            local: Some(local),
            remote,
            state: Some(state),
            pid,
        }
    }

    pub fn udp(local: SocketAddr, pid: Option<u32>) -> Self {
        Self {
            protocol: Protocol::Udp,
            local: Some(local),
            remote: None,
            state: None,
            pid,
        }
    }
}

/// Enriched connection, one per live socket at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    pub protocol: Protocol,
    pub ip_version: IpVersion,
    pub local_address: String,
    pub remote_address: String,
    pub status: String,
    pub pid: Option<u32>,
    pub process_name: String,
    pub display_color: Rgb,
}

impl ConnectionRecord {
    /// String form of a column, as displayed and as compared by search and sort.
    pub fn field(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Protocol => Cow::Borrowed(self.protocol.as_str()),
            Column::IpVersion => Cow::Borrowed(self.ip_version.as_str()),
            Column::Local => Cow::Borrowed(&self.local_address),
            Column::Remote => Cow::Borrowed(&self.remote_address),
            Column::Status => Cow::Borrowed(&self.status),
            Column::Pid => match self.pid {
                Some(pid) => Cow::Owned(pid.to_string()),
                None => Cow::Borrowed(""),
            },
            Column::Process => Cow::Borrowed(&self.process_name),
        }
    }

    pub fn to_row(&self) -> DisplayRow {
        DisplayRow {
            protocol: self.protocol.as_str().to_string(),
            ip_version: self.ip_version.as_str().to_string(),
            local: self.local_address.clone(),
            remote: self.remote_address.clone(),
            status: self.status.clone(),
            pid: self.field(Column::Pid).into_owned(),
            process_name: self.process_name.clone(),
            color: self.display_color,
        }
    }
}

/// What the presentation layer receives per refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub protocol: String,
    pub ip_version: String,
    pub local: String,
    pub remote: String,
    pub status: String,
    pub pid: String,
    pub process_name: String,
    pub color: Rgb,
}

impl DisplayRow {
    pub fn cells(&self) -> [&str; 7] {
        [
            self.protocol.as_str(),
            self.ip_version.as_str(),
            self.local.as_str(),
            self.remote.as_str(),
            self.status.as_str(),
            self.pid.as_str(),
            self.process_name.as_str(),
        ]
    }
}

impl fmt::Display for DisplayRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Proto: {}, IP Ver: {}, Local: {}, Remote: {}, Status: {}, PID: {}, Process: {}",
            self.protocol,
            self.ip_version,
            self.local,
            self.remote,
            self.status,
            self.pid,
            self.process_name
        )
    }
}

/// `ip:port` without brackets, also for IPv6.
pub fn format_endpoint(addr: &SocketAddr) -> String {
    format!("{}:{}", addr.ip(), addr.port())
}

/// A peer of `unspecified:0` means the socket has no remote end.
pub fn peer_of(remote: Option<SocketAddr>) -> Option<SocketAddr> {
    remote.filter(|addr| !(addr.port() == 0 && addr.ip().is_unspecified()))
}

pub fn state_name(state: &TcpState) -> &'static str {
    match state {
        TcpState::Closed => "CLOSE",
        TcpState::Listen => "LISTEN",
        TcpState::SynSent => "SYN_SENT",
        TcpState::SynReceived => "SYN_RECV",
        TcpState::Established => "ESTABLISHED",
        TcpState::FinWait1 => "FIN_WAIT1",
        TcpState::FinWait2 => "FIN_WAIT2",
        TcpState::CloseWait => "CLOSE_WAIT",
        TcpState::Closing => "CLOSING",
        TcpState::LastAck => "LAST_ACK",
        TcpState::TimeWait => "TIME_WAIT",
        TcpState::DeleteTcb => "DELETE_TCB",
        TcpState::Unknown => "UNKNOWN",
    }
}
