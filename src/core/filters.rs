use super::connection::{Column, ConnectionRecord, IpVersion, Protocol};

/// Status a record must report to pass the active-only toggle.
pub const ACTIVE_STATUS: &str = "ESTABLISHED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterToggle {
    ActiveOnly,
    Tcp,
    Udp,
    Ipv4,
    Ipv6,
}

impl FilterToggle {
    pub const ALL: [FilterToggle; 5] = [
        FilterToggle::ActiveOnly,
        FilterToggle::Tcp,
        FilterToggle::Udp,
        FilterToggle::Ipv4,
        FilterToggle::Ipv6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterToggle::ActiveOnly => "Active Only",
            FilterToggle::Tcp => "TCP",
            FilterToggle::Udp => "UDP",
            FilterToggle::Ipv4 => "IPv4",
            FilterToggle::Ipv6 => "IPv6",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub active_only: bool,
    pub show_tcp: bool,
    pub show_udp: bool,
    pub show_ipv4: bool,
    pub show_ipv6: bool,
    pub search_text: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_only: true,
            show_tcp: true,
            show_udp: true,
            show_ipv4: true,
            show_ipv6: true,
            search_text: String::new(),
        }
    }
}

impl FilterState {
    /// Everything enabled, nothing hidden.
    pub fn show_all() -> Self {
        Self {
            active_only: false,
            ..Self::default()
        }
    }

    pub fn get(&self, toggle: FilterToggle) -> bool {
        match toggle {
            FilterToggle::ActiveOnly => self.active_only,
            FilterToggle::Tcp => self.show_tcp,
            FilterToggle::Udp => self.show_udp,
            FilterToggle::Ipv4 => self.show_ipv4,
            FilterToggle::Ipv6 => self.show_ipv6,
        }
    }

    pub fn with(mut self, toggle: FilterToggle, value: bool) -> Self {
        let flag = match toggle {
            FilterToggle::ActiveOnly => &mut self.active_only,
            FilterToggle::Tcp => &mut self.show_tcp,
            FilterToggle::Udp => &mut self.show_udp,
            FilterToggle::Ipv4 => &mut self.show_ipv4,
            FilterToggle::Ipv6 => &mut self.show_ipv6,
        };
        *flag = value;
        self
    }

    pub fn with_search(mut self, text: &str) -> Self {
        self.search_text = text.to_string();
        self
    }

    #[cfg(test)]
    pub fn matches(&self, record: &ConnectionRecord) -> bool {
        self.matches_needle(record, &self.search_text.to_lowercase())
    }

    /// `needle` is the search text, already lowercased.
    fn matches_needle(&self, record: &ConnectionRecord, needle: &str) -> bool {
        // UDP rows are held to the same ESTABLISHED test as TCP rows
        if self.active_only && record.status != ACTIVE_STATUS {
            return false;
        }

        let protocol_shown = match record.protocol {
            Protocol::Tcp => self.show_tcp,
            Protocol::Udp => self.show_udp,
        };
        if !protocol_shown {
            return false;
        }

        let version_shown = match record.ip_version {
            IpVersion::V4 => self.show_ipv4,
            IpVersion::V6 => self.show_ipv6,
        };
        if !version_shown {
            return false;
        }

        if needle.is_empty() {
            return true;
        }

        Column::ALL
            .iter()
            .any(|column| record.field(*column).to_lowercase().contains(needle))
    }

    pub fn to_string(&self) -> String {
        let hidden: Vec<&str> = FilterToggle::ALL[1..]
            .iter()
            .filter(|toggle| !self.get(**toggle))
            .map(|toggle| toggle.as_str())
            .collect();

        let mut parts = Vec::new();
        if self.active_only {
            parts.push("active only".to_string());
        }
        if !hidden.is_empty() {
            parts.push(format!("hiding {}", hidden.join("/")));
        }
        if !self.search_text.is_empty() {
            parts.push(format!("search \"{}\"", self.search_text));
        }

        if parts.is_empty() {
            "No filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Keeps the records that pass every predicate, in input order.
pub fn apply(records: Vec<ConnectionRecord>, state: &FilterState) -> Vec<ConnectionRecord> {
    let needle = state.search_text.to_lowercase();
    records
        .into_iter()
        .filter(|record| state.matches_needle(record, &needle))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::color::Rgb;

    pub(crate) fn record(
        protocol: Protocol,
        local: &str,
        remote: &str,
        status: &str,
        pid: Option<u32>,
        name: &str,
    ) -> ConnectionRecord {
        ConnectionRecord {
            protocol,
            ip_version: IpVersion::from_ip_literal(local.rsplit_once(':').map_or(local, |(ip, _)| ip)),
            local_address: local.to_string(),
            remote_address: remote.to_string(),
            status: status.to_string(),
            pid,
            process_name: name.to_string(),
            display_color: Rgb::new(200, 200, 200),
        }
    }

    pub(crate) fn curl_and_dnsd() -> Vec<ConnectionRecord> {
        vec![
            record(Protocol::Tcp, "10.0.0.1:80", "1.1.1.1:443", "ESTABLISHED", Some(100), "curl"),
            record(Protocol::Udp, "0.0.0.0:53", "", "LISTEN", Some(5), "dnsd"),
        ]
    }

    fn mixed() -> Vec<ConnectionRecord> {
        vec![
            record(Protocol::Tcp, "10.0.0.1:80", "1.1.1.1:443", "ESTABLISHED", Some(100), "curl"),
            record(Protocol::Tcp, ":::22", "", "LISTEN", Some(1), "sshd"),
            record(Protocol::Udp, "0.0.0.0:68", "", "NONE", None, "N/A"),
            record(Protocol::Udp, "::1:5353", "", "ESTABLISHED", Some(7), "avahi"),
            record(Protocol::Tcp, "::1:631", "::1:40000", "CLOSE_WAIT", Some(8), "cupsd"),
        ]
    }

    #[test]
    fn defaults_are_active_only_with_everything_shown() {
        let state = FilterState::default();
        assert!(state.active_only);
        assert!(state.show_tcp && state.show_udp && state.show_ipv4 && state.show_ipv6);
        assert!(state.search_text.is_empty());
    }

    #[test]
    fn all_enabled_is_identity() {
        assert_eq!(apply(mixed(), &FilterState::show_all()), mixed());
    }

    #[test]
    fn output_is_ordered_subset() {
        let input = mixed();
        let states = [
            FilterState::default(),
            FilterState::show_all().with(FilterToggle::Tcp, false),
            FilterState::show_all().with(FilterToggle::Ipv4, false),
            FilterState::show_all().with_search("c"),
        ];
        for state in states {
            let output = apply(input.clone(), &state);
            let mut cursor = input.iter();
            for kept in &output {
                assert!(cursor.any(|r| r == kept), "{:?} out of order for {:?}", kept, state);
            }
        }
    }

    #[test]
    fn active_only_drops_non_established_regardless_of_protocol() {
        let output = apply(mixed(), &FilterState::default());
        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|r| r.status == ACTIVE_STATUS));
        assert!(output.iter().any(|r| r.protocol == Protocol::Udp));
    }

    #[test]
    fn active_only_keeps_only_curl() {
        let output = apply(curl_and_dnsd(), &FilterState::default());
        assert_eq!(output, vec![curl_and_dnsd()[0].clone()]);
    }

    #[test]
    fn search_finds_dnsd() {
        let state = FilterState::show_all().with_search("dns");
        let output = apply(curl_and_dnsd(), &state);
        assert_eq!(output, vec![curl_and_dnsd()[1].clone()]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let state = FilterState::show_all().with_search("CLOSE_wait");
        assert_eq!(apply(mixed(), &state).len(), 1);

        let by_pid = FilterState::show_all().with_search("100");
        assert_eq!(apply(mixed(), &by_pid)[0].process_name, "curl");

        let by_version = FilterState::show_all().with_search("ipv6");
        assert_eq!(apply(mixed(), &by_version).len(), 3);
    }

    #[test]
    fn apply_agrees_with_matches_for_mixed_case_search() {
        for text in ["CuRl", "IPV6", "::1", "n/a", "Close_Wait", "nothing-matches"] {
            let state = FilterState::show_all().with_search(text);
            let expected: Vec<ConnectionRecord> = mixed().into_iter().filter(|r| state.matches(r)).collect();
            assert_eq!(apply(mixed(), &state), expected, "{}", text);
        }
        let state = FilterState::show_all().with_search("CuRl");
        assert_eq!(state.search_text, "CuRl");
        assert_eq!(apply(mixed(), &state).len(), 1);
    }

    #[test]
    fn protocol_and_version_toggles() {
        let no_tcp = FilterState::show_all().with(FilterToggle::Tcp, false);
        assert!(apply(mixed(), &no_tcp).iter().all(|r| r.protocol == Protocol::Udp));

        let no_udp = FilterState::show_all().with(FilterToggle::Udp, false);
        assert!(apply(mixed(), &no_udp).iter().all(|r| r.protocol == Protocol::Tcp));

        let no_v6 = FilterState::show_all().with(FilterToggle::Ipv6, false);
        assert!(apply(mixed(), &no_v6).iter().all(|r| r.ip_version == IpVersion::V4));

        let nothing = FilterState::show_all()
            .with(FilterToggle::Ipv4, false)
            .with(FilterToggle::Ipv6, false);
        assert!(apply(mixed(), &nothing).is_empty());
    }

    #[test]
    fn summary_text() {
        assert_eq!(FilterState::show_all().to_string(), "No filters");
        let state = FilterState::default()
            .with(FilterToggle::Udp, false)
            .with_search("ssh");
        assert_eq!(state.to_string(), "active only, hiding UDP, search \"ssh\"");
    }
}
