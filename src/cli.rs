use std::path::PathBuf;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::warn;

use crate::core::connection::Column;
use crate::core::filters::{FilterState, FilterToggle};
use crate::core::sort::{SortDirection, SortState};

pub const DEFAULT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    pub interval: Duration,
    pub filter: FilterState,
    pub sort: SortState,
    pub once: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// Problems found while parsing, logged once logging is up.
    pub warnings: Vec<String>,
}

pub fn command() -> Command {
    Command::new("tcpview")
        .version("0.1.0")
        .about("Live view of open TCP/UDP sockets and their owning processes")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .help("Refresh period in seconds")
                .value_name("SECS")
                .num_args(1)
        )
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .help("Show every socket, not only ESTABLISHED ones")
                .action(ArgAction::SetTrue)
        )
        .arg(Arg::new("no-tcp").long("no-tcp").help("Hide TCP sockets").action(ArgAction::SetTrue))
        .arg(Arg::new("no-udp").long("no-udp").help("Hide UDP sockets").action(ArgAction::SetTrue))
        .arg(Arg::new("no-ipv4").long("no-ipv4").help("Hide IPv4 sockets").action(ArgAction::SetTrue))
        .arg(Arg::new("no-ipv6").long("no-ipv6").help("Hide IPv6 sockets").action(ArgAction::SetTrue))
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .help("Initial search text (case-insensitive, any column)")
                .value_name("TEXT")
                .num_args(1)
        )
        .arg(
            Arg::new("sort")
                .short('S')
                .long("sort")
                .help("Sort column: proto, ipver, local, remote, status, pid, process")
                .value_name("COLUMN")
                .num_args(1)
        )
        .arg(
            Arg::new("reverse")
                .short('r')
                .long("reverse")
                .help("Sort descending")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Print one snapshot as JSON and exit")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write logs to this file")
                .value_name("PATH")
                .num_args(1)
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log level when RUST_LOG is unset")
                .value_name("LEVEL")
                .default_value("info")
        )
}

pub fn parse_args() -> Settings {
    settings_from(&command().get_matches())
}

pub fn settings_from(matches: &ArgMatches) -> Settings {
    let mut warnings = Vec::new();

    let mut interval = Duration::from_secs(DEFAULT_INTERVAL_SECS);
    if let Some(secs_str) = matches.get_one::<String>("interval") {
        match secs_str.parse::<u64>() {
            Ok(secs) if secs >= 1 => interval = Duration::from_secs(secs),
            _ => warnings.push(format!("Invalid interval '{}', using {}s", secs_str, DEFAULT_INTERVAL_SECS)),
        }
    }

    let mut filter = FilterState::default();
    let flags = [
        ("all", FilterToggle::ActiveOnly),
        ("no-tcp", FilterToggle::Tcp),
        ("no-udp", FilterToggle::Udp),
        ("no-ipv4", FilterToggle::Ipv4),
        ("no-ipv6", FilterToggle::Ipv6),
    ];
    for (flag, toggle) in flags {
        if matches.get_flag(flag) {
            filter = filter.with(toggle, false);
        }
    }
    if let Some(text) = matches.get_one::<String>("search") {
        filter = filter.with_search(text);
    }

    let mut column = Column::Protocol;
    if let Some(name) = matches.get_one::<String>("sort") {
        match Column::from_name(name) {
            Some(found) => column = found,
            None => warnings.push(format!("Unknown sort column '{}', using proto", name)),
        }
    }
    let direction = if matches.get_flag("reverse") {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };

    Settings {
        interval,
        filter,
        sort: SortState::new(column, direction),
        once: matches.get_flag("once"),
        log_file: matches.get_one::<String>("log-file").map(PathBuf::from),
        log_level: matches
            .get_one::<String>("log-level")
            .cloned()
            .unwrap_or_else(|| "info".to_string()),
        warnings,
    }
}

impl Settings {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let matches = command()
            .try_get_matches_from(std::iter::once("tcpview").chain(args.iter().copied()))
            .unwrap();
        settings_from(&matches)
    }

    #[test]
    fn defaults() {
        let settings = parse(&[]);
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.filter, FilterState::default());
        assert_eq!(settings.sort, SortState::default());
        assert!(!settings.once);
        assert!(settings.log_file.is_none());
        assert_eq!(settings.log_level, "info");
        assert!(settings.warnings.is_empty());
    }

    #[test]
    fn toggles_and_search() {
        let settings = parse(&["--all", "--no-udp", "--no-ipv6", "-s", "ssh"]);
        assert!(!settings.filter.active_only);
        assert!(settings.filter.show_tcp);
        assert!(!settings.filter.show_udp);
        assert!(settings.filter.show_ipv4);
        assert!(!settings.filter.show_ipv6);
        assert_eq!(settings.filter.search_text, "ssh");
    }

    #[test]
    fn sort_options() {
        let settings = parse(&["-S", "pid", "-r"]);
        assert_eq!(settings.sort, SortState::new(Column::Pid, SortDirection::Descending));
    }

    #[test]
    fn bad_values_fall_back_with_warning() {
        let settings = parse(&["-i", "0", "-S", "color"]);
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.sort.column, Column::Protocol);
        assert_eq!(settings.warnings.len(), 2);
    }

    #[test]
    fn once_and_logging() {
        let settings = parse(&["--once", "--log-file", "/tmp/tcpview.log", "--log-level", "debug", "-i", "2"]);
        assert!(settings.once);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/tcpview.log")));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.interval, Duration::from_secs(2));
    }
}
