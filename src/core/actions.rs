use std::io;
use std::net::IpAddr;
use std::process::Command;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};
use tracing::{info, warn};

use super::connection::{DisplayRow, NOT_AVAILABLE};
use super::error::ActionError;
use super::utils::reverse_dns;

/// Pid placeholders that never name a real process.
pub const PID_SENTINELS: [&str; 3] = ["", NOT_AVAILABLE, "?"];

/// Registry lookup tool invoked for reverse lookups.
pub const WHOIS: &str = "whois";

/// Sends an unconditional kill to a process.
pub trait ProcessTerminator {
    fn kill(&mut self, pid: u32) -> Result<(), ActionError>;
}

pub struct SysinfoTerminator {
    system_info: System,
}

impl SysinfoTerminator {
    pub fn new() -> Self {
        Self {
            system_info: System::new(),
        }
    }
}

impl Default for SysinfoTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTerminator for SysinfoTerminator {
    fn kill(&mut self, pid: u32) -> Result<(), ActionError> {
        let sys_pid = Pid::from_u32(pid);
        self.system_info.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        let process = self
            .system_info
            .process(sys_pid)
            .ok_or(ActionError::NoSuchProcess(pid))?;

        match process.kill_with(Signal::Kill) {
            Some(true) => Ok(()),
            Some(false) => Err(ActionError::KillDenied(pid)),
            None => Err(ActionError::KillUnsupported(pid)),
        }
    }
}

/// Result of a reverse lookup on a remote address.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupReport {
    pub ip: String,
    pub hostname: Option<String>,
    pub registry: String,
}

impl LookupReport {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Address: {}", self.ip)];
        if let Some(ref hostname) = self.hostname {
            lines.push(format!("Hostname: {}", hostname));
        }
        lines.push(String::new());
        lines.extend(self.registry.lines().map(str::to_string));
        lines
    }
}

pub fn parse_pid(pid: &str) -> Result<u32, ActionError> {
    let trimmed = pid.trim();
    if PID_SENTINELS.contains(&trimmed) {
        return Err(ActionError::InvalidPid(pid.to_string()));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ActionError::InvalidPid(pid.to_string()))
}

/// Drops the trailing `:port`. Splits at the last ':' so IPv6 literals survive.
pub fn strip_port(address: &str) -> Option<&str> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    let host = match address.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => address,
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Kills the owning process of the selected row.
pub fn terminate(
    row: Option<&DisplayRow>,
    terminator: &mut dyn ProcessTerminator,
) -> Result<u32, ActionError> {
    let row = row.ok_or(ActionError::NoSelection)?;
    let pid = parse_pid(&row.pid)?;
    terminator.kill(pid)?;
    info!(pid, process = %row.process_name, "killed process");
    Ok(pid)
}

/// Reverse DNS plus a registry query for the selected row's remote IP.
pub fn reverse_lookup(row: Option<&DisplayRow>) -> Result<LookupReport, ActionError> {
    reverse_lookup_with(row, WHOIS)
}

/// Same as `reverse_lookup`, running `tool <ip>` for the registry part.
pub fn reverse_lookup_with(row: Option<&DisplayRow>, tool: &'static str) -> Result<LookupReport, ActionError> {
    let row = row.ok_or(ActionError::NoSelection)?;
    let ip = strip_port(&row.remote).ok_or(ActionError::NoRemoteAddress)?;
    info!(ip, "running {} lookup", tool);

    let output = Command::new(tool).arg(ip).output().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ActionError::ToolMissing(tool),
        _ => ActionError::Io(e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return Err(ActionError::LookupFailed {
            ip: ip.to_string(),
            reason,
        });
    }

    let hostname = ip.parse::<IpAddr>().ok().and_then(reverse_dns);
    Ok(LookupReport {
        ip: ip.to_string(),
        hostname,
        registry: String::from_utf8_lossy(&output.stdout).to_string(),
    })
}

/// One-line, human-readable rendering of the selected row.
pub fn export_row(row: Option<&DisplayRow>) -> Result<String, ActionError> {
    let row = row.ok_or(ActionError::NoSelection)?;
    let line = row.to_string();
    info!("exported {}", line);
    Ok(line)
}

/// Turns an action outcome into the one-line diagnostic shown to the user.
pub fn report<T>(action: &str, result: &Result<T, ActionError>, success: impl FnOnce(&T) -> String) -> String {
    match result {
        Ok(value) => success(value),
        Err(err) => {
            warn!(action, "{}", err);
            format!("{} failed: {}", action, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Rgb;

    #[derive(Default)]
    struct RecordingTerminator {
        calls: Vec<u32>,
        deny: bool,
    }

    impl ProcessTerminator for RecordingTerminator {
        fn kill(&mut self, pid: u32) -> Result<(), ActionError> {
            self.calls.push(pid);
            if self.deny {
                Err(ActionError::KillDenied(pid))
            } else {
                Ok(())
            }
        }
    }

    fn row(pid: &str, remote: &str) -> DisplayRow {
        DisplayRow {
            protocol: "TCP".to_string(),
            ip_version: "IPv4".to_string(),
            local: "10.0.0.1:80".to_string(),
            remote: remote.to_string(),
            status: "ESTABLISHED".to_string(),
            pid: pid.to_string(),
            process_name: "curl".to_string(),
            color: Rgb::new(120, 130, 140),
        }
    }

    #[test]
    fn sentinel_pids_issue_no_kill() {
        for pid in ["N/A", "?", ""] {
            let mut terminator = RecordingTerminator::default();
            let result = terminate(Some(&row(pid, "")), &mut terminator);
            assert!(matches!(result, Err(ActionError::InvalidPid(_))));
            assert!(terminator.calls.is_empty());
        }
    }

    #[test]
    fn no_selection_issues_no_kill() {
        let mut terminator = RecordingTerminator::default();
        assert!(matches!(terminate(None, &mut terminator), Err(ActionError::NoSelection)));
        assert!(terminator.calls.is_empty());
    }

    #[test]
    fn valid_pid_is_killed_once() {
        let mut terminator = RecordingTerminator::default();
        assert_eq!(terminate(Some(&row("100", "")), &mut terminator).unwrap(), 100);
        assert_eq!(terminator.calls, vec![100]);
    }

    #[test]
    fn denied_kill_is_reported() {
        let mut terminator = RecordingTerminator {
            deny: true,
            ..Default::default()
        };
        let result = terminate(Some(&row("1", "")), &mut terminator);
        let message = report("Kill", &result, |pid| format!("Killed {}", pid));
        assert_eq!(message, "Kill failed: failed to kill process 1 (permission denied?)");
    }

    #[test]
    fn ports_are_stripped() {
        assert_eq!(strip_port("1.1.1.1:443"), Some("1.1.1.1"));
        assert_eq!(strip_port("2606:4700::1111:443"), Some("2606:4700::1111"));
        assert_eq!(strip_port("[::1]:443"), Some("::1"));
        assert_eq!(strip_port("1.1.1.1"), Some("1.1.1.1"));
        assert_eq!(strip_port(""), None);
    }

    #[test]
    fn lookup_without_remote_fails_before_spawning() {
        let result = reverse_lookup(Some(&row("100", "")));
        assert!(matches!(result, Err(ActionError::NoRemoteAddress)));
        assert!(matches!(reverse_lookup(None), Err(ActionError::NoSelection)));
    }

    #[test]
    fn missing_lookup_tool_is_reported() {
        let result = reverse_lookup_with(Some(&row("100", "127.0.0.1:443")), "tcpview-no-such-whois");
        assert!(matches!(result, Err(ActionError::ToolMissing("tcpview-no-such-whois"))));
        let message = report("Whois", &result, |r| r.ip.clone());
        assert!(message.contains("'tcpview-no-such-whois' command not found"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_lookup_tool_is_reported() {
        let result = reverse_lookup_with(Some(&row("100", "127.0.0.1:443")), "false");
        match result {
            Err(ActionError::LookupFailed { ip, reason }) => {
                assert_eq!(ip, "127.0.0.1");
                assert!(!reason.is_empty());
            }
            other => panic!("expected LookupFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn lookup_returns_tool_output() {
        let report = reverse_lookup_with(Some(&row("100", "127.0.0.1:443")), "echo").unwrap();
        assert_eq!(report.ip, "127.0.0.1");
        assert_eq!(report.registry, "127.0.0.1\n");
        assert_eq!(report.hostname, None);
    }

    #[test]
    fn export_formats_seven_fields() {
        let line = export_row(Some(&row("100", "1.1.1.1:443"))).unwrap();
        assert_eq!(
            line,
            "Proto: TCP, IP Ver: IPv4, Local: 10.0.0.1:80, Remote: 1.1.1.1:443, \
             Status: ESTABLISHED, PID: 100, Process: curl"
        );
        assert!(matches!(export_row(None), Err(ActionError::NoSelection)));
    }

    #[test]
    fn report_lines_include_hostname() {
        let report = LookupReport {
            ip: "1.1.1.1".to_string(),
            hostname: Some("one.one.one.one".to_string()),
            registry: "NetName: APNIC\nCountry: AU".to_string(),
        };
        assert_eq!(
            report.lines(),
            vec!["Address: 1.1.1.1", "Hostname: one.one.one.one", "", "NetName: APNIC", "Country: AU"]
        );
    }
}
