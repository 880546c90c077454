#[cfg(test)]
use std::collections::HashMap;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use super::connection::NOT_AVAILABLE;

/// Maps a pid to a process name.
pub trait ProcessResolver {
    /// Called once per refresh cycle, before any lookups.
    fn refresh(&mut self) {}

    /// `None` when the process has exited or cannot be inspected.
    fn lookup(&self, pid: u32) -> Option<String>;

    fn resolve(&self, pid: Option<u32>) -> String {
        pid.and_then(|pid| self.lookup(pid))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

pub struct SysinfoResolver {
    system_info: System,
}

impl SysinfoResolver {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing());
        Self {
            system_info: System::new_with_specifics(refresh_kind),
        }
    }
}

impl Default for SysinfoResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessResolver for SysinfoResolver {
    fn refresh(&mut self) {
        self.system_info
            .refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());
    }

    fn lookup(&self, pid: u32) -> Option<String> {
        self.system_info
            .process(Pid::from_u32(pid))
            .map(|proc| proc.name().to_string_lossy().to_string())
    }
}

/// Fixed pid-to-name table.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticResolver(pub HashMap<u32, String>);

#[cfg(test)]
impl StaticResolver {
    pub fn with(mut self, pid: u32, name: &str) -> Self {
        self.0.insert(pid, name.to_string());
        self
    }
}

#[cfg(test)]
impl ProcessResolver for StaticResolver {
    fn lookup(&self, pid: u32) -> Option<String> {
        self.0.get(&pid).cloned()
    }
}
