use tracing::debug;

use super::color::ColorCache;
use super::connection::{format_endpoint, state_name, Column, ConnectionRecord, DisplayRow, IpVersion, RawSocket};
use super::filters::{self, FilterState, FilterToggle};
use super::process::{ProcessResolver, SysinfoResolver};
use super::socket::{NetstatSource, SocketSource};
use super::sort::{self, SortState};

/// Status shown for sockets that carry no state (UDP).
pub const NO_STATUS: &str = "NONE";

/// Joins a raw socket with its owner. Sockets with no local address are dropped.
pub fn enrich(
    raw: RawSocket,
    resolver: &dyn ProcessResolver,
    colors: &mut ColorCache,
) -> Option<ConnectionRecord> {
    let local = raw.local?;
    let ip_version = IpVersion::from_ip_literal(&local.ip().to_string());
    let process_name = resolver.resolve(raw.pid);
    let display_color = colors.color_for(&process_name);

    Some(ConnectionRecord {
        protocol: raw.protocol,
        ip_version,
        local_address: format_endpoint(&local),
        remote_address: raw.remote.as_ref().map(format_endpoint).unwrap_or_default(),
        status: raw.state.as_ref().map_or(NO_STATUS, state_name).to_string(),
        pid: raw.pid,
        process_name,
        display_color,
    })
}

/// enumerate → enrich → filter → sort, over an already-taken snapshot.
pub fn build_rows(
    raw: Vec<RawSocket>,
    resolver: &dyn ProcessResolver,
    colors: &mut ColorCache,
    filter: &FilterState,
    sort_state: SortState,
) -> Vec<ConnectionRecord> {
    let seen = raw.len();
    let records: Vec<ConnectionRecord> = raw
        .into_iter()
        .filter_map(|socket| enrich(socket, resolver, colors))
        .collect();
    let enriched = records.len();

    let mut records = filters::apply(records, filter);
    sort::sort(&mut records, sort_state);

    debug!(seen, enriched, shown = records.len(), "rows rebuilt");
    records
}

/// Session state for the refresh pipeline: filters, sort order, color
/// cache and the OS collaborators. Every refresh replaces the rows.
pub struct ConnectionMonitor {
    sockets: Box<dyn SocketSource>,
    resolver: Box<dyn ProcessResolver>,
    colors: ColorCache,
    filter: FilterState,
    sort_state: SortState,
    records: Vec<ConnectionRecord>,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::with_sources(Box::new(NetstatSource::new()), Box::new(SysinfoResolver::new()))
    }

    pub fn with_sources(sockets: Box<dyn SocketSource>, resolver: Box<dyn ProcessResolver>) -> Self {
        Self {
            sockets,
            resolver,
            colors: ColorCache::new(),
            filter: FilterState::default(),
            sort_state: SortState::default(),
            records: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort_state: SortState) -> Self {
        self.sort_state = sort_state;
        self
    }

    pub fn refresh(&mut self) -> &[ConnectionRecord] {
        let raw = self.sockets.enumerate();
        self.resolver.refresh();
        self.records = build_rows(
            raw,
            self.resolver.as_ref(),
            &mut self.colors,
            &self.filter,
            self.sort_state,
        );
        &self.records
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        self.records.iter().map(ConnectionRecord::to_row).collect()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    pub fn set_filter(&mut self, toggle: FilterToggle, value: bool) -> &FilterState {
        self.filter = self.filter.clone().with(toggle, value);
        &self.filter
    }

    pub fn toggle_filter(&mut self, toggle: FilterToggle) -> &FilterState {
        let value = !self.filter.get(toggle);
        self.set_filter(toggle, value)
    }

    pub fn set_search(&mut self, text: &str) -> &FilterState {
        self.filter = self.filter.clone().with_search(text);
        &self.filter
    }

    pub fn set_sort(&mut self, column: Column) -> SortState {
        self.sort_state = self.sort_state.clicked(column);
        self.sort_state
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
