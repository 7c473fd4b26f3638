use std::collections::BTreeMap;

/// Outbound request headers, keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Mutable state of the polling loop between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState {
    first_cycle: bool,
    proxy_index: usize,
    headers: Headers,
    consecutive_failures: u32,
    cycle: u64,
}

impl CycleState {
    pub fn new(headers: Headers) -> Self {
        Self {
            first_cycle: true,
            proxy_index: 0,
            headers,
            consecutive_failures: 0,
            cycle: 0,
        }
    }

    pub fn is_first_cycle(&self) -> bool {
        self.first_cycle
    }

    pub fn proxy_index(&self) -> usize {
        self.proxy_index
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Starts a new cycle and returns its 1-based number.
    pub fn begin_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.cycle
    }

    /// The proxy every request of this cycle must go through.
    pub fn current_proxy<'a>(&self, proxies: &'a [String]) -> Option<&'a str> {
        proxies.get(self.proxy_index).map(String::as_str)
    }

    /// A cycle finished without error: notifications are no longer suppressed.
    pub fn complete_cycle(&mut self) {
        self.first_cycle = false;
        self.consecutive_failures = 0;
    }

    /// A cycle failed: take a new identity and move to the next proxy, wrapping around.
    pub fn rotate(&mut self, headers: Headers, proxy_count: usize) {
        self.headers = headers;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if proxy_count > 0 {
            self.proxy_index = (self.proxy_index + 1) % proxy_count;
        }
    }
}
