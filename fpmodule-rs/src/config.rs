use crate::ParamContext;
use std::ops::RangeInclusive;

/// Accepted capture timeouts in seconds.
pub const TIMEOUT_RANGE: RangeInclusive<u32> = 1..=60;
/// Accepted collect-times values. 0 lets the reader take 2 to 4 captures.
pub const COLLECT_TIMES_RANGE: RangeInclusive<u32> = 0..=4;
/// Accepted security levels, 1 being the most permissive.
pub const SECURITY_LEVEL_RANGE: RangeInclusive<u32> = 1..=5;

/// Settings applied to the reader every time a `Device` is opened. Anything
/// left unset keeps the reader's own value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    timeout: Option<u32>,
    collect_times: Option<u32>,
}

impl DeviceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture timeout in seconds (1..=60).
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set the number of captures per enrollment (0..=4).
    pub fn with_collect_times(mut self, times: u32) -> Self {
        self.collect_times = Some(times);
        self
    }

    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    pub fn collect_times(&self) -> Option<u32> {
        self.collect_times
    }
}

pub(crate) fn check_timeout(seconds: u32) -> Result<u32, ParamContext> {
    if TIMEOUT_RANGE.contains(&seconds) {
        Ok(seconds)
    } else {
        Err(ParamContext::Timeout(seconds))
    }
}

pub(crate) fn check_collect_times(times: u32) -> Result<u32, ParamContext> {
    if COLLECT_TIMES_RANGE.contains(&times) {
        Ok(times)
    } else {
        Err(ParamContext::CollectTimes(times))
    }
}

pub(crate) fn check_security_level(level: u32) -> Result<u32, ParamContext> {
    if SECURITY_LEVEL_RANGE.contains(&level) {
        Ok(level)
    } else {
        Err(ParamContext::SecurityLevel(level))
    }
}
