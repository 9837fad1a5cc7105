//! Safe bindings to the FPModule fingerprint reader SDK.
//!
//! A [`Device`] is a session with one reader. It forwards to a [`Driver`]:
//! `VendorDriver` talks to the vendor library (enable the `vendor` feature
//! and point `FPMODULE_LIB_DIR` at it), [`SimulatedDriver`] emulates a reader
//! in-process for tests and demos.
//!
//! Nothing in this crate installs a `tracing` subscriber; events are emitted
//! under the `fpmodule_rs` target.

#![warn(clippy::all)]

mod captured;
mod config;
mod device;
mod driver;
mod errors;
mod features;
mod message;
mod simulator;
mod template;
#[cfg(feature = "vendor")]
mod vendor;

pub use crate::{
    captured::*,
    config::{DeviceConfig, COLLECT_TIMES_RANGE, SECURITY_LEVEL_RANGE, TIMEOUT_RANGE},
    device::*,
    driver::*,
    errors::*,
    message::*,
    simulator::*,
    template::*,
};

#[cfg(feature = "vendor")]
pub use crate::vendor::VendorDriver;

pub type Result<T> = std::result::Result<T, FpModuleError>;
