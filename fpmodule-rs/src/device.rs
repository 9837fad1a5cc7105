use crate::config::{check_collect_times, check_security_level, check_timeout, DeviceConfig};
use crate::{DeviceMessage, Driver, FpModuleError, Image, MessageHandler, ParamContext, Template};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// A session with one fingerprint reader.
///
/// The session owns its driver and its message handler. Every call that
/// reaches the hardware takes `&mut self`, so a session is never used from two
/// places at once; share it behind a lock if several threads need it.
///
/// ```
/// use fpmodule_rs::{Device, Impression, SimulatedDriver};
///
/// let mut driver = SimulatedDriver::new();
/// driver.present(Impression::finger(1));
///
/// let mut device = Device::new(driver);
/// device.open()?;
/// let image = device.capture_image()?;
/// assert_eq!(image.get_width(), 256);
/// device.close()?;
/// # Ok::<(), fpmodule_rs::FpModuleError>(())
/// ```
pub struct Device<D: Driver> {
    driver: D,
    state: SessionState,
    config: DeviceConfig,
    handler: Option<MessageHandler>,
}

impl<D: Driver> Device<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, DeviceConfig::default())
    }

    /// Creates a closed session that applies `config` every time it opens.
    pub fn with_config(driver: D, config: DeviceConfig) -> Self {
        Device {
            driver,
            state: SessionState::Closed,
            config,
            handler: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Connects to the reader and applies the session's `DeviceConfig`.
    ///
    /// Opening an open session fails with `AlreadyOpen`. If the configuration
    /// cannot be applied the reader is closed again and the error returned.
    pub fn open(&mut self) -> crate::Result<()> {
        if self.is_open() {
            return Err(FpModuleError::AlreadyOpen);
        }

        self.driver.open()?;
        self.state = SessionState::Open;
        info!("Fingerprint reader opened");

        if let Err(error) = self.apply_config() {
            warn!("Failed to configure reader: {}", error);
            if let Err(close_error) = self.driver.close() {
                warn!("Failed to close reader: {}", close_error);
            }
            self.state = SessionState::Closed;
            return Err(error);
        }

        Ok(())
    }

    /// Disconnects from the reader. Closing a closed session does nothing.
    pub fn close(&mut self) -> crate::Result<()> {
        if !self.is_open() {
            debug!("Reader already closed");
            return Ok(());
        }

        self.driver.close()?;
        self.state = SessionState::Closed;
        info!("Fingerprint reader closed");

        Ok(())
    }

    /// Checks, without waiting, whether a finger is on the sensor.
    pub fn detect_finger(&mut self) -> crate::Result<bool> {
        self.ensure_open()?;
        self.driver.detect_finger()
    }

    /// Sets how long captures wait for a finger, 1 to 60 seconds. Other values
    /// are rejected and the reader keeps its previous timeout.
    pub fn set_timeout(&mut self, seconds: u32) -> crate::Result<()> {
        let seconds = check_timeout(seconds).map_err(rejected)?;
        self.ensure_open()?;
        self.driver.set_timeout(seconds)?;
        debug!(seconds, "Capture timeout set");

        Ok(())
    }

    pub fn get_timeout(&mut self) -> crate::Result<u32> {
        self.ensure_open()?;
        self.driver.get_timeout()
    }

    /// Sets how many captures make up one enrollment: 0 lets the reader take
    /// 2 to 4, 1 to 4 fixes the count. Other values are rejected and the reader
    /// keeps its previous setting.
    pub fn set_collect_times(&mut self, times: u32) -> crate::Result<()> {
        let times = check_collect_times(times).map_err(rejected)?;
        self.ensure_open()?;
        self.driver.set_collect_times(times)?;
        debug!(times, "Collect times set");

        Ok(())
    }

    pub fn get_collect_times(&mut self) -> crate::Result<u32> {
        self.ensure_open()?;
        self.driver.get_collect_times()
    }

    /// Captures one image, blocking until a finger is presented or the
    /// timeout elapses (`FpModuleError::Timeout`).
    pub fn capture_image(&mut self) -> crate::Result<Image> {
        self.ensure_open()?;
        let image = self.driver.capture_image()?;
        debug!(
            width = image.get_width(),
            height = image.get_height(),
            "Image captured"
        );

        Ok(image)
    }

    /// Enrolls a finger, taking as many captures as the collect-times setting
    /// asks for. Progress is reported to the installed message handler, on
    /// this thread, in the order
    /// `PressFinger`, `CapturedImage`, `RiseFinger`, `EnrollProgress` per
    /// capture. The call does not return before the handler does.
    ///
    /// Fails with `Timeout` when a finger does not arrive in time and with
    /// `EnrollFail` when the captures cannot be fused into one template.
    pub fn enroll(&mut self) -> crate::Result<Template> {
        self.ensure_open()?;

        let handler = &mut self.handler;
        let mut captures = 0;
        let mut dispatch = |message: DeviceMessage| {
            if let DeviceMessage::EnrollProgress(count) = message {
                captures = count;
            }
            debug!(kind = %message.kind(), "Dispatching reader message");
            if let Some(handler) = handler.as_mut() {
                handler(&message);
            }
        };

        match self.driver.enroll(&mut dispatch) {
            Ok(template) => {
                info!(captures, "Enrollment completed");
                Ok(template)
            }
            Err(error) => {
                warn!(captures, "Enrollment failed: {}", error);
                Err(error)
            }
        }
    }

    /// Scores a template from 0 to 100, higher is better. Templates built from
    /// raw bytes are size-checked by `Template::from_bytes`.
    pub fn get_quality(&mut self, template: &Template) -> crate::Result<u8> {
        let score = self.driver.get_quality(template)?;

        Ok(score.min(100))
    }

    /// Compares two templates at `security_level`, 1 (most permissive) to 5
    /// (most strict). Returns `false` when they do not belong to the same
    /// finger. An invalid level is an error, never a silent default.
    pub fn match_templates(
        &mut self,
        first: &Template,
        second: &Template,
        security_level: u32,
    ) -> crate::Result<bool> {
        let security_level = check_security_level(security_level).map_err(rejected)?;

        match self.driver.match_templates(first, second, security_level) {
            Ok(accepted) => Ok(accepted),
            Err(FpModuleError::MatchFail) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Reader model and firmware description.
    pub fn get_device_info(&mut self) -> crate::Result<String> {
        self.ensure_open()?;
        self.driver.get_device_info()
    }

    /// Version of the SDK backing the driver. Works on a closed session.
    pub fn get_sdk_version(&mut self) -> crate::Result<String> {
        self.driver.get_sdk_version()
    }

    /// Installs the observer for enrollment messages, replacing the previous
    /// one.
    pub fn install_message_handler(&mut self, handler: impl FnMut(&DeviceMessage) + Send + 'static) {
        if self.handler.replace(Box::new(handler)).is_some() {
            debug!("Message handler replaced");
        }
    }

    /// Removes the installed observer, returning it.
    pub fn remove_message_handler(&mut self) -> Option<MessageHandler> {
        self.handler.take()
    }

    fn ensure_open(&self) -> crate::Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(FpModuleError::NotOpen)
        }
    }

    fn apply_config(&mut self) -> crate::Result<()> {
        let config = self.config;
        if let Some(seconds) = config.timeout() {
            self.set_timeout(seconds)?;
        }
        if let Some(times) = config.collect_times() {
            self.set_collect_times(times)?;
        }

        Ok(())
    }
}

fn rejected(context: ParamContext) -> FpModuleError {
    warn!("Rejected parameter: {}", context);
    FpModuleError::Param(context)
}

impl<D: Driver> fmt::Debug for Device<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl<D: Driver> Drop for Device<D> {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(error) = self.driver.close() {
                warn!("Failed to close reader on drop: {}", error);
            }
        }
    }
}
