use failure::Fail;

/// Status codes returned by the SDK.
pub mod code {
    pub const SUCCESS: i32 = 0;
    pub const CONNECTION_ERR: i32 = 1;
    pub const TIMEOUT: i32 = 2;
    pub const ENROLL_FAIL: i32 = 3;
    pub const PARAM_ERR: i32 = 4;
    pub const EXTRACT_FAIL: i32 = 5;
    pub const MATCH_FAIL: i32 = 6;
}

#[derive(Debug, Fail)]
pub enum FpModuleError {
    #[fail(display = "Communication with the fingerprint reader failed")]
    ConnectionError,
    #[fail(display = "No finger was captured before the timeout elapsed")]
    Timeout,
    #[fail(display = "Captured samples could not be fused into a template")]
    EnrollFail,
    #[fail(display = "Feature extraction failed")]
    ExtractFail,
    #[fail(display = "Templates do not belong to the same finger")]
    MatchFail,
    #[fail(display = "Invalid parameter: {}", _0)]
    Param(ParamContext),
    #[fail(display = "Device is not open")]
    NotOpen,
    #[fail(display = "Device is already open")]
    AlreadyOpen,
    #[fail(display = "I/O error: {}", _0)]
    Io(String),
    #[fail(display = "Status code not covered by the SDK documentation: {}", _0)]
    Other(i32),
}

#[derive(Debug, Fail, Clone, Copy, PartialEq, Eq)]
pub enum ParamContext {
    #[fail(display = "timeout must be 1..=60 seconds, got {}", _0)]
    Timeout(u32),
    #[fail(display = "collect times must be 0..=4, got {}", _0)]
    CollectTimes(u32),
    #[fail(display = "security level must be 1..=5, got {}", _0)]
    SecurityLevel(u32),
    #[fail(display = "template must be 512 bytes, got {}", _0)]
    TemplateSize(usize),
    #[fail(display = "image buffer does not match its dimensions")]
    ImageBuffer,
    #[fail(display = "rejected by the SDK")]
    Vendor,
}

impl FpModuleError {
    /// Maps a non-zero SDK status code onto an error. `None` means success.
    ///
    /// `FP_MATCH_FAIL` maps to `MatchFail`; `Device::match_templates` turns
    /// that into a plain rejection before it reaches callers.
    pub fn from_code(status: i32) -> Option<Self> {
        match status {
            code::SUCCESS => None,
            code::CONNECTION_ERR => Some(FpModuleError::ConnectionError),
            code::TIMEOUT => Some(FpModuleError::Timeout),
            code::ENROLL_FAIL => Some(FpModuleError::EnrollFail),
            code::PARAM_ERR => Some(FpModuleError::Param(ParamContext::Vendor)),
            code::EXTRACT_FAIL => Some(FpModuleError::ExtractFail),
            code::MATCH_FAIL => Some(FpModuleError::MatchFail),
            n => Some(FpModuleError::Other(n)),
        }
    }

    /// The SDK status code this error corresponds to. Session state errors
    /// have no SDK equivalent and report as connection errors, which is what
    /// the vendor library returns when called without an open device.
    pub fn code(&self) -> i32 {
        match self {
            FpModuleError::ConnectionError
            | FpModuleError::NotOpen
            | FpModuleError::AlreadyOpen
            | FpModuleError::Io(_) => code::CONNECTION_ERR,
            FpModuleError::Timeout => code::TIMEOUT,
            FpModuleError::EnrollFail => code::ENROLL_FAIL,
            FpModuleError::Param(_) => code::PARAM_ERR,
            FpModuleError::ExtractFail => code::EXTRACT_FAIL,
            FpModuleError::MatchFail => code::MATCH_FAIL,
            FpModuleError::Other(n) => *n,
        }
    }

    /// Whether another attempt of the same call might succeed. The library
    /// itself never retries.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FpModuleError::ConnectionError | FpModuleError::Timeout | FpModuleError::EnrollFail => {
                true
            }
            _ => false,
        }
    }
}

impl From<ParamContext> for FpModuleError {
    fn from(context: ParamContext) -> Self {
        FpModuleError::Param(context)
    }
}

impl From<std::io::Error> for FpModuleError {
    fn from(error: std::io::Error) -> Self {
        FpModuleError::Io(error.to_string())
    }
}
