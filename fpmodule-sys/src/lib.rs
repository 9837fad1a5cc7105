//! Low level bindings to the FPModule fingerprint reader SDK.
//!
//! These mirror `FPModule_SDK.h` one to one. The library is located at build
//! time: set `FPMODULE_LIB_DIR` (and optionally `FPMODULE_LIB_NAME`, default
//! `FPModule_SDK`) to point at the vendor shared object, otherwise pkg-config
//! is asked for `fpmodule`.
//!
//! All functions use the `__stdcall` convention on 32-bit Windows, which is
//! what `extern "system"` selects; everywhere else it is the C convention.

#![warn(clippy::all)]
#![allow(non_camel_case_types, non_snake_case)]

use libc::{c_char, c_int, c_uchar, c_void};

/// Operation succeeded.
pub const FP_SUCCESS: c_int = 0;
/// Communication with the reader failed.
pub const FP_CONNECTION_ERR: c_int = 1;
/// No finger was captured before the timeout.
pub const FP_TIMEOUT: c_int = 2;
/// Enrollment could not build a template.
pub const FP_ENROLL_FAIL: c_int = 3;
/// An argument was rejected.
pub const FP_PARAM_ERR: c_int = 4;
/// Feature extraction failed.
pub const FP_EXTRACT_FAIL: c_int = 5;
/// Templates were compared and did not match.
pub const FP_MATCH_FAIL: c_int = 6;

/// Template size in bytes.
pub const FP_FTP_MAX: usize = 512;
pub const FP_IMAGE_WIDTH: usize = 256;
pub const FP_IMAGE_HEIGHT: usize = 360;
/// Size of the header of an 8-bit grayscale BMP, palette included.
pub const FP_BMP_HEADER: usize = 1078;

/// Length of the buffers filled by `FPModule_GetDeviceInfo` and
/// `FPModule_GetSDKVersion`.
pub const FP_INFO_LEN: usize = 64;

pub type FP_MSG_TYPE_T = u32;
pub const FP_MSG_TYPE_T_FP_MSG_PRESS_FINGER: FP_MSG_TYPE_T = 0;
pub const FP_MSG_TYPE_T_FP_MSG_RISE_FINGER: FP_MSG_TYPE_T = 1;
pub const FP_MSG_TYPE_T_FP_MSG_ENROLL_TIME: FP_MSG_TYPE_T = 2;
pub const FP_MSG_TYPE_T_FP_MSG_CAPTURED_IMAGE: FP_MSG_TYPE_T = 3;

/// Image passed along with `FP_MSG_CAPTURED_IMAGE`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct FP_IMAGE_DATA {
    pub dwWidth: c_int,
    pub dwHeight: c_int,
    pub pbyImage: *mut c_uchar,
}

pub type FpMessageHandler =
    Option<unsafe extern "system" fn(enMsgType: FP_MSG_TYPE_T, pMsgData: *mut c_void)>;

extern "system" {
    pub fn FPModule_OpenDevice() -> c_int;

    pub fn FPModule_CloseDevice() -> c_int;

    /// `pdwFpstatus` receives 0 for no finger, 1 for finger present.
    pub fn FPModule_DetectFinger(pdwFpstatus: *mut c_int) -> c_int;

    /// `pbyImageData` must hold at least `FP_IMAGE_WIDTH * FP_IMAGE_HEIGHT` bytes.
    pub fn FPModule_CaptureImage(
        pbyImageData: *mut c_uchar,
        pdwWidth: *mut c_int,
        pdwHeight: *mut c_int,
    ) -> c_int;

    /// Accepts 1 to 60 seconds.
    pub fn FPModule_SetTimeout(dwSecond: c_int) -> c_int;

    pub fn FPModule_GetTimeout(pdwSecond: *mut c_int) -> c_int;

    /// 0 selects the default 2 to 4 captures, other values a fixed count.
    pub fn FPModule_SetCollectTimes(dwTimes: c_int) -> c_int;

    pub fn FPModule_GetCollectTimes(pdwTimes: *mut c_int) -> c_int;

    pub fn FPModule_InstallMessageHandler(msgHandler: FpMessageHandler) -> c_int;

    /// `pbyFpTemplate` must hold `FP_FTP_MAX` bytes.
    pub fn FPModule_FpEnroll(pbyFpTemplate: *mut c_uchar) -> c_int;

    /// Returns a score between 0 and 100.
    pub fn FPModule_GetQuality(pbyFpTemplate: *mut c_uchar) -> c_int;

    /// `dwSecurityLevel` is 1 to 5.
    pub fn FPModule_MatchTemplate(
        pbyFpTemplate1: *mut c_uchar,
        pbyFpTemplate2: *mut c_uchar,
        dwSecurityLevel: c_int,
    ) -> c_int;

    /// `pbyDeviceInfo` must hold `FP_INFO_LEN` bytes.
    pub fn FPModule_GetDeviceInfo(pbyDeviceInfo: *mut c_char) -> c_int;

    /// `pbySDKVersion` must hold `FP_INFO_LEN` bytes.
    pub fn FPModule_GetSDKVersion(pbySDKVersion: *mut c_char) -> c_int;
}

// Names from the SDK's first interface, still defined by the header.
pub use self::{
    FPModule_CloseDevice as CloseDevice, FPModule_FpEnroll as FPEnroll,
    FPModule_GetDeviceInfo as GetDeviceInfo, FPModule_GetQuality as GetQuality,
    FPModule_GetSDKVersion as GetSDKVersion, FPModule_OpenDevice as OpenDevice,
};
