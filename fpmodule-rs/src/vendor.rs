use crate::driver::{decode_info, INFO_LEN};
use crate::errors::code;
use crate::{
    DeviceMessage, Driver, FpModuleError, Image, MessageKind, ParamContext, Template,
    TEMPLATE_SIZE,
};
use libc::{c_char, c_int, c_void};
use std::cell::Cell;
use std::convert::TryFrom;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// The SDK keeps one global connection and one global message handler.
static CLAIMED: AtomicBool = AtomicBool::new(false);

type Sink<'a> = &'a mut dyn FnMut(DeviceMessage);

thread_local! {
    // Points at the `Sink` of the enrollment running on this thread, null
    // otherwise.
    static SINK: Cell<*mut c_void> = Cell::new(std::ptr::null_mut());
}

/// Driver backed by the vendor library through `fpmodule-sys`.
///
/// Only one may exist per process; a second `VendorDriver::new()` fails with
/// `AlreadyOpen` until the first is dropped. The SDK must deliver enrollment
/// messages on the thread that called `enroll`, messages arriving anywhere
/// else are dropped.
#[derive(Debug)]
pub struct VendorDriver {
    _claim: (),
}

impl VendorDriver {
    pub fn new() -> crate::Result<Self> {
        if CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FpModuleError::AlreadyOpen);
        }

        let handler = on_message as unsafe extern "system" fn(_, _);
        let status = unsafe { fpmodule_sys::FPModule_InstallMessageHandler(Some(handler)) };
        if let Err(error) = check(status) {
            CLAIMED.store(false, Ordering::Release);
            return Err(error);
        }

        Ok(VendorDriver { _claim: () })
    }
}

impl Drop for VendorDriver {
    fn drop(&mut self) {
        unsafe { fpmodule_sys::FPModule_InstallMessageHandler(None) };
        CLAIMED.store(false, Ordering::Release);
    }
}

fn check(status: c_int) -> crate::Result<()> {
    match FpModuleError::from_code(status) {
        None => Ok(()),
        Some(error) => Err(error),
    }
}

struct SinkGuard;

impl SinkGuard {
    fn install(sink: &mut Sink<'_>) -> Self {
        let pointer = sink as *mut Sink<'_> as *mut c_void;
        SINK.with(|slot| slot.set(pointer));

        SinkGuard
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        SINK.with(|slot| slot.set(std::ptr::null_mut()));
    }
}

unsafe extern "system" fn on_message(kind: fpmodule_sys::FP_MSG_TYPE_T, data: *mut c_void) {
    let sink = SINK.with(Cell::get);
    if sink.is_null() {
        return;
    }

    let message = match decode_message(kind, data) {
        Some(message) => message,
        None => {
            warn!(kind, "Dropping malformed reader message");
            return;
        }
    };

    // Unwinding into the SDK is undefined behaviour.
    let sink = &mut *(sink as *mut Sink<'_>);
    if catch_unwind(AssertUnwindSafe(|| (*sink)(message))).is_err() {
        warn!("Message handler panicked");
    }
}

unsafe fn decode_message(kind: fpmodule_sys::FP_MSG_TYPE_T, data: *mut c_void) -> Option<DeviceMessage> {
    match MessageKind::try_from(kind).ok()? {
        MessageKind::PressFinger => Some(DeviceMessage::PressFinger),
        MessageKind::RiseFinger => Some(DeviceMessage::RiseFinger),
        MessageKind::EnrollProgress => {
            let count = (data as *const c_int).as_ref()?;
            progress_count(*count).map(DeviceMessage::EnrollProgress)
        }
        MessageKind::CapturedImage => {
            let image = (data as *const fpmodule_sys::FP_IMAGE_DATA).as_ref()?;
            if image.pbyImage.is_null() || image.dwWidth <= 0 || image.dwHeight <= 0 {
                return None;
            }

            let len = image.dwWidth as usize * image.dwHeight as usize;
            let pixels = std::slice::from_raw_parts(image.pbyImage, len).to_vec();
            Image::new(image.dwWidth as u32, image.dwHeight as u32, pixels)
                .ok()
                .map(DeviceMessage::CapturedImage)
        }
    }
}

fn progress_count(count: c_int) -> Option<u32> {
    u32::try_from(count).ok()
}

impl Driver for VendorDriver {
    fn open(&mut self) -> crate::Result<()> {
        check(unsafe { fpmodule_sys::FPModule_OpenDevice() })
    }

    fn close(&mut self) -> crate::Result<()> {
        check(unsafe { fpmodule_sys::FPModule_CloseDevice() })
    }

    fn detect_finger(&mut self) -> crate::Result<bool> {
        let mut status: c_int = 0;
        check(unsafe { fpmodule_sys::FPModule_DetectFinger(&mut status) })?;

        Ok(status == 1)
    }

    fn capture_image(&mut self) -> crate::Result<Image> {
        let mut buffer =
            vec![0u8; fpmodule_sys::FP_IMAGE_WIDTH * fpmodule_sys::FP_IMAGE_HEIGHT];
        let mut width: c_int = 0;
        let mut height: c_int = 0;
        check(unsafe {
            fpmodule_sys::FPModule_CaptureImage(buffer.as_mut_ptr(), &mut width, &mut height)
        })?;

        if width <= 0 || height <= 0 {
            return Err(ParamContext::ImageBuffer.into());
        }
        let len = width as usize * height as usize;
        if len > buffer.len() {
            return Err(ParamContext::ImageBuffer.into());
        }
        buffer.truncate(len);

        Image::new(width as u32, height as u32, buffer)
    }

    fn set_timeout(&mut self, seconds: u32) -> crate::Result<()> {
        check(unsafe { fpmodule_sys::FPModule_SetTimeout(seconds as c_int) })
    }

    fn get_timeout(&mut self) -> crate::Result<u32> {
        let mut seconds: c_int = 0;
        check(unsafe { fpmodule_sys::FPModule_GetTimeout(&mut seconds) })?;

        Ok(seconds as u32)
    }

    fn set_collect_times(&mut self, times: u32) -> crate::Result<()> {
        check(unsafe { fpmodule_sys::FPModule_SetCollectTimes(times as c_int) })
    }

    fn get_collect_times(&mut self) -> crate::Result<u32> {
        let mut times: c_int = 0;
        check(unsafe { fpmodule_sys::FPModule_GetCollectTimes(&mut times) })?;

        Ok(times as u32)
    }

    fn enroll(&mut self, messages: &mut dyn FnMut(DeviceMessage)) -> crate::Result<Template> {
        let mut template = [0u8; TEMPLATE_SIZE];
        let mut sink: Sink<'_> = messages;

        let status = {
            let _guard = SinkGuard::install(&mut sink);
            unsafe { fpmodule_sys::FPModule_FpEnroll(template.as_mut_ptr()) }
        };
        check(status)?;

        Ok(Template::new(template))
    }

    fn get_quality(&mut self, template: &Template) -> crate::Result<u8> {
        // The SDK takes a mutable pointer even though it only reads.
        let mut bytes = *template.as_bytes();
        let score = unsafe { fpmodule_sys::FPModule_GetQuality(bytes.as_mut_ptr()) };

        if (0..=100).contains(&score) {
            Ok(score as u8)
        } else {
            Err(FpModuleError::Other(score))
        }
    }

    fn match_templates(
        &mut self,
        first: &Template,
        second: &Template,
        security_level: u32,
    ) -> crate::Result<bool> {
        let mut first = *first.as_bytes();
        let mut second = *second.as_bytes();
        let status = unsafe {
            fpmodule_sys::FPModule_MatchTemplate(
                first.as_mut_ptr(),
                second.as_mut_ptr(),
                security_level as c_int,
            )
        };

        match status {
            code::SUCCESS => Ok(true),
            code::MATCH_FAIL => Ok(false),
            status => check(status).map(|_| false),
        }
    }

    fn get_device_info(&mut self) -> crate::Result<String> {
        let mut buffer = [0 as c_char; INFO_LEN];
        check(unsafe { fpmodule_sys::FPModule_GetDeviceInfo(buffer.as_mut_ptr()) })?;

        Ok(decode_c_buffer(&buffer))
    }

    fn get_sdk_version(&mut self) -> crate::Result<String> {
        let mut buffer = [0 as c_char; INFO_LEN];
        check(unsafe { fpmodule_sys::FPModule_GetSDKVersion(buffer.as_mut_ptr()) })?;

        Ok(decode_c_buffer(&buffer))
    }
}

fn decode_c_buffer(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer.iter().map(|&c| c as u8).collect();

    decode_info(&bytes)
}
