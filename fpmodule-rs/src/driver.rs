use crate::{DeviceMessage, Image, Template};

/// Length of the descriptive strings reported by the SDK, terminator included.
pub const INFO_LEN: usize = 64;

/// The backend a `Device` forwards to. In production this is the vendor
/// library (`VendorDriver`); `SimulatedDriver` stands in for it when no reader
/// is attached.
///
/// Implementations may assume arguments are already validated: timeouts are
/// 1..=60, collect times 0..=4 and security levels 1..=5. Calls are never made
/// concurrently and never retried by the session.
pub trait Driver {
    /// Establishes communication with the reader.
    fn open(&mut self) -> crate::Result<()>;

    /// Releases the reader.
    fn close(&mut self) -> crate::Result<()>;

    /// Reports whether a finger is on the sensor right now, without waiting.
    fn detect_finger(&mut self) -> crate::Result<bool>;

    /// Waits for a finger for at most the configured timeout and returns its
    /// image.
    fn capture_image(&mut self) -> crate::Result<Image>;

    fn set_timeout(&mut self, seconds: u32) -> crate::Result<()>;

    fn get_timeout(&mut self) -> crate::Result<u32>;

    fn set_collect_times(&mut self, times: u32) -> crate::Result<()>;

    fn get_collect_times(&mut self) -> crate::Result<u32>;

    /// Runs a complete enrollment, reporting progress through `messages` in
    /// the order the reader produces them.
    fn enroll(&mut self, messages: &mut dyn FnMut(DeviceMessage)) -> crate::Result<Template>;

    /// Scores a template between 0 and 100.
    fn get_quality(&mut self, template: &Template) -> crate::Result<u8>;

    /// Compares two templates. A rejection is `Ok(false)`.
    fn match_templates(
        &mut self,
        first: &Template,
        second: &Template,
        security_level: u32,
    ) -> crate::Result<bool>;

    /// Retrieves the reader's descriptive version string.
    fn get_device_info(&mut self) -> crate::Result<String>;

    /// Retrieves the SDK's version string.
    fn get_sdk_version(&mut self) -> crate::Result<String>;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn open(&mut self) -> crate::Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> crate::Result<()> {
        (**self).close()
    }

    fn detect_finger(&mut self) -> crate::Result<bool> {
        (**self).detect_finger()
    }

    fn capture_image(&mut self) -> crate::Result<Image> {
        (**self).capture_image()
    }

    fn set_timeout(&mut self, seconds: u32) -> crate::Result<()> {
        (**self).set_timeout(seconds)
    }

    fn get_timeout(&mut self) -> crate::Result<u32> {
        (**self).get_timeout()
    }

    fn set_collect_times(&mut self, times: u32) -> crate::Result<()> {
        (**self).set_collect_times(times)
    }

    fn get_collect_times(&mut self) -> crate::Result<u32> {
        (**self).get_collect_times()
    }

    fn enroll(&mut self, messages: &mut dyn FnMut(DeviceMessage)) -> crate::Result<Template> {
        (**self).enroll(messages)
    }

    fn get_quality(&mut self, template: &Template) -> crate::Result<u8> {
        (**self).get_quality(template)
    }

    fn match_templates(
        &mut self,
        first: &Template,
        second: &Template,
        security_level: u32,
    ) -> crate::Result<bool> {
        (**self).match_templates(first, second, security_level)
    }

    fn get_device_info(&mut self) -> crate::Result<String> {
        (**self).get_device_info()
    }

    fn get_sdk_version(&mut self) -> crate::Result<String> {
        (**self).get_sdk_version()
    }
}

/// Decodes a fixed-length, NUL-terminated string buffer as filled by the SDK.
/// A buffer without terminator is taken whole.
pub fn decode_info(buffer: &[u8]) -> String {
    let end = buffer
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(buffer.len());

    String::from_utf8_lossy(&buffer[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_stops_at_terminator() {
        let mut buffer = [0u8; INFO_LEN];
        buffer[..7].copy_from_slice(b"FP-1000");
        buffer[8] = b'x';

        assert_eq!(decode_info(&buffer), "FP-1000");
    }

    #[test]
    fn decode_without_terminator() {
        let buffer = [b'a'; INFO_LEN];

        assert_eq!(decode_info(&buffer).len(), INFO_LEN);
    }

    #[test]
    fn decode_trims_padding() {
        assert_eq!(decode_info(b"V1.2   \0"), "V1.2");
    }
}
