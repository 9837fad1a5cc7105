use crate::Image;
use std::convert::TryFrom;
use std::fmt::{Display, Error, Formatter};

/// Kinds of messages the reader sends while enrolling. Values match the SDK
/// message enumeration.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Place a finger on the sensor.
    PressFinger = 0,
    /// Lift the finger from the sensor.
    RiseFinger = 1,
    /// Number of captures accepted so far.
    EnrollProgress = 2,
    /// Image of the capture that was just taken.
    CapturedImage = 3,
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let string = match self {
            MessageKind::PressFinger => "PressFinger",
            MessageKind::RiseFinger => "RiseFinger",
            MessageKind::EnrollProgress => "EnrollProgress",
            MessageKind::CapturedImage => "CapturedImage",
        };

        write!(f, "{}", string)
    }
}

impl TryFrom<u32> for MessageKind {
    type Error = crate::FpModuleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageKind::PressFinger),
            1 => Ok(MessageKind::RiseFinger),
            2 => Ok(MessageKind::EnrollProgress),
            3 => Ok(MessageKind::CapturedImage),
            n => Err(crate::FpModuleError::Other(n as i32)),
        }
    }
}

/// An event delivered to the installed handler during enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    PressFinger,
    RiseFinger,
    EnrollProgress(u32),
    CapturedImage(Image),
}

impl DeviceMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            DeviceMessage::PressFinger => MessageKind::PressFinger,
            DeviceMessage::RiseFinger => MessageKind::RiseFinger,
            DeviceMessage::EnrollProgress(_) => MessageKind::EnrollProgress,
            DeviceMessage::CapturedImage(_) => MessageKind::CapturedImage,
        }
    }
}

/// Observer invoked synchronously on the enrolling thread.
pub type MessageHandler = Box<dyn FnMut(&DeviceMessage) + Send>;
