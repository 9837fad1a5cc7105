use crate::{FpModuleError, ParamContext};
use std::convert::TryFrom;
use std::fmt;

/// Size of an enrolled template in bytes.
pub const TEMPLATE_SIZE: usize = 512;

/// Extracted features of one enrolled finger. Always exactly
/// `TEMPLATE_SIZE` bytes; the contents are opaque and only meaningful to the
/// driver that produced them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Template(Box<[u8; TEMPLATE_SIZE]>);

impl Template {
    pub fn new(bytes: [u8; TEMPLATE_SIZE]) -> Self {
        Template(Box::new(bytes))
    }

    /// Loads a template from a buffer previously obtained with `as_bytes()`.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> crate::Result<Self> {
        Self::try_from(bytes.as_ref())
    }

    pub fn as_bytes(&self) -> &[u8; TEMPLATE_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Template {
    type Error = FpModuleError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != TEMPLATE_SIZE {
            return Err(ParamContext::TemplateSize(value.len()).into());
        }

        let mut bytes = [0u8; TEMPLATE_SIZE];
        bytes.copy_from_slice(value);

        Ok(Template::new(bytes))
    }
}

impl AsRef<[u8]> for Template {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Template({:02x?}..)", &self.0[..8])
    }
}
