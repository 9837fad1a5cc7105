use crate::{FpModuleError, ParamContext};
use ::image::{DynamicImage, GrayImage, ImageOutputFormat};
use std::io::Cursor;
use std::path::Path;

/// Width of images produced by the reader.
pub const IMAGE_WIDTH: u32 = 256;
/// Height of images produced by the reader.
pub const IMAGE_HEIGHT: u32 = 360;
/// Size of the header written in front of the pixels by `Image::to_bmp`:
/// file header, info header and a 256 entry grayscale palette.
pub const BMP_HEADER_SIZE: usize = 1078;

/// A grayscale fingerprint image, one byte per pixel, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl Image {
    /// Wraps a raw pixel buffer. The buffer must hold exactly
    /// `width * height` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> crate::Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(ParamContext::ImageBuffer.into());
        }

        Ok(Image {
            width,
            height,
            data,
        })
    }

    /// Gets the pixel width of an image.
    pub fn get_width(&self) -> u32 {
        self.width
    }

    /// Gets the pixel height of an image.
    pub fn get_height(&self) -> u32 {
        self.height
    }

    /// Gets the greyscale data for an image.
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// Encodes the image as an 8-bit grayscale BMP.
    pub fn to_bmp(&self) -> crate::Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::with_capacity(BMP_HEADER_SIZE + self.data.len()));
        DynamicImage::ImageLuma8(self.to_gray_image()?)
            .write_to(&mut buffer, ImageOutputFormat::Bmp)
            .map_err(|error| FpModuleError::Io(error.to_string()))?;

        Ok(buffer.into_inner())
    }

    /// A quick convenience function to save an image to a file in BMP format.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let bmp = self.to_bmp()?;
        std::fs::write(path, bmp)?;

        Ok(())
    }

    fn to_gray_image(&self) -> crate::Result<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or(FpModuleError::Param(ParamContext::ImageBuffer))
    }
}
