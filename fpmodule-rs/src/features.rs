//! Feature handling used by `SimulatedDriver`.
//!
//! None of this is a fingerprint algorithm. A template is the mean intensity of
//! each cell of a 16 × 32 grid laid over the image, which is enough to tell the
//! simulator's synthetic fingers apart and to keep quality and matching
//! deterministic.

use crate::config::check_security_level;
use crate::{FpModuleError, Image, Template, TEMPLATE_SIZE};

pub(crate) const CELL_COLUMNS: u32 = 16;
pub(crate) const CELL_ROWS: u32 = 32;

/// Two cells closer than this count as equal.
const CELL_TOLERANCE: u8 = 16;

/// Minimum similarity for each security level, most permissive first.
const THRESHOLDS: [u8; 5] = [60, 70, 80, 88, 94];

/// Similarity enrollment samples need to be fused together.
pub(crate) const CONSISTENCY: u8 = THRESHOLDS[3];

/// Samples scoring lower than this are not accepted for enrollment.
pub(crate) const MIN_QUALITY: u8 = 20;

pub(crate) fn extract(image: &Image) -> crate::Result<Template> {
    let cell_width = image.get_width() / CELL_COLUMNS;
    let cell_height = image.get_height() / CELL_ROWS;
    if cell_width == 0 || cell_height == 0 {
        return Err(FpModuleError::ExtractFail);
    }

    let mut cells = [0u8; TEMPLATE_SIZE];
    for (index, cell) in cells.iter_mut().enumerate() {
        let column = index as u32 % CELL_COLUMNS;
        let row = index as u32 / CELL_COLUMNS;

        let mut sum = 0u32;
        for y in row * cell_height..(row + 1) * cell_height {
            for x in column * cell_width..(column + 1) * cell_width {
                sum += u32::from(image.pixel(x, y));
            }
        }

        *cell = (sum / (cell_width * cell_height)) as u8;
    }

    Ok(Template::new(cells))
}

/// Contrast of the cells, 0 for a flat image and 100 from a standard
/// deviation of 64 upwards.
pub(crate) fn quality(template: &Template) -> u8 {
    let cells = template.as_bytes();
    let count = cells.len() as f64;
    let mean = cells.iter().map(|&cell| f64::from(cell)).sum::<f64>() / count;
    let variance = cells
        .iter()
        .map(|&cell| (f64::from(cell) - mean).powi(2))
        .sum::<f64>()
        / count;

    (variance.sqrt() * 100.0 / 64.0).min(100.0) as u8
}

/// Percentage of cells that agree between two templates.
pub(crate) fn similarity(first: &Template, second: &Template) -> u8 {
    let agreeing = first
        .as_bytes()
        .iter()
        .zip(second.as_bytes().iter())
        .filter(|(a, b)| (**a as i16 - **b as i16).abs() <= i16::from(CELL_TOLERANCE))
        .count();

    (agreeing * 100 / TEMPLATE_SIZE) as u8
}

pub(crate) fn threshold(security_level: u32) -> crate::Result<u8> {
    let level = check_security_level(security_level)?;

    Ok(THRESHOLDS[level as usize - 1])
}

/// Averages samples cell by cell.
pub(crate) fn fuse(samples: &[&Template]) -> Template {
    let mut cells = [0u8; TEMPLATE_SIZE];
    let count = samples.len().max(1) as u32;
    for (index, cell) in cells.iter_mut().enumerate() {
        let sum: u32 = samples
            .iter()
            .map(|sample| u32::from(sample.as_bytes()[index]))
            .sum();
        *cell = ((sum + count / 2) / count) as u8;
    }

    Template::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IMAGE_HEIGHT, IMAGE_WIDTH};
    use proptest::prelude::*;

    fn flat(value: u8) -> Image {
        Image::new(
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
            vec![value; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize],
        )
        .unwrap()
    }

    #[test]
    fn flat_image_has_no_quality() {
        let template = extract(&flat(128)).unwrap();

        assert!(template.as_bytes().iter().all(|&cell| cell == 128));
        assert_eq!(quality(&template), 0);
    }

    #[test]
    fn tiny_image_cannot_be_extracted() {
        let image = Image::new(8, 8, vec![0; 64]).unwrap();

        match extract(&image) {
            Err(FpModuleError::ExtractFail) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extremes_have_full_quality() {
        let mut cells = [0u8; TEMPLATE_SIZE];
        cells.iter_mut().step_by(2).for_each(|cell| *cell = 255);

        assert_eq!(quality(&Template::new(cells)), 100);
    }

    #[test]
    fn thresholds_grow_with_level() {
        let levels: Vec<u8> = (1..=5).map(|level| threshold(level).unwrap()).collect();

        assert!(levels.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(threshold(0).is_err());
        assert!(threshold(6).is_err());
    }

    #[test]
    fn fuse_rounds_mean() {
        let low = Template::new([10; TEMPLATE_SIZE]);
        let high = Template::new([13; TEMPLATE_SIZE]);

        assert_eq!(fuse(&[&low, &high]).as_bytes()[0], 12);
    }

    proptest! {
        #[test]
        fn quality_is_bounded(bytes in proptest::collection::vec(any::<u8>(), TEMPLATE_SIZE)) {
            let template = Template::from_bytes(&bytes).unwrap();
            prop_assert!(quality(&template) <= 100);
        }

        #[test]
        fn template_is_similar_to_itself(bytes in proptest::collection::vec(any::<u8>(), TEMPLATE_SIZE)) {
            let template = Template::from_bytes(&bytes).unwrap();
            prop_assert_eq!(similarity(&template, &template), 100);
        }
    }
}
