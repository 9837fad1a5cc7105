use crate::features::{self, CONSISTENCY, MIN_QUALITY};
use crate::{
    DeviceMessage, Driver, FpModuleError, Image, Template, IMAGE_HEIGHT, IMAGE_WIDTH,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

const DEVICE_INFO: &str = "FPModule Simulator SN0000000001 FW1.0";
const SDK_VERSION: &str = "FPModule SDK 1.0.0 (simulated)";

/// Amplitude of the ridge pattern drawn over every synthetic finger.
const RIDGE_AMPLITUDE: f64 = 30.0;
/// Ridge period in pixels.
const RIDGE_PERIOD: f64 = 6.0;

/// One finger presentation queued on a `SimulatedDriver`.
#[derive(Debug, Clone)]
pub struct Impression {
    image: Image,
    delay: Duration,
}

impl Impression {
    /// Presents an arbitrary image immediately.
    pub fn new(image: Image) -> Self {
        Impression {
            image,
            delay: Duration::from_secs(0),
        }
    }

    /// Renders a synthetic print. The same seed always gives the same finger;
    /// different seeds give fingers that do not match each other.
    pub fn finger(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let columns = features::CELL_COLUMNS as usize;
        let rows = features::CELL_ROWS as usize;
        let bases: Vec<f64> = (0..columns * rows)
            .map(|_| f64::from(rng.gen_range(40u8..=215)))
            .collect();
        let angle = rng.gen_range(0.0..std::f64::consts::PI);
        let (sin, cos) = angle.sin_cos();

        let cell_width = IMAGE_WIDTH / features::CELL_COLUMNS;
        let cell_height = IMAGE_HEIGHT / features::CELL_ROWS;
        let mut data = Vec::with_capacity((IMAGE_WIDTH * IMAGE_HEIGHT) as usize);
        for y in 0..IMAGE_HEIGHT {
            let row = ((y / cell_height) as usize).min(rows - 1);
            for x in 0..IMAGE_WIDTH {
                let column = (x / cell_width) as usize;
                let phase = (f64::from(x) * cos + f64::from(y) * sin) * 2.0
                    * std::f64::consts::PI
                    / RIDGE_PERIOD;
                let value = bases[row * columns + column] + RIDGE_AMPLITUDE * phase.sin();
                data.push(value.round().max(0.0).min(255.0) as u8);
            }
        }

        Impression::new(Image {
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            data,
        })
    }

    /// A featureless gray image, as left by a smudged or dry finger.
    pub fn blank() -> Self {
        Impression::new(Image {
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            data: vec![128; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize],
        })
    }

    /// Adds uniform per-pixel noise of at most `amplitude` levels.
    pub fn with_noise(mut self, seed: u64, amplitude: u8) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let amplitude = i16::from(amplitude);
        for pixel in self.image.data.iter_mut() {
            let noise = rng.gen_range(-amplitude..=amplitude);
            *pixel = (i16::from(*pixel) + noise).max(0).min(255) as u8;
        }

        self
    }

    /// Delays the finger landing on the sensor.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// An in-process fingerprint reader. Fingers are queued with `present` and
/// consumed by captures; time only passes inside captures, so a timeout is
/// reported at once instead of by sleeping.
#[derive(Debug)]
pub struct SimulatedDriver {
    reachable: bool,
    open: bool,
    timeout: u32,
    collect_times: u32,
    queue: VecDeque<Impression>,
}

impl SimulatedDriver {
    pub const DEFAULT_TIMEOUT: u32 = 10;

    pub fn new() -> Self {
        SimulatedDriver {
            reachable: true,
            open: false,
            timeout: Self::DEFAULT_TIMEOUT,
            collect_times: 0,
            queue: VecDeque::new(),
        }
    }

    /// Unplugs (`false`) or replugs (`true`) the reader. While unplugged every
    /// call that talks to the hardware fails with `ConnectionError`.
    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
    }

    /// Queues a finger presentation.
    pub fn present(&mut self, impression: Impression) {
        self.queue.push_back(impression);
    }

    /// Number of presentations not yet captured.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn link(&self) -> crate::Result<()> {
        if self.reachable && self.open {
            Ok(())
        } else {
            Err(FpModuleError::ConnectionError)
        }
    }

    fn next_capture(&mut self) -> crate::Result<Image> {
        let window = Duration::from_secs(u64::from(self.timeout));
        let delay = match self.queue.front() {
            Some(impression) => impression.delay,
            None => {
                trace!("capture timed out, no finger queued");
                return Err(FpModuleError::Timeout);
            }
        };

        if delay > window {
            // The whole window passed without the finger landing.
            if let Some(impression) = self.queue.front_mut() {
                impression.delay -= window;
            }
            trace!(?delay, "capture timed out");
            return Err(FpModuleError::Timeout);
        }

        trace!(?delay, "finger captured");
        self.queue
            .pop_front()
            .map(|impression| impression.image)
            .ok_or(FpModuleError::Timeout)
    }
}

/// Extracts an enrollment sample, `None` when the image has too few pixels or
/// too little contrast.
fn usable_sample(image: &Image) -> Option<Template> {
    let sample = match features::extract(image) {
        Ok(sample) => sample,
        Err(error) => {
            trace!(%error, "enrollment capture rejected");
            return None;
        }
    };

    let quality = features::quality(&sample);
    trace!(quality, "enrollment sample captured");
    if quality < MIN_QUALITY {
        return None;
    }

    Some(sample)
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SimulatedDriver {
    fn open(&mut self) -> crate::Result<()> {
        if !self.reachable {
            return Err(FpModuleError::ConnectionError);
        }

        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> crate::Result<()> {
        if !self.reachable {
            return Err(FpModuleError::ConnectionError);
        }

        self.open = false;
        Ok(())
    }

    fn detect_finger(&mut self) -> crate::Result<bool> {
        self.link()?;

        Ok(self
            .queue
            .front()
            .map_or(false, |impression| impression.delay == Duration::from_secs(0)))
    }

    fn capture_image(&mut self) -> crate::Result<Image> {
        self.link()?;
        self.next_capture()
    }

    fn set_timeout(&mut self, seconds: u32) -> crate::Result<()> {
        self.link()?;
        self.timeout = seconds;
        Ok(())
    }

    fn get_timeout(&mut self) -> crate::Result<u32> {
        self.link()?;
        Ok(self.timeout)
    }

    fn set_collect_times(&mut self, times: u32) -> crate::Result<()> {
        self.link()?;
        self.collect_times = times;
        Ok(())
    }

    fn get_collect_times(&mut self) -> crate::Result<u32> {
        self.link()?;
        Ok(self.collect_times)
    }

    fn enroll(&mut self, messages: &mut dyn FnMut(DeviceMessage)) -> crate::Result<Template> {
        self.link()?;

        let adaptive = self.collect_times == 0;
        let attempts = if adaptive { 4 } else { self.collect_times };
        let mut samples: Vec<Template> = Vec::with_capacity(attempts as usize);

        for attempt in 1..=attempts {
            messages(DeviceMessage::PressFinger);
            let image = self.next_capture()?;
            let sample = usable_sample(&image);
            messages(DeviceMessage::CapturedImage(image));
            messages(DeviceMessage::RiseFinger);
            messages(DeviceMessage::EnrollProgress(attempt));

            // A rejected capture still uses up its attempt.
            let latest = match sample {
                Some(sample) => sample,
                None => continue,
            };
            samples.push(latest);

            if adaptive && attempt >= 2 {
                // Fuse the captures agreeing with the latest one, outliers left out.
                let latest = &samples[samples.len() - 1];
                let agreeing: Vec<&Template> = samples
                    .iter()
                    .filter(|sample| features::similarity(sample, latest) >= CONSISTENCY)
                    .collect();
                if agreeing.len() >= 2 {
                    return Ok(features::fuse(&agreeing));
                }
            }
        }

        if adaptive || samples.len() < attempts as usize {
            return Err(FpModuleError::EnrollFail);
        }

        let consistent = samples.iter().enumerate().all(|(index, first)| {
            samples[index + 1..]
                .iter()
                .all(|second| features::similarity(first, second) >= CONSISTENCY)
        });
        if !consistent {
            return Err(FpModuleError::EnrollFail);
        }

        let all: Vec<&Template> = samples.iter().collect();
        Ok(features::fuse(&all))
    }

    fn get_quality(&mut self, template: &Template) -> crate::Result<u8> {
        Ok(features::quality(template))
    }

    fn match_templates(
        &mut self,
        first: &Template,
        second: &Template,
        security_level: u32,
    ) -> crate::Result<bool> {
        let threshold = features::threshold(security_level)?;
        let similarity = features::similarity(first, second);
        trace!(similarity, threshold, "templates compared");

        Ok(similarity >= threshold)
    }

    fn get_device_info(&mut self) -> crate::Result<String> {
        self.link()?;
        Ok(DEVICE_INFO.to_string())
    }

    fn get_sdk_version(&mut self) -> crate::Result<String> {
        Ok(SDK_VERSION.to_string())
    }
}
