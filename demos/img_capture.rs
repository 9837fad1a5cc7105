use fpmodule_rs::{Device, Driver, FpModuleError};

#[cfg(feature = "vendor")]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    Ok(Box::new(fpmodule_rs::VendorDriver::new()?))
}

#[cfg(not(feature = "vendor"))]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    use fpmodule_rs::{Impression, SimulatedDriver};
    use std::time::Duration;

    let mut driver = SimulatedDriver::new();
    driver.present(Impression::finger(1).after(Duration::from_secs(2)));

    Ok(Box::new(driver))
}

fn main() -> Result<(), FpModuleError> {
    tracing_subscriber::fmt::init();

    let mut device = Device::new(driver()?);
    device.open()?;

    println!(
        "Opened device. It's now time to scan your finger ({} seconds).",
        device.get_timeout()?
    );
    if device.detect_finger()? {
        println!("A finger is already on the sensor.");
    }

    let image = device.capture_image()?;
    image.save_to_file("finger.bmp")?;
    println!(
        "Saved a {}x{} image to finger.bmp",
        image.get_width(),
        image.get_height()
    );

    device.close()
}
