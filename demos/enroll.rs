use fpmodule_rs::{Device, DeviceConfig, DeviceMessage, Driver, FpModuleError};
use std::io::{stdin, Read};

const TEMPLATE_PATH: &str = "finger.fpt";

#[cfg(feature = "vendor")]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    Ok(Box::new(fpmodule_rs::VendorDriver::new()?))
}

#[cfg(not(feature = "vendor"))]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    use fpmodule_rs::{Impression, SimulatedDriver};

    let mut driver = SimulatedDriver::new();
    for noise in 0..4 {
        driver.present(Impression::finger(1).with_noise(noise, 20));
    }

    Ok(Box::new(driver))
}

fn main() -> Result<(), FpModuleError> {
    tracing_subscriber::fmt::init();

    println!(
        "This program will enroll a finger and save its template to `{}`, \
         unconditionally overwriting any template saved there previously. \
         If you want to continue, press enter, otherwise hit Ctrl+C",
        TEMPLATE_PATH
    );

    let _ = stdin().read(&mut [0u8]);

    let config = DeviceConfig::new().with_timeout(15);
    let mut device = Device::with_config(driver()?, config);
    device.open()?;
    println!("Opened device: {}", device.get_device_info()?);

    device.install_message_handler(|message| match message {
        DeviceMessage::PressFinger => println!("Scan your finger now."),
        DeviceMessage::CapturedImage(image) => println!(
            "Got a {}x{} image.",
            image.get_width(),
            image.get_height()
        ),
        DeviceMessage::RiseFinger => println!("Lift your finger."),
        DeviceMessage::EnrollProgress(count) => println!("Capture {} accepted. Yay!", count),
    });

    let template = match device.enroll() {
        Ok(template) => template,
        Err(FpModuleError::EnrollFail) => {
            println!("Enroll failed, the captures did not agree :(");
            return Ok(());
        }
        Err(FpModuleError::Timeout) => {
            println!("No finger within the timeout, please try again.");
            return Ok(());
        }
        Err(error) => return Err(error),
    };

    println!(
        "Enrollment completed! Template quality: {}",
        device.get_quality(&template)?
    );

    std::fs::write(TEMPLATE_PATH, template.as_bytes())?;
    println!("Template saved");

    device.close()
}
