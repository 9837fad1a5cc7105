use fpmodule_rs::{Device, Driver, FpModuleError, Template};
use std::io::stdin;

const TEMPLATE_PATH: &str = "finger.fpt";
const SECURITY_LEVEL: u32 = 3;

#[cfg(feature = "vendor")]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    Ok(Box::new(fpmodule_rs::VendorDriver::new()?))
}

#[cfg(not(feature = "vendor"))]
fn driver() -> Result<Box<dyn Driver>, FpModuleError> {
    use fpmodule_rs::{Impression, SimulatedDriver};

    let mut driver = SimulatedDriver::new();
    for finger in &[1, 2] {
        driver.present(Impression::finger(*finger).with_noise(10, 20));
        driver.present(Impression::finger(*finger).with_noise(11, 20));
    }

    Ok(Box::new(driver))
}

fn main() -> Result<(), FpModuleError> {
    tracing_subscriber::fmt::init();

    let mut device = Device::new(driver()?);
    device.open()?;

    println!("Opened device. Loading previously enrolled template...");
    let stored = Template::from_bytes(std::fs::read(TEMPLATE_PATH)?)?;
    println!("Template loaded. Time to verify!");

    loop {
        println!("Scan your finger now.");
        match device.enroll() {
            Ok(candidate) => {
                if device.match_templates(&stored, &candidate, SECURITY_LEVEL)? {
                    println!("MATCH!");
                } else {
                    println!("NO MATCH!");
                }
            }
            Err(error) if error.is_recoverable() => {
                println!("Scan didn't quite work ({}). Please try again.", error)
            }
            Err(error) => return Err(error),
        }

        println!("Press Enter to verify again or Ctrl+C to cancel.");
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return device.close();
        }
    }
}
