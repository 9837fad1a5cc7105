use fpmodule_rs::{
    Device, DeviceMessage, FpModuleError, Image, Impression, MessageKind, ParamContext,
    SimulatedDriver, Template, TEMPLATE_SIZE,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn opened() -> Device<SimulatedDriver> {
    init_tracing();
    let mut device = Device::new(SimulatedDriver::new());
    device.open().unwrap();
    device
}

fn record(device: &mut Device<SimulatedDriver>) -> Arc<Mutex<Vec<DeviceMessage>>> {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    device.install_message_handler(move |message| sink.lock().unwrap().push(message.clone()));
    messages
}

fn progress(messages: &[DeviceMessage]) -> Vec<u32> {
    messages
        .iter()
        .filter_map(|message| match message {
            DeviceMessage::EnrollProgress(count) => Some(*count),
            _ => None,
        })
        .collect()
}

fn enroll_finger(device: &mut Device<SimulatedDriver>, seed: u64) -> Template {
    device.driver_mut().present(Impression::finger(seed).with_noise(seed + 100, 20));
    device.driver_mut().present(Impression::finger(seed).with_noise(seed + 200, 20));
    device.enroll().unwrap()
}

proptest! {
    #[test]
    fn timeout_round_trips(seconds in 1u32..=60) {
        let mut device = opened();
        device.set_timeout(seconds).unwrap();
        prop_assert_eq!(device.get_timeout().unwrap(), seconds);
    }

    #[test]
    fn out_of_range_timeout_keeps_previous(seconds in prop_oneof![Just(0u32), 61u32..]) {
        let mut device = opened();
        device.set_timeout(30).unwrap();

        match device.set_timeout(seconds) {
            Err(FpModuleError::Param(ParamContext::Timeout(rejected))) => prop_assert_eq!(rejected, seconds),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        prop_assert_eq!(device.get_timeout().unwrap(), 30);
    }

    #[test]
    fn collect_times_round_trips(times in 0u32..=4) {
        let mut device = opened();
        device.set_collect_times(times).unwrap();
        prop_assert_eq!(device.get_collect_times().unwrap(), times);
    }

    #[test]
    fn out_of_range_collect_times_keeps_previous(times in 5u32..) {
        let mut device = opened();
        device.set_collect_times(2).unwrap();

        match device.set_collect_times(times) {
            Err(FpModuleError::Param(ParamContext::CollectTimes(rejected))) => prop_assert_eq!(rejected, times),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        prop_assert_eq!(device.get_collect_times().unwrap(), 2);
    }

    #[test]
    fn template_matches_itself(
        bytes in proptest::collection::vec(any::<u8>(), TEMPLATE_SIZE),
        level in 1u32..=5,
    ) {
        let mut device = Device::new(SimulatedDriver::new());
        let template = Template::from_bytes(&bytes).unwrap();
        prop_assert!(device.match_templates(&template, &template, level).unwrap());
    }

    #[test]
    fn quality_is_a_percentage(bytes in proptest::collection::vec(any::<u8>(), TEMPLATE_SIZE)) {
        let mut device = Device::new(SimulatedDriver::new());
        let template = Template::from_bytes(&bytes).unwrap();
        prop_assert!(device.get_quality(&template).unwrap() <= 100);
    }

    #[test]
    fn malformed_template_is_a_parameter_error(len in (0usize..2048).prop_filter("valid size", |len| *len != TEMPLATE_SIZE)) {
        let bytes = vec![0u8; len];
        match Template::from_bytes(&bytes) {
            Err(FpModuleError::Param(ParamContext::TemplateSize(size))) => prop_assert_eq!(size, len),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}

#[test]
fn invalid_security_level_is_rejected() {
    let mut device = Device::new(SimulatedDriver::new());
    let template = Template::new([1; TEMPLATE_SIZE]);

    for level in &[0u32, 6, 100] {
        match device.match_templates(&template, &template, *level) {
            Err(FpModuleError::Param(ParamContext::SecurityLevel(rejected))) => {
                assert_eq!(rejected, *level)
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn capture_without_finger_times_out() {
    let mut device = opened();
    device.set_timeout(10).unwrap();
    device
        .driver_mut()
        .present(Impression::finger(1).after(Duration::from_secs(11)));

    match device.capture_image() {
        Err(FpModuleError::Timeout) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn capture_with_nothing_queued_times_out() {
    let mut device = opened();

    assert!(matches!(device.capture_image(), Err(FpModuleError::Timeout)));
}

#[test]
fn adaptive_enrollment_stops_once_two_captures_agree() {
    let mut device = opened();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(3));
    device.driver_mut().present(Impression::finger(3).with_noise(1, 25));

    device.enroll().unwrap();

    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2]);
}

#[test]
fn adaptive_enrollment_skips_an_outlier() {
    let mut device = opened();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(3));
    device.driver_mut().present(Impression::finger(4));
    device.driver_mut().present(Impression::finger(3).with_noise(2, 25));

    let template = device.enroll().unwrap();

    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2, 3]);
    let reference = enroll_finger(&mut device, 3);
    assert!(device.match_templates(&template, &reference, 5).unwrap());
}

#[test]
fn adaptive_enrollment_gives_up_after_four_captures() {
    let mut device = opened();
    let messages = record(&mut device);
    for seed in 10..15 {
        device.driver_mut().present(Impression::finger(seed));
    }

    assert!(matches!(device.enroll(), Err(FpModuleError::EnrollFail)));
    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2, 3, 4]);
    assert_eq!(device.driver().pending(), 1);
}

#[test]
fn fixed_enrollment_takes_exact_count() {
    let mut device = opened();
    device.set_collect_times(3).unwrap();
    let messages = record(&mut device);
    for noise in 0..3 {
        device
            .driver_mut()
            .present(Impression::finger(5).with_noise(noise, 15));
    }

    device.enroll().unwrap();

    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2, 3]);
    assert_eq!(device.driver().pending(), 0);
}

#[test]
fn messages_follow_capture_order() {
    let mut device = opened();
    device.set_collect_times(2).unwrap();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(6));
    device.driver_mut().present(Impression::finger(6));

    device.enroll().unwrap();

    let kinds: Vec<MessageKind> = messages
        .lock()
        .unwrap()
        .iter()
        .map(DeviceMessage::kind)
        .collect();
    let attempt = [
        MessageKind::PressFinger,
        MessageKind::CapturedImage,
        MessageKind::RiseFinger,
        MessageKind::EnrollProgress,
    ];
    assert_eq!(kinds, [attempt, attempt].concat());
}

#[test]
fn captured_image_is_forwarded_to_handler() {
    let mut device = opened();
    device.set_collect_times(1).unwrap();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(8));

    device.enroll().unwrap();

    let messages = messages.lock().unwrap();
    match &messages[1] {
        DeviceMessage::CapturedImage(image) => assert_eq!(image, Impression::finger(8).image()),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn only_latest_handler_receives_messages() {
    let mut device = opened();
    let first = record(&mut device);
    let second = record(&mut device);
    enroll_finger(&mut device, 1);

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(progress(&second.lock().unwrap()), vec![1, 2]);
}

#[test]
fn enrollment_timeout_is_reported() {
    let mut device = opened();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(2));

    assert!(matches!(device.enroll(), Err(FpModuleError::Timeout)));

    let messages = messages.lock().unwrap();
    assert_eq!(progress(&messages), vec![1]);
    assert_eq!(messages.last(), Some(&DeviceMessage::PressFinger));
}

#[test]
fn blank_captures_use_up_adaptive_attempts() {
    let mut device = opened();
    let messages = record(&mut device);
    for _ in 0..4 {
        device.driver_mut().present(Impression::blank());
    }

    assert!(matches!(device.enroll(), Err(FpModuleError::EnrollFail)));

    let messages = messages.lock().unwrap();
    let counts = progress(&messages);
    assert!((2..=4).contains(&counts.len()), "progress {:?}", counts);
    assert_eq!(counts, vec![1, 2, 3, 4]);
    assert_eq!(messages.last(), Some(&DeviceMessage::EnrollProgress(4)));
}

#[test]
fn blank_capture_is_retried_in_adaptive_mode() {
    let mut device = opened();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::blank());
    device.driver_mut().present(Impression::finger(12));
    device.driver_mut().present(Impression::finger(12).with_noise(3, 20));

    device.enroll().unwrap();

    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2, 3]);
}

#[test]
fn fixed_enrollment_with_blank_capture_takes_every_attempt() {
    let mut device = opened();
    device.set_collect_times(3).unwrap();
    let messages = record(&mut device);
    device.driver_mut().present(Impression::finger(13));
    device.driver_mut().present(Impression::blank());
    device.driver_mut().present(Impression::finger(13));

    assert!(matches!(device.enroll(), Err(FpModuleError::EnrollFail)));
    assert_eq!(progress(&messages.lock().unwrap()), vec![1, 2, 3]);
    assert_eq!(device.driver().pending(), 0);
}

#[test]
fn unextractable_image_fails_enrollment_not_extraction() {
    let mut device = opened();
    device.set_collect_times(1).unwrap();
    let messages = record(&mut device);
    let tiny = Image::new(8, 8, vec![0; 64]).unwrap();
    device.driver_mut().present(Impression::new(tiny.clone()));

    match device.enroll() {
        Err(FpModuleError::EnrollFail) => {}
        other => panic!("unexpected {:?}", other),
    }

    let messages = messages.lock().unwrap();
    assert_eq!(
        *messages,
        vec![
            DeviceMessage::PressFinger,
            DeviceMessage::CapturedImage(tiny),
            DeviceMessage::RiseFinger,
            DeviceMessage::EnrollProgress(1),
        ]
    );
}

#[test]
fn enrollment_needs_reachable_reader() {
    let mut device = opened();
    device.driver_mut().set_reachable(false);

    assert!(matches!(device.enroll(), Err(FpModuleError::ConnectionError)));
}

#[test]
fn same_finger_matches_different_does_not() {
    let mut device = opened();
    let first = enroll_finger(&mut device, 21);
    let again = enroll_finger(&mut device, 21);
    let other = enroll_finger(&mut device, 22);

    for level in 1..=5 {
        assert!(device.match_templates(&first, &again, level).unwrap());
        assert!(!device.match_templates(&first, &other, level).unwrap());
    }
    assert!(device.get_quality(&first).unwrap() >= 20);
}

#[test]
fn stored_template_survives_bytes() {
    let mut device = opened();
    let template = enroll_finger(&mut device, 30);

    let stored = template.as_bytes().to_vec();
    let loaded = Template::from_bytes(&stored).unwrap();

    assert_eq!(loaded, template);
    assert!(device.match_templates(&template, &loaded, 5).unwrap());
}

#[test]
fn descriptive_strings_fit_sdk_buffers() {
    let mut device = opened();

    let info = device.get_device_info().unwrap();
    let version = device.get_sdk_version().unwrap();

    assert!(!info.is_empty() && info.len() < fpmodule_rs::INFO_LEN);
    assert!(!version.is_empty() && version.len() < fpmodule_rs::INFO_LEN);
}
