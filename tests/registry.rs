mod common;

use common::MockTransport;
use pretty_assertions::assert_eq;
use udlkit::{AdapterType, Discovered, Error, Options, Registry};

fn discovered(serial: &str) -> Discovered {
    Discovered {
        serial: serial.to_owned(),
        adapter: AdapterType::Alex,
        transport: Box::new(MockTransport::new()),
    }
}

#[test]
fn enumeration_upserts_by_serial() {
    let mut registry = Registry::new(Options::default());

    let infos = registry.enumerate(vec![discovered("AAAA"), discovered("BBBB")]);
    assert_eq!(infos.len(), 2);
    assert_eq!(registry.len(), 2);

    // A second sweep with the same serials keeps the same devices.
    let infos = registry.enumerate(vec![discovered("AAAA"), discovered("BBBB")]);
    assert_eq!(infos.len(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn missing_device_is_dropped_on_next_sweep() {
    let mut registry = Registry::new(Options::default());
    registry.enumerate(vec![discovered("AAAA"), discovered("BBBB")]);

    let infos = registry.enumerate(vec![discovered("BBBB")]);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].serial, "BBBB");
    assert!(registry.device("AAAA").is_none());
}

#[test]
fn claim_is_exclusive_until_released() {
    let mut registry = Registry::new(Options::default());
    registry.enumerate(vec![discovered("AAAA")]);

    registry.claim("AAAA", 0).unwrap();
    assert!(matches!(
        registry.claim("AAAA", 0),
        Err(Error::AlreadyClaimed)
    ));

    registry.release("AAAA").unwrap();
    registry.release("AAAA").unwrap();
    registry.claim("AAAA", 250).unwrap();
}

#[test]
fn claim_of_unknown_serial_fails() {
    let mut registry = Registry::new(Options::default());
    assert!(matches!(
        registry.claim("NOPE", 0),
        Err(Error::UnknownDevice(_))
    ));
    assert!(matches!(
        registry.release("NOPE"),
        Err(Error::UnknownDevice(_))
    ));
}

#[test]
fn claim_survives_reenumeration() {
    let mut registry = Registry::new(Options::default());
    registry.enumerate(vec![discovered("AAAA")]);
    registry.claim("AAAA", 0).unwrap();

    let infos = registry.enumerate(vec![discovered("AAAA")]);
    assert!(infos[0].claimed);
    assert!(registry.device("AAAA").unwrap().claimed());
}

#[test]
fn first_unclaimed_skips_held_devices() {
    let mut registry = Registry::new(Options::default());
    registry.enumerate(vec![discovered("AAAA"), discovered("BBBB")]);

    assert_eq!(registry.first_unclaimed(), Some("AAAA"));
    registry.claim("AAAA", 0).unwrap();
    assert_eq!(registry.first_unclaimed(), Some("BBBB"));
    registry.claim("BBBB", 0).unwrap();
    assert_eq!(registry.first_unclaimed(), None);
}

#[test]
fn claim_seeds_the_default_supported_list() {
    let mut registry = Registry::new(Options::default());
    registry.enumerate(vec![discovered("AAAA")]);

    let dev = registry.claim("AAAA", 0).unwrap();
    assert_eq!(dev.supported_modes().len(), udlkit::MODE_COUNT);
    assert!(dev.native_mode().is_none());
}
