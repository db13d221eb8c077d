//! The panic hook is process-global, so it gets a test binary of its own.

#![allow(clippy::unwrap_used)]

use echoes_client::{Telemetry, TelemetryError};
use echoes_types::LogLevel;

#[test]
fn panic_is_forwarded_once_as_fatal_with_location() {
    let (telemetry, mut rx) = Telemetry::channel();
    telemetry.install_panic_hook().unwrap();

    let line = line!() + 1;
    let outcome = std::thread::spawn(|| panic!("kaboom")).join();
    assert!(outcome.is_err());

    let event = rx.try_recv().unwrap();
    assert_eq!(event.level, LogLevel::Fatal);
    assert!(event.message.starts_with("kaboom at "), "{}", event.message);
    assert!(
        event.message.contains(&format!("panic_hook.rs:{line}:")),
        "{}",
        event.message
    );
    assert!(rx.try_recv().is_err());

    assert!(matches!(
        telemetry.install_panic_hook(),
        Err(TelemetryError::HookAlreadyInstalled)
    ));
}
