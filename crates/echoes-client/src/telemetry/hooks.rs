//! Process hooks: panics and background task failures.

use std::any::Any;
use std::future::Future;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};

use echoes_types::LogLevel;
use tokio::task::JoinHandle;
use tracing::error;

use super::{BYPASS_TARGET, Telemetry};
use crate::error::TelemetryError;

/// Set once the panic hook has been registered in this process.
static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

impl Telemetry {
    /// Register a panic hook that forwards every panic as
    /// [`LogLevel::Fatal`] with its source location.
    ///
    /// The previously installed hook still runs first, so the usual panic
    /// report is printed. Only one telemetry hook may be registered per
    /// process.
    pub fn install_panic_hook(&self) -> Result<(), TelemetryError> {
        if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(TelemetryError::HookAlreadyInstalled);
        }

        let telemetry = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            previous(info);
            telemetry.capture(LogLevel::Fatal, describe_panic(info));
        }));
        Ok(())
    }

    /// Spawn `future` on the runtime and forward its error, if it ends with
    /// one, as [`LogLevel::Fatal`].
    ///
    /// The failure is also logged locally under [`BYPASS_TARGET`]. A panic
    /// inside the task is left to the panic hook, so it is reported once.
    pub fn supervise<F, E>(&self, task: &'static str, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: core::fmt::Display + Send + 'static,
    {
        let telemetry = self.clone();
        tokio::spawn(async move {
            if let Err(e) = future.await {
                error!(target: BYPASS_TARGET, task, error = %e, "unhandled task failure");
                telemetry.capture(
                    LogLevel::Fatal,
                    format!("Unhandled task failure ({task}): {e}"),
                );
            }
        })
    }
}

/// `"<message> at <file>:<line>:<column>"`.
fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let message = payload_message(info.payload());
    match info.location() {
        Some(location) => format!(
            "{message} at {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ),
        None => format!("{message} at <unknown location>"),
    }
}

/// Panic payloads are `&str` or `String` unless someone used `panic_any`.
fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
