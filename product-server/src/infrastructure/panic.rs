//! Process-wide panic hook.
//!
//! Every panic is logged through `tracing` with its location and message.
//! When `swallow` is set the process keeps running: actix replaces the
//! crashed worker and spawned tasks surface the panic through their
//! `JoinHandle`. Otherwise the hook exits with status 1 after logging.

use std::any::Any;
use std::panic::{self, Location};
use std::process;
use std::time::Duration;

use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicAction {
    Continue,
    Exit,
}

pub fn install_panic_handler(swallow: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let action = report_panic(info.location(), info.payload(), swallow);

        if action == PanicAction::Exit {
            default_hook(info);
            // Give the subscriber a moment to flush.
            std::thread::sleep(Duration::from_millis(100));
            process::exit(1);
        }
    }));

    tracing::info!(swallow, "panic handler installed");
}

/// Logs a panic and decides whether the process should go down.
pub fn report_panic(
    location: Option<&Location<'_>>,
    payload: &(dyn Any + Send),
    swallow: bool,
) -> PanicAction {
    let location = location
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "<unknown location>".to_string());
    let message = panic_message(payload);

    error!(
        location = %location,
        payload = %message,
        swallowed = swallow,
        "uncaught panic"
    );

    if swallow {
        PanicAction::Continue
    } else {
        PanicAction::Exit
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<no message>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn report_captured(
        location: Option<&Location<'_>>,
        payload: &(dyn Any + Send),
        swallow: bool,
    ) -> (PanicAction, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let action = tracing::subscriber::with_default(subscriber, || {
            report_panic(location, payload, swallow)
        });
        (action, logs.text())
    }

    #[test]
    fn swallowed_panic_is_logged_and_continues() {
        let location = Location::caller();
        let payload: Box<dyn Any + Send> = Box::new("worker blew up");

        let (action, logs) = report_captured(Some(location), payload.as_ref(), true);

        assert_eq!(action, PanicAction::Continue);
        assert!(logs.contains("uncaught panic"));
        assert!(logs.contains("worker blew up"));
        assert!(logs.contains(&format!("{}:{}", location.file(), location.line())));
        assert!(logs.contains("swallowed=true"));
    }

    #[test]
    fn unswallowed_panic_requests_exit() {
        let payload: Box<dyn Any + Send> = Box::new(format!("attempt {} failed", 3));

        let (action, logs) = report_captured(None, payload.as_ref(), false);

        assert_eq!(action, PanicAction::Exit);
        assert!(logs.contains("attempt 3 failed"));
        assert!(logs.contains("<unknown location>"));
        assert!(logs.contains("swallowed=false"));
    }

    #[test]
    fn opaque_payloads_have_a_placeholder_message() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "<no message>");
    }
}
