use std::{panic::PanicHookInfo, sync::Once};

use tracing_subscriber::{
    filter::FilterFn, fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the tracing subscriber and panic hook. Safe to call repeatedly;
/// only the first call has an effect.
#[uniffi::export]
pub fn setup_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = FilterFn::new(|en| en.module_path().unwrap_or_default().starts_with("park_map"));

        #[cfg(target_os = "android")]
        let layer = {
            use tracing_logcat::{LogcatMakeWriter, LogcatTag};

            let tag = LogcatTag::Fixed("ParkMap-Rust".to_owned());
            let Ok(writer) = LogcatMakeWriter::new(tag) else {
                return;
            };
            tracing_subscriber::fmt::layer()
                .event_format(Format::default().with_level(false).without_time())
                .with_writer(writer)
                .with_ansi(false)
        };

        #[cfg(not(target_os = "android"))]
        let layer = tracing_subscriber::fmt::layer()
            .event_format(Format::default().without_time())
            .with_writer(std::io::stderr);

        if tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .is_err()
        {
            // host already installed a global subscriber
            return;
        }
        std::panic::set_hook(Box::new(panic_hook));
    })
}

fn panic_hook(info: &PanicHookInfo) {
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("{info}\nBacktrace:\n{backtrace}")
}
