use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:tt)*) => {{
        let span = $crate::tracing::span!($level, $span);
        let _enter = span.enter();

        $crate::tracing::event!($level, $($msg)*)
    }};
}

/// Events about notifications leaving the engine
#[macro_export]
macro_rules! outgoing {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "outgoing", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::outgoing!(level = TRACE, $($msg)*)
    };
}

/// Events about notification events arriving at the engine
#[macro_export]
macro_rules! incoming {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "incoming", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::incoming!(level = TRACE, $($msg)*)
    };
}

#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::internal!(level = TRACE, $($msg)*)
    };
}

/// Level used when `LOG_LEVEL` is unset or invalid
fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    }
}

fn level_from_env(value: Option<&str>) -> LevelFilter {
    let default = default_level();

    value.map_or(default, |level| {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    })
}

/// Install the global subscriber. Only events from `tidings*` targets are emitted.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    let level = level_from_env(std::env::var("LOG_LEVEL").ok().as_deref());

    let _ = tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("tidings")
                })),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{layer::Context, registry::LookupSpan};

    use super::*;

    /// Records the enclosing span name and level of every event
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(&'static str, Level)>>>);

    impl<S> Layer<S> for Recorder
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let span = ctx.event_span(event).map_or("", |span| span.name());
            self.0.lock().push((span, *event.metadata().level()));
        }
    }

    #[test]
    fn test_macros_scope_events_by_direction() {
        let recorder = Recorder::default();
        let subscriber = tracing_subscriber::Registry::default().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            incoming!(node = "/users/romeo@shakespeare.lit/posts", "Received notification event");
            outgoing!(destination = "juliet@shakespeare.lit", "Enqueueing notification");
            internal!(level = INFO, max_concurrent_events = 64, "Notification service ready");
        });

        assert_eq!(
            *recorder.0.lock(),
            vec![
                ("incoming", Level::TRACE),
                ("outgoing", Level::TRACE),
                ("internal", Level::INFO),
            ]
        );
    }

    #[test]
    fn test_level_from_env() {
        assert_eq!(level_from_env(Some("warn")), LevelFilter::WARN);
        assert_eq!(level_from_env(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(level_from_env(Some("nonsense")), default_level());
        assert_eq!(level_from_env(None), default_level());
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }
}
