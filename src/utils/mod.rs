pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVES: &[&str] = &["budget_tracker=info", "tracker_core=warn"];

/// Initializes the global tracing subscriber. Output goes to stderr so script
/// mode keeps stdout for command results. `RUST_LOG` adds to the defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        for directive in DEFAULT_DIRECTIVES {
            if let Ok(parsed) = directive.parse::<Directive>() {
                filter = filter.add_directive(parsed);
            }
        }

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
