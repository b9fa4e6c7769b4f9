//! Console logging
//!
//! Every line is prefixed with a `[github-cloner:<pid>]` header whose color
//! encodes the level. Errors go to stderr, everything else to stdout.

use console::Style;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

const PROCESS_NAME: &str = "github-cloner";

/// Event formatter writing `<header> <message>`
#[derive(Debug, Clone)]
pub struct HeaderFormat {
    header: String,
    color: bool,
}

impl HeaderFormat {
    pub fn new(color: bool) -> Self {
        Self {
            header: format!("[{}:{}]", PROCESS_NAME, std::process::id()),
            color,
        }
    }

    fn style(&self, level: &Level) -> Style {
        let style = match *level {
            Level::ERROR => Style::new().red(),
            Level::WARN => Style::new().yellow(),
            Level::INFO => Style::new().magenta(),
            _ => Style::new().black().bright(),
        };
        style.force_styling(self.color)
    }
}

impl<S, N> FormatEvent<S, N> for HeaderFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let style = self.style(event.metadata().level());
        write!(writer, "{} ", style.apply_to(&self.header))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter directive for the requested verbosity
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("github_cloner={}", level)
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the verbosity flag when set.
pub fn init_logging(verbose: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let writer = std::io::stderr
        .with_max_level(Level::ERROR)
        .or_else(std::io::stdout);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(HeaderFormat::new(color))
                .with_writer(writer),
        )
        .with(filter)
        .init();
}
