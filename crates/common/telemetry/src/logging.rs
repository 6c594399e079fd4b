// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    env,
    io::IsTerminal,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, Once},
};

use bon::Builder;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use strum_macros::{Display, EnumString};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, Registry, filter, layer::SubscriberExt};

/// Default log level filter when neither `LoggingOptions::level` nor
/// `RUST_LOG` is set.
pub const DEFAULT_LOG_TARGETS: &str = "info";

/// Filter used by [`init_default_ut_logging`] unless `UNITTEST_LOG_LEVEL` is
/// set: debug, with the HTTP and HTML parsing crates quieted.
const DEFAULT_UT_LOG_TARGETS: &str = "debug,hyper=warn,hyper_util=warn,tower=warn,reqwest=warn,\
                                      h2=info,html5ever=info,selectors=info";

/// Prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "aos";

/// Configuration options for the logging system.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, SmartDefault, Builder)]
#[serde(default)]
pub struct LoggingOptions {
    /// Directory for rolling log files. File logging is off when `None`.
    pub dir: Option<PathBuf>,

    /// Filter directives such as `"debug"` or `"info,aos_downloader=trace"`.
    /// Falls back to `RUST_LOG`, then to [`DEFAULT_LOG_TARGETS`].
    pub level: Option<String>,

    #[builder(default)]
    pub log_format: LogFormat,

    /// Maximum number of rotated files kept per log stream.
    #[default = 14]
    #[builder(default = 14)]
    pub max_log_files: usize,

    /// Also write events to stderr. Stdout is left to command output.
    #[default = true]
    #[builder(default = true)]
    pub append_stderr: bool,
}

/// Available log output formats.
#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per event, for log aggregation.
    Json,

    /// Human-readable lines.
    #[default]
    Text,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::Layer::new()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::Layer::new()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
    }
}

fn rolling_appender(opts: &LoggingOptions, dir: &Path, prefix: &str) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(opts.max_log_files)
        .build(dir)
        .unwrap_or_else(|e| {
            panic!(
                "initializing rolling file appender at {} failed: {e}",
                dir.display()
            )
        })
}

/// Install the global tracing subscriber.
///
/// Layers, depending on `opts`:
/// - stderr, text or JSON (if `append_stderr`)
/// - daily rolling `aos.*.log` files (if `dir` is set)
/// - daily rolling `aos-err.*.log` files with ERROR events only (if `dir` is
///   set)
///
/// The returned guards flush the background writers when dropped and must be
/// kept alive for as long as logging is needed. Only the first call has any
/// effect.
///
/// # Panics
///
/// Panics if the log directory cannot be created.
pub fn init_global_logging(app_name: &str, opts: &LoggingOptions) -> Vec<WorkerGuard> {
    static START: Once = Once::new();
    let mut guards = vec![];

    START.call_once(|| {
        let _ = LogTracer::init();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if opts.append_stderr {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            guards.push(guard);
            layers.push(fmt_layer(opts.log_format, writer, std::io::stderr().is_terminal()));
        }

        if let Some(dir) = opts.dir.as_ref() {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(opts, dir, LOG_FILE_PREFIX));
            guards.push(guard);
            layers.push(fmt_layer(opts.log_format, writer, false));

            let err_prefix = format!("{LOG_FILE_PREFIX}-err");
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(opts, dir, &err_prefix));
            guards.push(guard);
            layers.push(
                fmt_layer(opts.log_format, writer, false)
                    .with_filter(filter::LevelFilter::ERROR)
                    .boxed(),
            );
        }

        let directives = opts
            .level
            .clone()
            .or_else(|| env::var(EnvFilter::DEFAULT_ENV).ok())
            .unwrap_or_else(|| DEFAULT_LOG_TARGETS.to_string());
        let env_filter =
            EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_TARGETS));

        let subscriber = Registry::default().with(layers).with(env_filter);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(app = app_name, filter = %directives, "logging initialized");
        }
    });

    guards
}

/// Initialize logging for tests.
///
/// Writes to `$UNITTEST_LOG_DIR` (default `/tmp/__unittest_logs`) at
/// `$UNITTEST_LOG_LEVEL` (default debug with noisy HTTP crates quieted).
/// Safe to call from every test; only the first call installs anything.
pub fn init_default_ut_logging() {
    static START: Once = Once::new();

    START.call_once(|| {
        let Ok(mut g) = GLOBAL_UT_LOG_GUARD.as_ref().lock() else {
            return;
        };

        let dir =
            env::var("UNITTEST_LOG_DIR").unwrap_or_else(|_| "/tmp/__unittest_logs".to_string());
        let level = env::var("UNITTEST_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_UT_LOG_TARGETS.to_string());

        let opts = LoggingOptions::builder()
            .dir(PathBuf::from(&dir))
            .level(level)
            .append_stderr(false)
            .build();
        *g = Some(init_global_logging("unittest", &opts));

        tracing::info!("logs dir = {}", dir);
    });
}

/// Keeps the unit test writer guards alive for the whole test binary.
static GLOBAL_UT_LOG_GUARD: Lazy<Arc<Mutex<Option<Vec<WorkerGuard>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_default_options() {
        let opts = LoggingOptions::default();
        assert_eq!(opts.dir, None);
        assert_eq!(opts.log_format, LogFormat::Text);
        assert_eq!(opts.max_log_files, 14);
        assert!(opts.append_stderr);
    }

    #[test]
    fn test_builder_matches_default() {
        assert_eq!(LoggingOptions::builder().build(), LoggingOptions::default());
    }

    #[test]
    fn test_log_format_parse_and_display() {
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Text);
        assert!(LogFormat::from_str("xml").is_err());
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: LoggingOptions =
            serde_json::from_str(r#"{"level":"debug","log_format":"json"}"#).unwrap();
        assert_eq!(opts.level.as_deref(), Some("debug"));
        assert_eq!(opts.log_format, LogFormat::Json);
        assert_eq!(opts.max_log_files, 14);
    }

    #[test]
    fn test_default_ut_targets_parse() {
        assert!(!DEFAULT_UT_LOG_TARGETS.contains(' '));
        assert!(EnvFilter::try_new(DEFAULT_UT_LOG_TARGETS).is_ok());
        assert!(EnvFilter::try_new(DEFAULT_LOG_TARGETS).is_ok());
    }

    #[test]
    fn test_ut_logging_is_idempotent() {
        init_default_ut_logging();
        init_default_ut_logging();
        tracing::info!("still alive");
    }
}
