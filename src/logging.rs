//! Structured logging.
//!
//! Every line is a single JSON object:
//! ```json
//! {"ts":"2024-12-28T15:04:05.123Z","level":"info","type":"app","msg":"Recipe created","ctx":{"service":"pantry"},"data":{"recipe_id":"..."}}
//! ```
//! `type` is `access` for request lines, `error` for ERROR events and `app` otherwise.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

static SERVICE_NAME: OnceLock<String> = OnceLock::new();

fn service_name() -> &'static str {
    SERVICE_NAME.get().map(String::as_str).unwrap_or("pantry")
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(config: &LoggingConfig) {
    let _ = SERVICE_NAME.set(config.service_name.clone());

    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("pantry=info"));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormatter::new(config.service_name.clone())),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
}

#[derive(Serialize)]
struct LogLine<'a> {
    ts: &'a str,
    level: &'a str,
    #[serde(rename = "type")]
    log_type: &'a str,
    msg: &'a str,
    ctx: LogContext<'a>,
    data: serde_json::Value,
}

#[derive(Serialize)]
struct LogContext<'a> {
    service: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

/// `FormatEvent` implementation producing the JSON line format.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = match *meta.level() {
            Level::TRACE | Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        let log_type = if meta.target() == "access" {
            "access"
        } else if *meta.level() == Level::ERROR {
            "error"
        } else {
            "app"
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let request_id = visitor
            .fields
            .remove("request_id")
            .and_then(|v| v.as_str().map(str::to_string));
        let ts = Iso8601Timestamp::now();
        let msg = visitor.message.unwrap_or_default();

        let line = LogLine {
            ts: ts.as_str(),
            level,
            log_type,
            msg: &msg,
            ctx: LogContext {
                service: &self.service_name,
                request_id: request_id.as_deref(),
            },
            data: serde_json::to_value(&visitor.fields).unwrap_or_default(),
        };

        writeln!(writer, "{}", serde_json::to_string(&line).unwrap_or_default())
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: BTreeMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &tracing::field::Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.insert(field, serde_json::Value::String(text));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::json!(value));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, serde_json::json!(value));
    }
}

/// One served request, as written to the access log.
#[derive(Debug, Serialize)]
pub struct AccessEntry<'a> {
    pub method: &'a str,
    pub path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a str>,
    pub http: &'a str,
    pub status: u16,
    pub bytes: u64,
    pub duration_ms: f64,
    pub ip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ua: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<&'a str>,
    #[serde(skip)]
    pub request_id: &'a str,
}

fn access_line(service: &str, ts: &str, entry: &AccessEntry<'_>) -> String {
    let msg = format!("{} {} {}", entry.method, entry.path, entry.status);
    let line = LogLine {
        ts,
        level: "info",
        log_type: "access",
        msg: &msg,
        ctx: LogContext {
            service,
            request_id: Some(entry.request_id),
        },
        data: serde_json::to_value(entry).unwrap_or_default(),
    };
    serde_json::to_string(&line).unwrap_or_default()
}

/// Write an access line straight to stdout, bypassing the subscriber.
pub fn log_access(entry: &AccessEntry<'_>) {
    let ts = Iso8601Timestamp::now();
    let line = access_line(service_name(), ts.as_str(), entry);
    let _ = writeln!(io::stdout().lock(), "{}", line);
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` in a fixed buffer.
#[derive(Clone, Copy)]
pub struct Iso8601Timestamp {
    buf: [u8; 24],
}

impl Iso8601Timestamp {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self::from_unix_millis(millis)
    }

    pub fn from_unix_millis(millis: i64) -> Self {
        let secs = millis.div_euclid(1000);
        let ms = millis.rem_euclid(1000);
        let days = secs.div_euclid(86400);
        let secs_of_day = secs.rem_euclid(86400);

        // Days since epoch to civil date (proleptic Gregorian)
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        let mut buf = *b"0000-00-00T00:00:00.000Z";
        put_digits(&mut buf[0..4], year);
        put_digits(&mut buf[5..7], month);
        put_digits(&mut buf[8..10], day);
        put_digits(&mut buf[11..13], secs_of_day / 3600);
        put_digits(&mut buf[14..16], secs_of_day % 3600 / 60);
        put_digits(&mut buf[17..19], secs_of_day % 60);
        put_digits(&mut buf[20..23], ms);

        Self { buf }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or("")
    }
}

/// Right-aligned zero-padded decimal into `out`.
fn put_digits(out: &mut [u8], mut value: i64) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value.rem_euclid(10)) as u8;
        value /= 10;
    }
}

impl std::fmt::Display for Iso8601Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Iso8601Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
