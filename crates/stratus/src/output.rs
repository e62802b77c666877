//! Output formatting for command results
//!
//! Payloads and responses go to stdout; diagnostics go to stderr.

use colored::Colorize;
use serde_json::Value;
use std::io::Write;
use stratus_config::OutputFormat;
use stratus_deployment::Formatter;

/// Pick the formatter for a command
///
/// A generated payload is always JSON so it can be fed back through `--file`.
pub fn formatter(format: OutputFormat, generate_payload: bool) -> Box<dyn Formatter> {
    if generate_payload {
        return Box::new(JsonFormatter);
    }
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Text => Box::new(TextFormatter),
    }
}

fn write_stdout(rendered: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered)?;
    stdout.flush()
}

/// Pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render(value: &Value) -> std::io::Result<String> {
        serde_json::to_string_pretty(value).map_err(std::io::Error::other)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, _kind: &str, value: &Value) -> std::io::Result<()> {
        write_stdout(&Self::render(value)?)
    }
}

/// Human readable summaries, JSON for anything without one
pub struct TextFormatter;

impl TextFormatter {
    pub fn render(kind: &str, value: &Value) -> std::io::Result<String> {
        match kind {
            "deployment/create" => Ok(render_create(value)),
            "deployment/status" => Ok(render_status(value)),
            _ => JsonFormatter::render(value),
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, kind: &str, value: &Value) -> std::io::Result<()> {
        write_stdout(&Self::render(kind, value)?)
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("-")
}

fn render_create(value: &Value) -> String {
    let mut out = format!(
        "{} Deployment {} ({}) created",
        "✓".green().bold(),
        str_field(value, "name").bold(),
        str_field(value, "id")
    );

    let resources = value
        .get("resources")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if !resources.is_empty() {
        out.push_str(&format!(
            "\n\n{:<20} {:<24} {:<16} {}",
            "KIND", "REF ID", "REGION", "ID"
        ));
    }
    for resource in resources {
        out.push_str(&format!(
            "\n{:<20} {:<24} {:<16} {}",
            str_field(resource, "kind"),
            str_field(resource, "ref_id"),
            str_field(resource, "region"),
            str_field(resource, "id")
        ));
    }

    for resource in resources {
        if let Some(credentials) = resource.get("credentials") {
            out.push_str(&format!(
                "\n\n{} Elasticsearch credentials\n  username: {}\n  password: {}",
                "ℹ".blue().bold(),
                str_field(credentials, "username"),
                str_field(credentials, "password")
            ));
        }
        if let Some(cloud_id) = resource.get("cloud_id").and_then(Value::as_str) {
            out.push_str(&format!("\n  cloud ID: {}", cloud_id));
        }
    }

    out
}

fn render_status(value: &Value) -> String {
    let healthy = value.get("healthy").and_then(Value::as_bool).unwrap_or(false);
    let marker = if healthy {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    format!(
        "{} Deployment {} ({}) {}",
        marker,
        str_field(value, "name"),
        str_field(value, "id"),
        if healthy { "is healthy" } else { "is not healthy" }
    )
}
