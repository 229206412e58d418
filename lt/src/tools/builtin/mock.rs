//! Canned demo tools
//!
//! Fixed-answer tools for exercising tool calling against a real model
//! without touching the outside world.

use serde_json::{Value, json};
use tracing::debug;

use crate::tools::traits::params;
use crate::tools::{ToolError, ToolRegistry};

/// Register get_weather, add_numbers, get_time, search_library_catalog and ping
pub fn register_demo_tools(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    debug!("register_demo_tools: called");

    registry.register_fn(
        "get_weather",
        "Get the current weather for a given city",
        json!({
            "type": "object",
            "required": ["city"],
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city name, e.g. 'Paris' or 'New York'"
                }
            }
        }),
        |args| {
            let city = params::opt_str(args, "city").unwrap_or_default();
            Ok(json!({
                "city": city,
                "temperature": "18°C",
                "condition": "Partly cloudy",
                "humidity": "65%"
            })
            .to_string())
        },
    )?;

    registry.register_fn(
        "add_numbers",
        "Add two numbers together and return the result",
        json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {
                "a": {"type": "number", "description": "The first number"},
                "b": {"type": "number", "description": "The second number"}
            }
        }),
        |args| {
            // Non-numeric operands count as zero
            let a = params::opt_f64(args, "a").unwrap_or(0.0);
            let b = params::opt_f64(args, "b").unwrap_or(0.0);
            Ok(json!({ "result": number(a + b) }).to_string())
        },
    )?;

    registry.register_fn(
        "get_time",
        "Get the current time in a given timezone",
        json!({
            "type": "object",
            "required": ["timezone"],
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "The timezone, e.g. 'UTC', 'America/New_York', 'Europe/London'"
                }
            }
        }),
        |args| {
            let timezone = params::opt_str(args, "timezone").unwrap_or_default();
            Ok(json!({
                "timezone": timezone,
                "time": "14:30:00",
                "date": "2024-01-15"
            })
            .to_string())
        },
    )?;

    registry.register_fn(
        "search_library_catalog",
        "Search for availability of a publication in a library catalog",
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "a query string to put into a catalog search, can be an author, title, isbn, issn, or a combination of those"
                }
            }
        }),
        |_| Ok("found 4 books".to_string()),
    )?;

    registry.register_fn(
        "ping",
        "find out connectivity to a computer on the network with ping",
        json!({
            "type": "object",
            "required": ["hostname_or_ip"],
            "properties": {
                "hostname_or_ip": {
                    "type": "string",
                    "description": "a hostname (e.g. like google.com) or an ip v4 address (like 1.2.4.5)"
                }
            }
        }),
        |_| Ok("host is up".to_string()),
    )?;

    Ok(())
}

/// Whole sums render as integers (`4`, not `4.0`)
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
