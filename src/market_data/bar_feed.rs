// =============================================================================
// Bar event decoding
// =============================================================================
//
// Streaming producers publish one JSON envelope per bar:
//
// ```json
// { "symbol": "AAPL", "interval": "5m",
//   "bar": { "open": 1.0, "high": 1.2, "low": 0.9, "close": 1.1,
//            "volume": 1200, "ts": 1700000000 } }
// ```
//
// `ts` is epoch seconds. Prices may arrive as JSON numbers or numeric strings.

use anyhow::{Context, Result};
use chrono::DateTime;

use super::price_window::Bar;

/// Decode a single bar event envelope into a [`Bar`].
///
/// The symbol is upper-cased so that feed and watchlist spellings agree.
pub fn parse_bar_event(text: &str) -> Result<Bar> {
    let root: serde_json::Value =
        serde_json::from_str(text).context("failed to parse bar event JSON")?;

    let symbol = root["symbol"]
        .as_str()
        .context("missing field symbol")?
        .trim()
        .to_uppercase();
    if symbol.is_empty() {
        anyhow::bail!("field symbol is empty");
    }

    let bar = &root["bar"];
    if !bar.is_object() {
        anyhow::bail!("missing object bar");
    }

    let ts = bar["ts"].as_i64().context("missing field bar.ts")?;
    let timestamp =
        DateTime::from_timestamp(ts, 0).with_context(|| format!("bar.ts out of range: {ts}"))?;

    let open = parse_f64(&bar["open"], "bar.open")?;
    let high = parse_f64(&bar["high"], "bar.high")?;
    let low = parse_f64(&bar["low"], "bar.low")?;
    let close = parse_f64(&bar["close"], "bar.close")?;
    let volume = match &bar["volume"] {
        serde_json::Value::Null => None,
        v => Some(parse_f64(v, "bar.volume")?),
    };

    Ok(Bar {
        symbol,
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// Accept a JSON number or a numeric string; reject non-finite values.
fn parse_f64(val: &serde_json::Value, name: &str) -> Result<f64> {
    let parsed = match val {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}"))?,
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64"))?,
        serde_json::Value::Null => anyhow::bail!("missing field {name}"),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    };
    if !parsed.is_finite() {
        anyhow::bail!("field {name} is not finite: {parsed}");
    }
    Ok(parsed)
}
