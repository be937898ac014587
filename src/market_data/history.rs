// =============================================================================
// Daily close history file
// =============================================================================
//
// Input of the start-up screening cycle: one JSON object mapping each symbol
// to its daily closes, oldest first.
//
// ```json
// { "KO": [61.2, 61.5, 60.9], "PEP": ["170.1", 171.4] }
// ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Decode a history document into `(symbol, closes)` pairs sorted by symbol.
///
/// Symbols are upper-cased; closes may be numbers or numeric strings. A
/// symbol with an unusable close, or whose upper-cased name repeats an
/// earlier key, is skipped with a warning and the rest are kept. Only a
/// document that is not a `symbol -> [close]` object is an error.
pub fn parse_history(text: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let root: BTreeMap<String, Vec<serde_json::Value>> =
        serde_json::from_str(text).context("history must be an object of symbol -> [close]")?;

    let mut histories: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, raw) in root {
        let symbol = key.trim().to_uppercase();
        if symbol.is_empty() {
            warn!(key = %key, "history entry with empty symbol skipped");
            continue;
        }
        if histories.contains_key(&symbol) {
            warn!(key = %key, symbol = %symbol, "history key collides with an earlier symbol, skipped");
            continue;
        }
        let closes = raw
            .iter()
            .enumerate()
            .map(|(i, v)| close_at(v).with_context(|| format!("bad close at index {i}")))
            .collect::<Result<Vec<f64>>>();
        match closes {
            Ok(closes) => {
                histories.insert(symbol, closes);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %format!("{e:#}"), "history for symbol skipped");
            }
        }
    }

    Ok(histories.into_iter().collect())
}

/// Read and decode the history file at `path`.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<(String, Vec<f64>)>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history from {}", path.display()))?;
    parse_history(&text).with_context(|| format!("failed to parse history in {}", path.display()))
}

fn close_at(val: &serde_json::Value) -> Result<f64> {
    let parsed = match val {
        serde_json::Value::Number(n) => n.as_f64().context("not a valid f64")?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().context("not numeric")?,
        _ => anyhow::bail!("unexpected JSON type"),
    };
    if !parsed.is_finite() {
        anyhow::bail!("not finite: {parsed}");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_strings() {
        let h = parse_history(r#"{"pep":["170.5",171],"KO":[61.0,61.5]}"#).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], ("KO".to_string(), vec![61.0, 61.5]));
        assert_eq!(h[1], ("PEP".to_string(), vec![170.5, 171.0]));
    }

    #[test]
    fn empty_series_is_kept() {
        let h = parse_history(r#"{"KO":[]}"#).unwrap();
        assert!(h[0].1.is_empty());
    }

    #[test]
    fn bad_close_skips_only_that_symbol() {
        let h = parse_history(r#"{"KO":[61.0,61.5,60.9],"PEP":[170.0,"n/a"]}"#).unwrap();
        assert_eq!(h, vec![("KO".to_string(), vec![61.0, 61.5, 60.9])]);

        let h = parse_history(r#"{"A":[1.0,null],"B":["inf"],"C":[2.0]}"#).unwrap();
        assert_eq!(h, vec![("C".to_string(), vec![2.0])]);
    }

    #[test]
    fn case_collision_keeps_first_key() {
        // Object keys are visited in byte order, so "KO" precedes "ko".
        let h = parse_history(r#"{"ko":[2.0],"KO":[1.0],"PEP":[3.0]}"#).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], ("KO".to_string(), vec![1.0]));
        assert_eq!(h[1].0, "PEP");
    }

    #[test]
    fn blank_symbol_is_skipped() {
        let h = parse_history(r#"{"  ":[1.0],"KO":[2.0]}"#).unwrap();
        assert_eq!(h, vec![("KO".to_string(), vec![2.0])]);
    }

    #[test]
    fn rejects_non_object() {
        assert!(parse_history("[1,2,3]").is_err());
    }
}
