use anyhow::{Context, Result};
use serde_json::Value;

use crate::fetch_cache::{FetchKey, fetch_text_cached};
use crate::state::SeasonAggregate;

const FANGRAPHS_LEADERS_URL: &str = "https://www.fangraphs.com/api/leaders/major-league/data";

/// One row per pitcher-season from the FanGraphs leaders feed, qual=0 so
/// every pitcher with innings appears.
pub fn fetch_season_aggregates(season: u16) -> Result<Vec<SeasonAggregate>> {
    let url = format!(
        "{FANGRAPHS_LEADERS_URL}?age=&pos=all&stats=pit&lev=mlb\
         &season={season}&season1={season}&ind=0&qual=0&pageitems=2000&pagenum=1"
    );
    let body = fetch_text_cached(FetchKey::SeasonAggregates { season }, &url)
        .context("fangraphs request failed")?;
    parse_fangraphs_leaders_json(&body)
}

/// Defensive parse of the leaders payload. The feed has shipped both a bare
/// array and an object with a "data" array; field names drift too, so every
/// lookup probes a key list.
pub fn parse_fangraphs_leaders_json(raw: &str) -> Result<Vec<SeasonAggregate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid fangraphs json")?;
    let rows = root
        .get("data")
        .and_then(|v| v.as_array())
        .or_else(|| root.as_array());
    let Some(rows) = rows else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for entry in rows {
        let name = pick_string(entry, &["PlayerName", "Name", "playerName"]).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        out.push(SeasonAggregate {
            fangraphs_id: pick_i64(entry, &["playerid", "IDfg", "playerId"]),
            name: strip_markup(&name),
            innings_pitched: pick_f64(entry, &["IP"]),
            era: pick_f64(entry, &["ERA"]),
            whip: pick_f64(entry, &["WHIP"]),
        });
    }
    Ok(out)
}

/// Leader names occasionally arrive as anchor markup; keep the text only.
fn strip_markup(raw: &str) -> String {
    if !raw.contains('<') {
        return raw.trim().to_string();
    }
    let mut out = String::new();
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_f64() {
                return Some(num);
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.trim().parse::<f64>() {
                    return Some(num);
                }
            }
        }
    }
    None
}

fn pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_i64() {
                return Some(num);
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.trim().parse::<i64>() {
                    return Some(num);
                }
            }
        }
    }
    None
}
