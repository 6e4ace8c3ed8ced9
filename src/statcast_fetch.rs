use anyhow::{Context, Result};
use csv::StringRecord;

use crate::fetch_cache::{FetchKey, fetch_text_cached};
use crate::state::{PitchEvent, PitchTable};

const SAVANT_SEARCH_URL: &str = "https://baseballsavant.mlb.com/statcast_search/csv";

/// Known spellings of the batter-handedness column, in probe order.
const HAND_ALIASES: [&str; 5] = ["stand", "bat_side", "batting_hand", "bat_hand", "batter_hand"];

/// One row per pitch for the pitcher's season, from the Baseball Savant
/// statcast-search CSV endpoint (March through November window).
pub fn fetch_pitch_events(season: u16, pitcher: u32) -> Result<PitchTable> {
    let url = format!(
        "{SAVANT_SEARCH_URL}?all=true&player_type=pitcher&hfSea={season}%7C\
         &game_date_gt={season}-03-01&game_date_lt={season}-11-30\
         &pitchers_lookup%5B%5D={pitcher}&type=details&minors=false"
    );
    let body = fetch_text_cached(FetchKey::PitchEvents { season, pitcher }, &url)
        .context("statcast request failed")?;
    parse_statcast_csv(&body)
}

struct Columns {
    pitch_type: Option<usize>,
    pitch_name: Option<usize>,
    description: Option<usize>,
    events: Option<usize>,
    batter_side: Option<usize>,
    balls: Option<usize>,
    strikes: Option<usize>,
    outs_when_up: Option<usize>,
    on_1b: Option<usize>,
    on_2b: Option<usize>,
    on_3b: Option<usize>,
    launch_speed: Option<usize>,
    launch_angle: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let idx = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Self {
            pitch_type: idx("pitch_type"),
            pitch_name: idx("pitch_name"),
            description: idx("description"),
            events: idx("events"),
            batter_side: HAND_ALIASES.iter().find_map(|alias| idx(alias)),
            balls: idx("balls"),
            strikes: idx("strikes"),
            outs_when_up: idx("outs_when_up"),
            on_1b: idx("on_1b"),
            on_2b: idx("on_2b"),
            on_3b: idx("on_3b"),
            launch_speed: idx("launch_speed"),
            launch_angle: idx("launch_angle"),
        }
    }
}

/// Parse the Savant CSV body into a pitch table. An empty body is an empty
/// table, not an error; the caller decides how to message "no data".
pub fn parse_statcast_csv(raw: &str) -> Result<PitchTable> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(PitchTable::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(trimmed.as_bytes());
    let headers = reader
        .headers()
        .context("statcast csv missing header row")?
        .clone();
    let cols = Columns::resolve(&headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed statcast csv record")?;
        rows.push(PitchEvent {
            pitch_type: cell_string(&record, cols.pitch_type),
            pitch_name: cell_string(&record, cols.pitch_name),
            description: cell_string(&record, cols.description),
            events: cell_string(&record, cols.events),
            batter_side: cell_string(&record, cols.batter_side),
            balls: cell_u8(&record, cols.balls),
            strikes: cell_u8(&record, cols.strikes),
            outs_when_up: cell_u8(&record, cols.outs_when_up),
            on_1b: cell_runner(&record, cols.on_1b),
            on_2b: cell_runner(&record, cols.on_2b),
            on_3b: cell_runner(&record, cols.on_3b),
            launch_speed: cell_f64(&record, cols.launch_speed),
            launch_angle: cell_f64(&record, cols.launch_angle),
        });
    }

    Ok(PitchTable {
        rows,
        has_batter_side: cols.batter_side.is_some(),
        has_pitch_name: cols.pitch_name.is_some(),
    })
}

/// Non-empty cell content; Savant writes missing values as empty strings
/// or the literal "null"/"NA".
fn cell<'a>(record: &'a StringRecord, idx: Option<usize>) -> Option<&'a str> {
    let raw = record.get(idx?)?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(raw)
    }
}

fn cell_string(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    cell(record, idx).map(str::to_string)
}

fn cell_f64(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    cell(record, idx)?.parse::<f64>().ok()
}

fn cell_u8(record: &StringRecord, idx: Option<usize>) -> Option<u8> {
    // Count columns occasionally come back float-formatted ("1.0").
    let v = cell(record, idx)?.parse::<f64>().ok()?;
    if (0.0..=255.0).contains(&v) {
        Some(v as u8)
    } else {
        None
    }
}

/// Base-occupancy cells hold the runner's id when the base is occupied.
/// Occupancy is presence; an unparseable non-empty cell still counts.
fn cell_runner(record: &StringRecord, idx: Option<usize>) -> Option<u64> {
    let raw = cell(record, idx)?;
    Some(raw.parse::<f64>().map(|v| v as u64).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty_table() {
        let table = parse_statcast_csv("").unwrap();
        assert!(table.is_empty());
        assert!(!table.has_batter_side);
    }

    #[test]
    fn resolves_handedness_alias() {
        let csv = "pitch_type,description,bat_side,balls,strikes\nFF,called_strike,L,0,0\n";
        let table = parse_statcast_csv(csv).unwrap();
        assert!(table.has_batter_side);
        assert!(!table.has_pitch_name);
        assert_eq!(table.rows[0].batter_side.as_deref(), Some("L"));
    }

    #[test]
    fn missing_handedness_columns_are_recorded() {
        let csv = "pitch_type,description\nFF,ball\n";
        let table = parse_statcast_csv(csv).unwrap();
        assert!(!table.has_batter_side);
        assert!(table.rows[0].batter_side.is_none());
    }

    #[test]
    fn null_and_empty_cells_are_none() {
        let csv = "pitch_type,events,launch_speed,on_1b\nFF,null,,\nSL,strikeout,98.5,592450\n";
        let table = parse_statcast_csv(csv).unwrap();
        assert_eq!(table.rows[0].events, None);
        assert_eq!(table.rows[0].launch_speed, None);
        assert_eq!(table.rows[0].on_1b, None);
        assert_eq!(table.rows[1].events.as_deref(), Some("strikeout"));
        assert_eq!(table.rows[1].launch_speed, Some(98.5));
        assert_eq!(table.rows[1].on_1b, Some(592450));
    }

    #[test]
    fn float_formatted_counts_parse() {
        let csv = "pitch_type,balls,strikes,outs_when_up\nFF,1.0,2.0,0\n";
        let table = parse_statcast_csv(csv).unwrap();
        assert_eq!(table.rows[0].balls, Some(1));
        assert_eq!(table.rows[0].strikes, Some(2));
        assert_eq!(table.rows[0].outs_when_up, Some(0));
    }
}
