use anyhow::{Context, Result};
use thiserror::Error;

use crate::fetch_cache::{FetchKey, fetch_text_cached};
use crate::state::PlayerIdentity;

const REGISTER_URL: &str =
    "https://raw.githubusercontent.com/chadwickbureau/register/master/data/people.csv";

#[derive(Debug, Error)]
pub enum ResolveError {
    /// User-correctable: the name matched nobody with a usable MLBAM id.
    #[error("no player found matching {first} {last}")]
    NotFound { first: String, last: String },
    /// The register download or parse itself failed.
    #[error("player lookup failed: {0}")]
    LookupFailed(#[source] anyhow::Error),
}

/// Map a human-entered name to the ids the data providers key on.
///
/// Case-insensitive match against the Chadwick register; on multiple hits
/// the first row in register order wins, no secondary sort. Pure query: the
/// only state it touches is the session fetch cache.
pub fn resolve_player(last: &str, first: &str) -> Result<PlayerIdentity, ResolveError> {
    let last = last.trim();
    let first = first.trim();
    if last.is_empty() || first.is_empty() {
        return Err(ResolveError::NotFound {
            first: first.to_string(),
            last: last.to_string(),
        });
    }

    let body = fetch_text_cached(FetchKey::PlayerRegister, REGISTER_URL)
        .context("register request failed")
        .map_err(ResolveError::LookupFailed)?;

    match find_player(&body, last, first).map_err(ResolveError::LookupFailed)? {
        Some(identity) => Ok(identity),
        None => Err(ResolveError::NotFound {
            first: first.to_string(),
            last: last.to_string(),
        }),
    }
}

/// Scan the register CSV for the first name match carrying an MLBAM id.
pub fn find_player(register_csv: &str, last: &str, first: &str) -> Result<Option<PlayerIdentity>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(register_csv.trim().as_bytes());
    let headers = reader
        .headers()
        .context("register csv missing header row")?
        .clone();
    let idx = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let name_last = idx("name_last").context("register csv missing name_last")?;
    let name_first = idx("name_first").context("register csv missing name_first")?;
    let key_mlbam = idx("key_mlbam").context("register csv missing key_mlbam")?;
    let key_fangraphs = idx("key_fangraphs");

    for record in reader.records() {
        let record = record.context("malformed register csv record")?;
        let row_last = record.get(name_last).unwrap_or("").trim();
        let row_first = record.get(name_first).unwrap_or("").trim();
        if !row_last.eq_ignore_ascii_case(last) || !row_first.eq_ignore_ascii_case(first) {
            continue;
        }

        // The register carries rows without an MLBAM id (historical or
        // minor-league entries); those cannot be scouted, keep scanning.
        let Some(mlbam_id) = parse_id(record.get(key_mlbam)) else {
            continue;
        };
        let fangraphs_id = key_fangraphs
            .and_then(|i| record.get(i))
            .and_then(|raw| parse_id(Some(raw)))
            .map(|id| id as i64);

        return Ok(Some(PlayerIdentity {
            mlbam_id,
            fangraphs_id,
            name: format!("{row_first} {row_last}"),
        }));
    }

    Ok(None)
}

fn parse_id(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    // Ids sometimes come float-formatted out of the register exports.
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|v| v as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTER: &str = "\
name_last,name_first,key_mlbam,key_fangraphs
Cole,Gerrit,543037,13125
Cole,Gerrit,,
Smith,Will,669257,19197
Smith,Will,642207,13593
Nomlbam,Test,,
";

    #[test]
    fn matches_case_insensitively() {
        let hit = find_player(REGISTER, "COLE", "gerrit").unwrap().unwrap();
        assert_eq!(hit.mlbam_id, 543037);
        assert_eq!(hit.fangraphs_id, Some(13125));
        assert_eq!(hit.name, "Gerrit Cole");
    }

    #[test]
    fn first_register_row_wins_on_duplicates() {
        let hit = find_player(REGISTER, "Smith", "Will").unwrap().unwrap();
        assert_eq!(hit.mlbam_id, 669257);
    }

    #[test]
    fn rows_without_mlbam_id_are_skipped() {
        assert!(find_player(REGISTER, "Nomlbam", "Test").unwrap().is_none());
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(find_player(REGISTER, "Ruth", "Babe").unwrap().is_none());
    }

    #[test]
    fn empty_names_resolve_to_not_found() {
        let err = resolve_player("", "Gerrit").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }
}
