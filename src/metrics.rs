use crate::state::{BasicStats, PitchEvent, SeasonAggregate};

/// Pitch descriptions that count as strikes.
const STRIKE_DESCRIPTIONS: [&str; 6] = [
    "called_strike",
    "swinging_strike",
    "swinging_strike_blocked",
    "foul",
    "foul_tip",
    "foul_bunt",
];

/// Pitch descriptions where the batter offered at the pitch.
const SWING_DESCRIPTIONS: [&str; 5] = [
    "swinging_strike",
    "swinging_strike_blocked",
    "foul",
    "foul_tip",
    "hit_into_play",
];

/// Swings that missed entirely.
const WHIFF_DESCRIPTIONS: [&str; 2] = ["swinging_strike", "swinging_strike_blocked"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaRates {
    pub k_pct: Option<f64>,
    pub bb_pct: Option<f64>,
    pub pa_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchMetrics {
    pub total_pitches: usize,
    pub strike_pct: Option<f64>,
    pub whiff_pct: Option<f64>,
    pub avg_exit_velo: Option<f64>,
    pub avg_launch_angle: Option<f64>,
}

/// Strikeout and walk rates over completed plate appearances.
///
/// Only rows carrying a terminal event form a plate appearance. Zero such
/// rows is an undefined rate, not a zero rate: both percentages come back
/// None with pa_count 0.
pub fn compute_pa_rates(rows: &[PitchEvent]) -> PaRates {
    let terminal: Vec<&str> = rows
        .iter()
        .filter_map(|row| row.events.as_deref())
        .collect();
    let pa_count = terminal.len();
    if pa_count == 0 {
        return PaRates {
            k_pct: None,
            bb_pct: None,
            pa_count: 0,
        };
    }

    let strikeouts = terminal.iter().filter(|e| **e == "strikeout").count();
    let walks = terminal.iter().filter(|e| **e == "walk").count();

    PaRates {
        k_pct: Some(round1(strikeouts as f64 / pa_count as f64 * 100.0)),
        bb_pct: Some(round1(walks as f64 / pa_count as f64 * 100.0)),
        pa_count,
    }
}

/// Per-pitch rates over the full table. A missing description matches no
/// vocabulary. Every rate or average with a zero denominator is None.
pub fn compute_pitch_metrics(rows: &[PitchEvent]) -> PitchMetrics {
    let total_pitches = rows.len();

    let mut strikes = 0usize;
    let mut swings = 0usize;
    let mut whiffs = 0usize;
    for row in rows {
        let desc = row.description.as_deref().unwrap_or("");
        if STRIKE_DESCRIPTIONS.contains(&desc) {
            strikes += 1;
        }
        if SWING_DESCRIPTIONS.contains(&desc) {
            swings += 1;
        }
        if WHIFF_DESCRIPTIONS.contains(&desc) {
            whiffs += 1;
        }
    }

    let strike_pct = if total_pitches > 0 {
        Some(round1(strikes as f64 / total_pitches as f64 * 100.0))
    } else {
        None
    };
    let whiff_pct = if swings > 0 {
        Some(round1(whiffs as f64 / swings as f64 * 100.0))
    } else {
        None
    };

    // Batted-ball subset: rows where tracking recorded a launch speed.
    let batted: Vec<&PitchEvent> = rows.iter().filter(|r| r.launch_speed.is_some()).collect();
    let avg_exit_velo = mean(batted.iter().filter_map(|r| r.launch_speed)).map(round1);
    let avg_launch_angle = mean(batted.iter().filter_map(|r| r.launch_angle)).map(round1);

    PitchMetrics {
        total_pitches,
        strike_pct,
        whiff_pct,
        avg_exit_velo,
        avg_launch_angle,
    }
}

/// Pick the season-aggregate row for a resolved pitcher. Exact FanGraphs-id
/// match wins; otherwise the first row whose name contains the display name
/// (case-insensitive). None when the table is empty or nothing matches.
pub fn merge_season_aggregate<'a>(
    aggregates: &'a [SeasonAggregate],
    fangraphs_id: Option<i64>,
    display_name: &str,
) -> Option<&'a SeasonAggregate> {
    if aggregates.is_empty() {
        return None;
    }
    if let Some(id) = fangraphs_id {
        if let Some(row) = aggregates.iter().find(|a| a.fangraphs_id == Some(id)) {
            return Some(row);
        }
    }
    let needle = display_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    aggregates
        .iter()
        .find(|a| a.name.to_lowercase().contains(&needle))
}

/// Assemble the overview record: season aggregates (if any matched) merged
/// with the computed Statcast rates.
pub fn build_basic_stats(
    aggregate: Option<&SeasonAggregate>,
    pa: &PaRates,
    pitch: &PitchMetrics,
) -> BasicStats {
    BasicStats {
        innings_pitched: aggregate.and_then(|a| a.innings_pitched).map(round1),
        era: aggregate.and_then(|a| a.era).map(round2),
        whip: aggregate.and_then(|a| a.whip).map(round2),
        pa_count: pa.pa_count,
        k_pct: pa.k_pct,
        bb_pct: pa.bb_pct,
        total_pitches: pitch.total_pitches,
        strike_pct: pitch.strike_pct,
        whiff_pct: pitch.whiff_pct,
        avg_exit_velo: pitch.avg_exit_velo,
        avg_launch_angle: pitch.avg_launch_angle,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(description: &str) -> PitchEvent {
        PitchEvent {
            description: Some(description.to_string()),
            ..PitchEvent::default()
        }
    }

    fn terminal(event_name: &str) -> PitchEvent {
        PitchEvent {
            events: Some(event_name.to_string()),
            ..PitchEvent::default()
        }
    }

    #[test]
    fn pa_rates_undefined_without_terminal_events() {
        let rows = vec![event("ball"), event("called_strike")];
        let rates = compute_pa_rates(&rows);
        assert_eq!(rates.pa_count, 0);
        assert_eq!(rates.k_pct, None);
        assert_eq!(rates.bb_pct, None);
    }

    #[test]
    fn pa_rates_counts_strikeouts_and_walks() {
        let rows = vec![
            terminal("strikeout"),
            terminal("strikeout"),
            terminal("walk"),
            terminal("field_out"),
            event("foul"), // non-terminal, excluded from PA count
        ];
        let rates = compute_pa_rates(&rows);
        assert_eq!(rates.pa_count, 4);
        assert_eq!(rates.k_pct, Some(50.0));
        assert_eq!(rates.bb_pct, Some(25.0));
    }

    #[test]
    fn pitch_metrics_empty_table_is_all_none() {
        let metrics = compute_pitch_metrics(&[]);
        assert_eq!(metrics.total_pitches, 0);
        assert_eq!(metrics.strike_pct, None);
        assert_eq!(metrics.whiff_pct, None);
        assert_eq!(metrics.avg_exit_velo, None);
        assert_eq!(metrics.avg_launch_angle, None);
    }

    #[test]
    fn pitch_metrics_three_pitch_scenario() {
        let rows = vec![
            event("called_strike"),
            event("foul"),
            event("swinging_strike"),
        ];
        let metrics = compute_pitch_metrics(&rows);
        assert_eq!(metrics.total_pitches, 3);
        // All three descriptions are strikes; foul and swinging_strike are
        // swings; one of the two swings missed.
        assert_eq!(metrics.strike_pct, Some(100.0));
        assert_eq!(metrics.whiff_pct, Some(50.0));
    }

    #[test]
    fn whiff_pct_undefined_without_swings() {
        let rows = vec![event("called_strike"), event("ball")];
        let metrics = compute_pitch_metrics(&rows);
        assert_eq!(metrics.strike_pct, Some(50.0));
        assert_eq!(metrics.whiff_pct, None);
    }

    #[test]
    fn missing_description_matches_nothing() {
        let rows = vec![PitchEvent::default(), event("swinging_strike")];
        let metrics = compute_pitch_metrics(&rows);
        assert_eq!(metrics.total_pitches, 2);
        assert_eq!(metrics.strike_pct, Some(50.0));
        assert_eq!(metrics.whiff_pct, Some(100.0));
    }

    #[test]
    fn batted_averages_use_only_tracked_rows() {
        let rows = vec![
            PitchEvent {
                launch_speed: Some(100.0),
                launch_angle: Some(20.0),
                ..PitchEvent::default()
            },
            PitchEvent {
                launch_speed: Some(90.0),
                launch_angle: Some(10.0),
                ..PitchEvent::default()
            },
            PitchEvent::default(),
        ];
        let metrics = compute_pitch_metrics(&rows);
        assert_eq!(metrics.avg_exit_velo, Some(95.0));
        assert_eq!(metrics.avg_launch_angle, Some(15.0));
    }

    fn aggregate(id: Option<i64>, name: &str) -> SeasonAggregate {
        SeasonAggregate {
            fangraphs_id: id,
            name: name.to_string(),
            innings_pitched: Some(180.0),
            era: Some(3.20),
            whip: Some(1.05),
        }
    }

    #[test]
    fn merge_prefers_id_over_name() {
        let aggs = vec![
            aggregate(Some(1), "Gerrit Cole"),
            aggregate(Some(2), "Gerrit Cole"),
        ];
        let hit = merge_season_aggregate(&aggs, Some(2), "Nobody").unwrap();
        assert_eq!(hit.fangraphs_id, Some(2));
    }

    #[test]
    fn merge_falls_back_to_substring_name() {
        let aggs = vec![
            aggregate(Some(1), "Jacob deGrom"),
            aggregate(Some(2), "Gerrit Cole"),
        ];
        let hit = merge_season_aggregate(&aggs, Some(99), "gerrit cole").unwrap();
        assert_eq!(hit.fangraphs_id, Some(2));
    }

    #[test]
    fn merge_none_when_empty_or_unmatched() {
        assert!(merge_season_aggregate(&[], Some(1), "Gerrit Cole").is_none());
        let aggs = vec![aggregate(Some(1), "Jacob deGrom")];
        assert!(merge_season_aggregate(&aggs, None, "Gerrit Cole").is_none());
    }

    #[test]
    fn basic_stats_rounding() {
        let agg = aggregate(Some(1), "X");
        let stats = build_basic_stats(
            Some(&agg),
            &PaRates {
                k_pct: Some(28.3),
                bb_pct: Some(6.1),
                pa_count: 600,
            },
            &PitchMetrics::default(),
        );
        assert_eq!(stats.innings_pitched, Some(180.0));
        assert_eq!(stats.era, Some(3.2));
        assert_eq!(stats.whip, Some(1.05));
        assert_eq!(stats.k_pct, Some(28.3));
    }
}
