use std::collections::VecDeque;
use std::env;

use crate::filters::SituationFilters;
use crate::pitch_mix::{self, PitchMixRow};

pub const SEASON_MIN: u16 = 2015;
pub const SEASON_MAX: u16 = 2025;

const LOG_CAPACITY: usize = 60;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchEvent {
    pub pitch_type: Option<String>,
    pub pitch_name: Option<String>,
    pub description: Option<String>,
    /// Plate-appearance terminal event; None for non-terminal pitches.
    pub events: Option<String>,
    pub batter_side: Option<String>,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub outs_when_up: Option<u8>,
    /// Runner ids; a base is occupied iff the cell is present.
    pub on_1b: Option<u64>,
    pub on_2b: Option<u64>,
    pub on_3b: Option<u64>,
    pub launch_speed: Option<f64>,
    pub launch_angle: Option<f64>,
}

/// One Statcast pull: the rows plus the schema facts resolved from the
/// CSV header (which handedness alias matched, whether pitch_name exists).
#[derive(Debug, Clone, Default)]
pub struct PitchTable {
    pub rows: Vec<PitchEvent>,
    pub has_batter_side: bool,
    pub has_pitch_name: bool,
}

impl PitchTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn mix(&self) -> Vec<PitchMixRow> {
        pitch_mix::compute_mix(&self.rows, self.has_pitch_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonAggregate {
    pub fangraphs_id: Option<i64>,
    pub name: String,
    pub innings_pitched: Option<f64>,
    pub era: Option<f64>,
    pub whip: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub mlbam_id: u32,
    pub fangraphs_id: Option<i64>,
    pub name: String,
}

/// The nullable stat record the overview grid shows. FanGraphs fields are
/// None when no aggregate row matched; rate fields are None when their
/// denominator was zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicStats {
    pub innings_pitched: Option<f64>,
    pub era: Option<f64>,
    pub whip: Option<f64>,
    pub pa_count: usize,
    pub k_pct: Option<f64>,
    pub bb_pct: Option<f64>,
    pub total_pitches: usize,
    pub strike_pct: Option<f64>,
    pub whiff_pct: Option<f64>,
    pub avg_exit_velo: Option<f64>,
    pub avg_launch_angle: Option<f64>,
}

impl BasicStats {
    pub fn grid_cells(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("IP", self.innings_pitched.map(format_stat)),
            ("ERA", self.era.map(format_stat)),
            ("WHIP", self.whip.map(format_stat)),
            ("PAs Faced", Some(self.pa_count.to_string())),
            ("K %", self.k_pct.map(format_stat)),
            ("BB %", self.bb_pct.map(format_stat)),
            ("Total Pitches", Some(self.total_pitches.to_string())),
            ("Strike %", self.strike_pct.map(format_stat)),
            ("Whiff %", self.whiff_pct.map(format_stat)),
            ("Avg Exit Velo", self.avg_exit_velo.map(format_stat)),
            ("Avg Launch Angle", self.avg_launch_angle.map(format_stat)),
        ]
    }
}

/// Two decimals, trailing zeros trimmed ("4.50" -> "4.5", "3.00" -> "3").
pub fn format_stat(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Situational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDim {
    Handedness,
    Count,
    Outs,
    BaseState,
}

impl FilterDim {
    pub const ORDER: [FilterDim; 4] = [
        FilterDim::Handedness,
        FilterDim::Count,
        FilterDim::Outs,
        FilterDim::BaseState,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterDim::Handedness => "Batter Handedness",
            FilterDim::Count => "Count",
            FilterDim::Outs => "Outs",
            FilterDim::BaseState => "Base State",
        }
    }

    pub fn next(self) -> FilterDim {
        let pos = Self::ORDER.iter().position(|d| *d == self).unwrap_or(0);
        Self::ORDER[(pos + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> FilterDim {
        let pos = Self::ORDER.iter().position(|d| *d == self).unwrap_or(0);
        Self::ORDER[(pos + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Result of filtering one situation: row count plus the recomputed mix.
#[derive(Debug, Clone, Default)]
pub struct SituationSnapshot {
    pub matching: usize,
    pub mix: Vec<PitchMixRow>,
}

pub struct AppState {
    pub screen: Screen,
    pub editing: Option<SearchField>,
    pub first_input: String,
    pub last_input: String,
    pub season: u16,

    pub identity: Option<PlayerIdentity>,
    pub pitch_table: Option<PitchTable>,
    pub basic: Option<BasicStats>,
    pub mix: Vec<PitchMixRow>,
    pub fangraphs_missing: bool,

    pub filters_a: SituationFilters,
    pub filters_b: SituationFilters,
    pub situ_a: SituationSnapshot,
    pub situ_b: SituationSnapshot,
    pub compare: bool,
    pub focus_b: bool,
    pub filter_dim: FilterDim,

    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        let season = env::var("DEFAULT_SEASON")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(SEASON_MAX)
            .clamp(SEASON_MIN, SEASON_MAX);
        Self {
            screen: Screen::Overview,
            editing: None,
            first_input: String::new(),
            last_input: String::new(),
            season,
            identity: None,
            pitch_table: None,
            basic: None,
            mix: Vec::new(),
            fangraphs_missing: false,
            filters_a: SituationFilters::all(),
            filters_b: SituationFilters::all(),
            situ_a: SituationSnapshot::default(),
            situ_b: SituationSnapshot::default(),
            compare: false,
            focus_b: false,
            filter_dim: FilterDim::Handedness,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn season_up(&mut self) {
        if self.season < SEASON_MAX {
            self.season += 1;
        }
    }

    pub fn season_down(&mut self) {
        if self.season > SEASON_MIN {
            self.season -= 1;
        }
    }

    pub fn active_filters_mut(&mut self) -> &mut SituationFilters {
        if self.compare && self.focus_b {
            &mut self.filters_b
        } else {
            &mut self.filters_a
        }
    }

    /// Drop everything tied to the previous search. Called before a new
    /// resolve so a failed lookup never shows stale numbers.
    pub fn clear_player_data(&mut self) {
        self.identity = None;
        self.pitch_table = None;
        self.basic = None;
        self.mix.clear();
        self.fangraphs_missing = false;
        self.situ_a = SituationSnapshot::default();
        self.situ_b = SituationSnapshot::default();
    }

    /// Re-run both situational projections against the loaded table.
    /// Pure recompute, no fetch.
    pub fn recompute_situational(&mut self) {
        let Some(table) = &self.pitch_table else {
            self.situ_a = SituationSnapshot::default();
            self.situ_b = SituationSnapshot::default();
            return;
        };
        self.situ_a = snapshot_for(table, &self.filters_a);
        self.situ_b = snapshot_for(table, &self.filters_b);
    }
}

fn snapshot_for(table: &PitchTable, filters: &SituationFilters) -> SituationSnapshot {
    let rows = crate::filters::apply_filters(table, filters);
    let mix = pitch_mix::compute_mix(&rows, table.has_pitch_name);
    SituationSnapshot {
        matching: rows.len(),
        mix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_stat_trims_trailing_zeros() {
        assert_eq!(format_stat(4.50), "4.5");
        assert_eq!(format_stat(3.00), "3");
        assert_eq!(format_stat(1.72), "1.72");
        assert_eq!(format_stat(0.0), "0");
    }

    #[test]
    fn season_stays_in_range() {
        let mut state = AppState::new();
        state.season = SEASON_MAX;
        state.season_up();
        assert_eq!(state.season, SEASON_MAX);
        state.season = SEASON_MIN;
        state.season_down();
        assert_eq!(state.season, SEASON_MIN);
    }

    #[test]
    fn log_ring_is_bounded() {
        let mut state = AppState::new();
        for i in 0..100 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), LOG_CAPACITY);
        assert_eq!(state.logs.back().unwrap(), "line 99");
    }
}
