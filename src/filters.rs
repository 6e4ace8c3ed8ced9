use crate::state::{PitchEvent, PitchTable};

/// Count options offered by the situational selectors. Anything else that
/// reaches `apply_filters` is parsed leniently; a malformed string skips the
/// dimension rather than erroring.
pub const COUNT_OPTIONS: [&str; 10] = [
    "All", "0-0", "0-1", "1-0", "1-1", "0-2", "1-2", "2-2", "3-2", "3-0",
];

pub const OUTS_OPTIONS: [Option<u8>; 4] = [None, Some(0), Some(1), Some(2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    All,
    Left,
    Right,
}

impl Handedness {
    pub const ORDER: [Handedness; 3] = [Handedness::All, Handedness::Left, Handedness::Right];

    pub fn label(self) -> &'static str {
        match self {
            Handedness::All => "All",
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }

    /// The value the Statcast handedness column carries for this side.
    fn want(self) -> Option<&'static str> {
        match self {
            Handedness::All => None,
            Handedness::Left => Some("L"),
            Handedness::Right => Some("R"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseState {
    All,
    Empty,
    Risp,
    RunnersOn,
    FirstOccupied,
    FirstOnly,
    FirstAndSecond,
    FirstAndThird,
    SecondOccupied,
    SecondOnly,
    SecondAndThird,
    ThirdOccupied,
    ThirdOnly,
    BasesLoaded,
}

impl BaseState {
    pub const ORDER: [BaseState; 14] = [
        BaseState::All,
        BaseState::Empty,
        BaseState::Risp,
        BaseState::RunnersOn,
        BaseState::FirstOccupied,
        BaseState::FirstOnly,
        BaseState::FirstAndSecond,
        BaseState::FirstAndThird,
        BaseState::SecondOccupied,
        BaseState::SecondOnly,
        BaseState::SecondAndThird,
        BaseState::ThirdOccupied,
        BaseState::ThirdOnly,
        BaseState::BasesLoaded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BaseState::All => "All",
            BaseState::Empty => "Empty",
            BaseState::Risp => "RISP",
            BaseState::RunnersOn => "Runners On",
            BaseState::FirstOccupied => "First occupied",
            BaseState::FirstOnly => "First Only",
            BaseState::FirstAndSecond => "First & Second",
            BaseState::FirstAndThird => "First & Third",
            BaseState::SecondOccupied => "Second occupied",
            BaseState::SecondOnly => "Second Only",
            BaseState::SecondAndThird => "Second & Third",
            BaseState::ThirdOccupied => "Third occupied",
            BaseState::ThirdOnly => "Third Only",
            BaseState::BasesLoaded => "Bases Loaded",
        }
    }

    pub fn matches(self, row: &PitchEvent) -> bool {
        let first = row.on_1b.is_some();
        let second = row.on_2b.is_some();
        let third = row.on_3b.is_some();
        match self {
            BaseState::All => true,
            BaseState::Empty => !first && !second && !third,
            BaseState::Risp => second || third,
            BaseState::RunnersOn => first || second || third,
            BaseState::FirstOccupied => first,
            BaseState::FirstOnly => first && !second && !third,
            BaseState::FirstAndSecond => first && second && !third,
            BaseState::FirstAndThird => first && !second && third,
            BaseState::SecondOccupied => second,
            BaseState::SecondOnly => !first && second && !third,
            BaseState::SecondAndThird => !first && second && third,
            BaseState::ThirdOccupied => third,
            BaseState::ThirdOnly => !first && !second && third,
            BaseState::BasesLoaded => first && second && third,
        }
    }
}

/// One situation's worth of selector values. Each dimension is an
/// independent row predicate; they always combine by AND.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationFilters {
    pub handedness: Handedness,
    pub count: String,
    pub outs: Option<u8>,
    pub base: BaseState,
}

impl SituationFilters {
    pub fn all() -> Self {
        Self {
            handedness: Handedness::All,
            count: "All".to_string(),
            outs: None,
            base: BaseState::All,
        }
    }

    pub fn cycle_handedness(&mut self, forward: bool) {
        self.handedness = cycle(&Handedness::ORDER, &self.handedness, forward);
    }

    pub fn cycle_count(&mut self, forward: bool) {
        let pos = COUNT_OPTIONS
            .iter()
            .position(|opt| *opt == self.count)
            .unwrap_or(0);
        let next = step(pos, COUNT_OPTIONS.len(), forward);
        self.count = COUNT_OPTIONS[next].to_string();
    }

    pub fn cycle_outs(&mut self, forward: bool) {
        self.outs = cycle(&OUTS_OPTIONS, &self.outs, forward);
    }

    pub fn cycle_base(&mut self, forward: bool) {
        self.base = cycle(&BaseState::ORDER, &self.base, forward);
    }

    pub fn outs_label(&self) -> String {
        match self.outs {
            None => "All".to_string(),
            Some(n) => n.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} | {} | Outs: {} | {}",
            self.handedness.label(),
            self.count,
            self.outs_label(),
            self.base.label()
        )
    }
}

fn cycle<T: Copy + PartialEq>(order: &[T], current: &T, forward: bool) -> T {
    let pos = order.iter().position(|v| v == current).unwrap_or(0);
    order[step(pos, order.len(), forward)]
}

fn step(pos: usize, len: usize, forward: bool) -> usize {
    if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    }
}

/// "B-S" -> (balls, strikes). None for "All" or anything malformed.
pub fn parse_count(option: &str) -> Option<(u8, u8)> {
    let (balls, strikes) = option.split_once('-')?;
    let balls = balls.trim().parse::<u8>().ok()?;
    let strikes = strikes.trim().parse::<u8>().ok()?;
    Some((balls, strikes))
}

/// Apply all four situational predicates. Pure projection: the input table
/// is untouched and the result is a fresh row vector.
///
/// The handedness dimension is a no-op when the source CSV carried none of
/// the known handedness column aliases (the table records that at parse
/// time). A count option that does not parse as "B-S" skips that dimension.
pub fn apply_filters(table: &PitchTable, filters: &SituationFilters) -> Vec<PitchEvent> {
    let want_side = if table.has_batter_side {
        filters.handedness.want()
    } else {
        None
    };
    let want_count = if filters.count == "All" {
        None
    } else {
        parse_count(&filters.count)
    };

    table
        .rows
        .iter()
        .filter(|row| {
            if let Some(side) = want_side {
                if row.batter_side.as_deref() != Some(side) {
                    return false;
                }
            }
            if let Some((balls, strikes)) = want_count {
                if row.balls != Some(balls) || row.strikes != Some(strikes) {
                    return false;
                }
            }
            if let Some(outs) = filters.outs {
                if row.outs_when_up != Some(outs) {
                    return false;
                }
            }
            filters.base.matches(row)
        })
        .cloned()
        .collect()
}
