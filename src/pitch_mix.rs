use crate::state::PitchEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct PitchMixRow {
    pub label: String,
    pub count: usize,
    pub usage_pct: f64,
}

/// Group pitches by type label and compute usage shares.
///
/// Rows without a label are dropped before grouping, so the usage
/// percentages always sum to 100 over the returned rows (up to float
/// rounding). Sorted descending by count; ties keep first-seen order.
/// Empty input, or input where every label is missing, yields an empty vec.
pub fn compute_mix(rows: &[PitchEvent], use_pitch_name: bool) -> Vec<PitchMixRow> {
    let mut groups: Vec<(String, usize)> = Vec::new();

    for row in rows {
        let label = if use_pitch_name {
            row.pitch_name.as_deref()
        } else {
            row.pitch_type.as_deref()
        };
        let Some(label) = label else { continue };
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, count)) => *count += 1,
            None => groups.push((label.to_string(), 1)),
        }
    }

    let total: usize = groups.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Vec::new();
    }

    // Vec::sort_by is stable, so equal counts keep first-seen order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    groups
        .into_iter()
        .map(|(label, count)| PitchMixRow {
            label,
            count,
            usage_pct: count as f64 / total as f64 * 100.0,
        })
        .collect()
}
