use crate::constants::detection::{
    IMMINENT_THRESHOLD_HOURS, WINDOW_FUTURE_DAYS, WINDOW_PAST_DAYS,
};
use crate::models::{Fixture, Phase, SubState};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Returns the `[now − 3 days, now + 7 days]` detection window.
pub fn window_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now - Duration::days(WINDOW_PAST_DAYS),
        now + Duration::days(WINDOW_FUTURE_DAYS),
    )
}

/// Fixtures inside the detection window, ordered by kickoff ascending.
pub fn fixtures_in_window(fixtures: &[Fixture], now: DateTime<Utc>) -> Vec<&Fixture> {
    let (from, to) = window_bounds(now);
    let mut window: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| f.date >= from && f.date <= to)
        .collect();
    window.sort_by_key(|f| f.date);
    window
}

/// Classifies a league's fixtures into a sub-state.
///
/// Priority: any live fixture, then an upcoming kickoff within the imminent threshold,
/// then a match finished today, then one finished yesterday, then an upcoming kickoff
/// later today or tomorrow. Returns `None` when nothing in the window qualifies.
///
/// # Arguments
/// * `fixtures` - The league's fixtures in any order; rows outside the window are ignored
/// * `now` - Reference time for the window and day comparisons (UTC calendar days)
pub fn detect_sub_state(fixtures: &[Fixture], now: DateTime<Utc>) -> Option<SubState> {
    let window = fixtures_in_window(fixtures, now);
    if window.is_empty() {
        return None;
    }

    if let Some(live) = window.iter().find(|f| f.status.is_live()) {
        debug!(
            "Fixture {} is live ({}), league is live",
            live.api_id,
            live.status.code()
        );
        return Some(SubState::Live);
    }

    let today = now.date_naive();
    let yesterday = today.pred_opt();
    let tomorrow = today.succ_opt();

    let next_upcoming = window
        .iter()
        .find(|f| f.status.is_not_started() && f.date > now);

    if let Some(next) = next_upcoming
        && next.date - now <= Duration::hours(IMMINENT_THRESHOLD_HOURS)
    {
        debug!("Fixture {} kicks off at {}, imminent", next.api_id, next.date);
        return Some(SubState::Imminent);
    }

    let finished_on = |day| {
        window
            .iter()
            .any(|f| f.status.is_finished() && Some(f.date.date_naive()) == day)
    };

    if finished_on(Some(today)) {
        return Some(SubState::PostMatch);
    }
    if finished_on(yesterday) {
        return Some(SubState::DayAfter);
    }

    match next_upcoming.map(|f| f.date.date_naive()) {
        Some(day) if day == today => Some(SubState::MatchdayMorning),
        Some(day) if Some(day) == tomorrow => Some(SubState::DayBefore),
        _ => None,
    }
}

/// Detects the orchestratable phase. Total over its input: an empty window or one
/// with nothing close enough to matter resolves to [`Phase::PreMatch`].
pub fn detect_phase(fixtures: &[Fixture], now: DateTime<Utc>) -> Phase {
    detect_sub_state(fixtures, now)
        .map(|state| state.phase())
        .unwrap_or(Phase::PreMatch)
}
