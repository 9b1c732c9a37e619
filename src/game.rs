//! Game state container and session preferences
//!
//! The stochastic yearly advance lives outside this crate; `GameState` is
//! the read/compute/submit surface over the data it produces. Session
//! preferences are explicit records with a freshness window, not ambient
//! mutable state.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::indication::{DecisionRanges, Difficulty, IndicationInputs, IndicationRecord};
use crate::triangle::{Coverage, LossTriangle, TriangleError, TriangleKey};
use crate::valuation::FinancialYear;

/// Preferences older than this are discarded and re-defaulted
pub const PREFS_FRESH_MINUTES: i64 = 60;

/// A user's saved game-setup preferences: computer-opponent counts per
/// archetype, whether opponents' decisions are observable, and the
/// difficulty tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePrefs {
    pub user_id: u32,
    /// Opponent count per computer-player archetype (growth / balanced /
    /// margin-focused)
    pub opponent_counts: [u32; 3],
    pub observable: bool,
    pub difficulty: Difficulty,
    pub saved_at: DateTime<Utc>,
}

impl GamePrefs {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.saved_at < Duration::minutes(PREFS_FRESH_MINUTES)
    }
}

/// In-process store of per-user preferences
#[derive(Debug, Clone, Default)]
pub struct PrefsStore {
    prefs: HashMap<u32, GamePrefs>,
}

impl PrefsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, prefs: GamePrefs) {
        self.prefs.insert(prefs.user_id, prefs);
    }

    /// Fetch a user's preferences, dropping them if stale
    pub fn get_fresh(&mut self, user_id: u32, now: DateTime<Utc>) -> Option<&GamePrefs> {
        if let Some(prefs) = self.prefs.get(&user_id) {
            if !prefs.is_fresh(now) {
                self.prefs.remove(&user_id);
                return None;
            }
        }
        self.prefs.get(&user_id)
    }
}

/// All engine-visible state for one game
#[derive(Debug, Clone)]
pub struct GameState {
    pub game_id: u32,
    /// Current simulated year
    pub year: i32,
    pub triangles: HashMap<(u32, Coverage), LossTriangle>,
    pub financials: HashMap<u32, Vec<FinancialYear>>,
    pub indications: HashMap<u32, IndicationRecord>,
}

impl GameState {
    pub fn new(game_id: u32, year: i32) -> Self {
        Self {
            game_id,
            year,
            triangles: HashMap::new(),
            financials: HashMap::new(),
            indications: HashMap::new(),
        }
    }

    pub fn triangle(&self, participant_id: u32, coverage: Coverage) -> Option<&LossTriangle> {
        self.triangles.get(&(participant_id, coverage))
    }

    pub fn participants(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.financials.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

///// Deterministic demo game used by the CLI tools: `participants` companies
/// with `years` of history through `final_year`. Stands in for the yearly
/// simulation advance.
pub fn demo_game(game_id: u32, participants: u32, years: i32, final_year: i32) -> Result<GameState, TriangleError> {
    let mut state = GameState::new(game_id, final_year);
    let first_year = final_year - years + 1;

    for pid in 1..=participants {
        let scale = 1.0 + pid as f64 * 0.35;

        for coverage in Coverage::all() {
            state.triangles.insert(
                (pid, coverage),
                demo_triangle(game_id, pid, coverage, first_year, final_year, scale)?,
            );
        }

        let history: Vec<FinancialYear> = (0..years)
            .map(|i| {
                let growth = 1.0 + 0.02 + (pid % 3) as f64 * 0.015;
                let in_force = 10_000.0 * scale * growth.powi(i);
                FinancialYear {
                    year: first_year + i,
                    in_force,
                    beginning_in_force: in_force / growth,
                    profit: 45.0 * scale * in_force / 10_000.0,
                    dividend_paid: 20_000.0 * scale * (1.0 + i as f64 * 0.1),
                    pv_index: 1.0 / 1.06_f64.powi(years - 1 - i),
                    excess_capital: 150_000.0 * scale,
                }
            })
            .collect();
        state.financials.insert(pid, history);

        let ranges = DecisionRanges::for_tier(Difficulty::Standard);
        let inputs = IndicationInputs {
            fixed_expense_per_unit: 55.0 + pid as f64,
            variable_expense_per_unit: 22.0,
            premium_variable_rate: 0.04,
            capital_ratio: if pid % 5 == 0 { 1.3 } else { 1.9 },
            capital_required_ratio: 1.5,
            current_premium: 850.0 + 12.0 * pid as f64,
            credibility_weights: vec![0.1, 0.15, 0.25, 0.5],
            historical_loss_costs: (0..4).map(|i| 480.0 * 1.045_f64.powi(i)).collect(),
        };
        state.indications.insert(
            pid,
            IndicationRecord::seed(game_id, pid, final_year, inputs, ranges, None, None),
        );
    }

    Ok(state)
}

fn demo_triangle(
    game_id: u32,
    participant_id: u32,
    coverage: Coverage,
    first_year: i32,
    final_year: i32,
    scale: f64,
) -> Result<LossTriangle, TriangleError> {
    let dev_months = vec![12, 24, 36];
    let n_periods = dev_months.len();
    let emergence = match coverage {
        Coverage::Liability => [0.55, 0.85, 1.0],
        Coverage::AccidentBenefits => [0.45, 0.80, 1.0],
        Coverage::Collision => [0.85, 0.98, 1.0],
        Coverage::Comprehensive => [0.90, 1.0, 1.0],
    };

    let accident_years: Vec<i32> = (first_year..=final_year).collect();
    let mut paid = Vec::with_capacity(accident_years.len());
    let mut incurred = Vec::with_capacity(accident_years.len());

    for (i, &ay) in accident_years.iter().enumerate() {
        let observed = (accident_years.len() - i).min(n_periods);
        let ultimate = 100_000.0 * scale * 1.04_f64.powi(ay - first_year);
        let paid_row: Vec<f64> = (0..observed).map(|p| ultimate * emergence[p]).collect();
        let incurred_row: Vec<f64> = (0..observed)
            .map(|p| ultimate * (emergence[p] + (1.0 - emergence[p]) * 0.7))
            .collect();
        paid.push(paid_row);
        incurred.push(incurred_row);
    }

    LossTriangle::new(
        TriangleKey {
            game_id,
            participant_id,
            coverage,
            evaluation_year: final_year,
        },
        accident_years,
        dev_months,
        paid,
        incurred,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn prefs(saved_at: DateTime<Utc>) -> GamePrefs {
        GamePrefs {
            user_id: 9,
            opponent_counts: [2, 3, 2],
            observable: true,
            difficulty: Difficulty::Standard,
            saved_at,
        }
    }

    #[test]
    fn test_fresh_prefs_are_returned() {
        let mut store = PrefsStore::new();
        store.upsert(prefs(t0()));
        let found = store.get_fresh(9, t0() + Duration::minutes(30));
        assert!(found.is_some());
        assert_eq!(found.unwrap().opponent_counts, [2, 3, 2]);
    }

    #[test]
    fn test_stale_prefs_are_dropped() {
        let mut store = PrefsStore::new();
        store.upsert(prefs(t0()));
        assert!(store.get_fresh(9, t0() + Duration::minutes(61)).is_none());
        // Dropped, not merely hidden
        assert!(store.get_fresh(9, t0() + Duration::minutes(62)).is_none());
    }

    #[test]
    fn test_demo_game_shape() {
        let state = demo_game(1, 4, 8, 2023).unwrap();
        assert_eq!(state.participants(), vec![1, 2, 3, 4]);
        assert_eq!(state.triangles.len(), 16);

        let tri = state.triangle(1, Coverage::Liability).unwrap();
        assert_eq!(tri.n_accident_years(), 8);
        // Newest accident year has a single observation
        assert_eq!(tri.observed(7), 1);
        assert!(tri.is_fully_developed(0));

        let history = &state.financials[&1];
        assert_eq!(history.len(), 8);
        assert_eq!(history.last().unwrap().year, 2023);
        // PV index stored oldest-first, deepest discount first
        assert!(history[0].pv_index < history[7].pv_index);
    }
}
