//! Transactional decision submission
//!
//! A submission confirms a displayed indicated premium. The premium is
//! recomputed under the requested knobs and a mismatch is rejected so the
//! participant re-reviews current numbers. The decision lock is held only
//! across the validate-and-persist step.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::lock::{DecisionLockStore, LockKey};
use crate::regression::TrendSeries;

use super::data::{CapitalTest, DecisionKnobs, IndicationRecord};
use super::engine::compute_indication;

/// Confirmed premiums must match the recomputation to within half a cent
pub const PREMIUM_MATCH_TOLERANCE: f64 = 0.005;

/// Why a submission was not persisted
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The year's decision was already locked in
    #[error("decision for year {year} is already locked")]
    AlreadyLocked { year: i32 },

    /// Failed capital test: the decision is fixed by the regulator
    #[error("regulatory intervention is in effect; the decision cannot be edited")]
    RegulatoryIntervention,

    #[error("{knob} value {value} is outside the allowed range")]
    KnobOutOfRange { knob: &'static str, value: i32 },

    /// Another submission holds the decision lock. Expected under
    /// concurrent confirms; the caller retries.
    #[error("submission in progress elsewhere; try again")]
    LockBusy,

    /// The displayed premium no longer matches a fresh computation.
    /// Recoverable: the caller re-displays and the participant re-confirms.
    #[error("indicated premium is stale (current {expected:.2}, confirmed {confirmed:.2})")]
    StalePremium { expected: f64, confirmed: f64 },
}

/// A participant's confirmation of the displayed indication
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRequest {
    pub user_id: u32,
    pub knobs: DecisionKnobs,
    /// The indicated premium the participant saw and confirmed
    pub confirmed_premium: f64,
}

/// Validate and persist a pricing decision.
///
/// On success the knobs, indicated premium and rate change are persisted
/// and the record is locked until the yearly advance. Every failure leaves
/// the record untouched and the lock released.
pub fn submit_decision(
    record: &mut IndicationRecord,
    series: &TrendSeries,
    locks: &mut DecisionLockStore,
    request: &SubmissionRequest,
    now: DateTime<Utc>,
) -> Result<(), SubmitError> {
    if record.locked {
        return Err(SubmitError::AlreadyLocked { year: record.year });
    }
    if record.capital_test == CapitalTest::Fail {
        return Err(SubmitError::RegulatoryIntervention);
    }
    validate_knobs(record, &request.knobs)?;

    let key = LockKey {
        game_id: record.game_id,
        user_id: request.user_id,
    };
    if !locks.acquire_at(key, now).is_granted() {
        log::warn!(
            "submission lock busy for game {} user {}",
            key.game_id,
            key.user_id
        );
        return Err(SubmitError::LockBusy);
    }

    let fresh = compute_indication(record, series, &request.knobs);
    if (fresh.indicated_premium - request.confirmed_premium).abs() > PREMIUM_MATCH_TOLERANCE {
        locks.release(&key);
        log::warn!(
            "stale premium for participant {} year {}: {:.2} vs confirmed {:.2}",
            record.participant_id,
            record.year,
            fresh.indicated_premium,
            request.confirmed_premium
        );
        return Err(SubmitError::StalePremium {
            expected: fresh.indicated_premium,
            confirmed: request.confirmed_premium,
        });
    }

    record.knobs = request.knobs;
    record.indicated_premium = fresh.indicated_premium;
    record.rate_change = fresh.rate_change;
    record.locked = true;
    locks.release(&key);

    log::info!(
        "decision locked for participant {} year {} at premium {:.2}",
        record.participant_id,
        record.year,
        record.indicated_premium
    );
    Ok(())
}

fn validate_knobs(record: &IndicationRecord, knobs: &DecisionKnobs) -> Result<(), SubmitError> {
    if !record.ranges.profit_margin.accepts(knobs.profit_margin) {
        return Err(SubmitError::KnobOutOfRange {
            knob: "profit margin",
            value: knobs.profit_margin,
        });
    }
    if !record.ranges.marketing_ratio.accepts(knobs.marketing_ratio) {
        return Err(SubmitError::KnobOutOfRange {
            knob: "marketing expense ratio",
            value: knobs.marketing_ratio,
        });
    }
    if !record.ranges.trend_margin.accepts(knobs.trend_margin) {
        return Err(SubmitError::KnobOutOfRange {
            knob: "trend margin",
            value: knobs.trend_margin,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indication::data::{DecisionRanges, Difficulty, IndicationInputs};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn series() -> TrendSeries {
        let points: Vec<(i32, f64)> = (0..3)
            .map(|i| (2021 + i, 500.0 * 1.05_f64.powi(i)))
            .collect();
        TrendSeries::new(points, vec![false; 3]).unwrap()
    }

    fn record(capital_ratio: f64) -> IndicationRecord {
        IndicationRecord::seed(
            1,
            1,
            2024,
            IndicationInputs {
                fixed_expense_per_unit: 60.0,
                variable_expense_per_unit: 25.0,
                premium_variable_rate: 0.04,
                capital_ratio,
                capital_required_ratio: 1.5,
                current_premium: 900.0,
                credibility_weights: vec![0.2, 0.3, 0.5],
                historical_loss_costs: vec![500.0, 525.0, 551.25],
            },
            DecisionRanges::for_tier(Difficulty::Standard),
            None,
            None,
        )
    }

    fn request(record: &IndicationRecord) -> SubmissionRequest {
        let fresh = compute_indication(record, &series(), &record.knobs);
        SubmissionRequest {
            user_id: record.participant_id,
            knobs: record.knobs,
            confirmed_premium: fresh.indicated_premium,
        }
    }

    #[test]
    fn test_successful_submission_locks_record_and_releases_lock() {
        let mut record = record(2.0);
        let mut locks = DecisionLockStore::new();
        let req = request(&record);

        submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap();

        assert!(record.locked);
        assert!(!record.is_editable());
        assert!((record.indicated_premium - req.confirmed_premium).abs() < 1e-9);
        // Lock released on success: the key is immediately reusable
        let key = LockKey { game_id: 1, user_id: req.user_id };
        assert!(locks.acquire_at(key, now()).is_granted());
    }

    #[test]
    fn test_stale_premium_rejected_and_record_untouched() {
        let mut record = record(2.0);
        let mut locks = DecisionLockStore::new();
        let mut req = request(&record);
        req.confirmed_premium += 1.0;

        let err = submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap_err();
        assert!(matches!(err, SubmitError::StalePremium { .. }));
        assert!(!record.locked);
        assert_eq!(record.indicated_premium, 0.0);
        // Lock released on the failure path too
        let key = LockKey { game_id: 1, user_id: req.user_id };
        assert!(locks.acquire_at(key, now()).is_granted());
    }

    #[test]
    fn test_concurrent_submitter_gets_try_again() {
        let mut record = record(2.0);
        let mut locks = DecisionLockStore::new();
        let req = request(&record);

        // A concurrent confirm from the same company already holds the lock
        let key = LockKey { game_id: 1, user_id: req.user_id };
        assert!(locks.acquire_at(key, now()).is_granted());

        let err = submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap_err();
        assert!(matches!(err, SubmitError::LockBusy));
        assert!(!record.locked);
    }

    #[test]
    fn test_locked_record_rejects_resubmission() {
        let mut record = record(2.0);
        let mut locks = DecisionLockStore::new();
        let req = request(&record);
        submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap();

        let err = submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap_err();
        assert!(matches!(err, SubmitError::AlreadyLocked { year: 2024 }));
    }

    #[test]
    fn test_regulatory_intervention_blocks_submission() {
        let mut record = record(1.2);
        let mut locks = DecisionLockStore::new();
        let req = request(&record);

        let err = submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap_err();
        assert!(matches!(err, SubmitError::RegulatoryIntervention));
    }

    #[test]
    fn test_out_of_range_knob_rejected_before_locking() {
        let mut record = record(2.0);
        let mut locks = DecisionLockStore::new();
        let mut req = request(&record);
        req.knobs.profit_margin = 101;

        let err = submit_decision(&mut record, &series(), &mut locks, &req, now()).unwrap_err();
        assert!(matches!(err, SubmitError::KnobOutOfRange { knob: "profit margin", .. }));
    }
}
