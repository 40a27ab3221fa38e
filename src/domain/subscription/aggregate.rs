//! Subscription aggregate entity.
//!
//! A Subscription is an owner's enrollment in a plan for a billing cycle.
//! Owners may hold several over time; operations act on the most recent one.
//!
//! # Design Decisions
//!
//! - **Explicit clock**: every mutation takes `now`; the aggregate never reads the system time
//! - **Optimistic concurrency**: `version` is the row version seen at load time
//! - **`is_active` mirrors status**: kept in sync on every transition
//! - **Null `ended_at`**: the subscription is exempt from expiration and warnings

use crate::domain::foundation::{
    DomainError, PlanId, StateMachine, SubscriptionId, Timestamp,
};
use crate::domain::plan::Plan;
use serde::{Deserialize, Serialize};

use super::{BillingCycle, Owner, SubscriptionStatus};

/// Subscription aggregate.
///
/// # Invariants
///
/// - `trial_ends_at` is set only when the plan offered a trial
/// - `is_active == (status == Active)`
/// - Status transitions follow `SubscriptionStatus` state machine rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,

    /// User or team holding the subscription.
    pub owner: Owner,

    pub plan_id: PlanId,

    pub status: SubscriptionStatus,

    pub billing_cycle: BillingCycle,

    /// Recorded intent only. Nothing renews automatically.
    pub auto_renew: bool,

    pub is_active: bool,

    /// End of the trial. None when the plan had no trial.
    pub trial_ends_at: Option<Timestamp>,

    /// Start of the current billing period.
    pub started_at: Timestamp,

    /// End of the current billing period.
    pub ended_at: Option<Timestamp>,

    /// Row version for compare-and-swap updates.
    pub version: i64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Subscription {
    /// Start a subscription to `plan`.
    ///
    /// Plans with trial days start in `Trial` and the first paid period
    /// begins when the trial ends. Other plans start `Active` immediately.
    pub fn start(owner: Owner, plan: &Plan, billing_cycle: BillingCycle, now: Timestamp) -> Self {
        let period = billing_cycle.period_days();

        let (status, trial_ends_at, started_at) = if plan.has_trial() {
            let trial_end = now.add_days(i64::from(plan.trial_days));
            (SubscriptionStatus::Trial, Some(trial_end), trial_end)
        } else {
            (SubscriptionStatus::Active, None, now)
        };

        Self {
            id: SubscriptionId::new(),
            owner,
            plan_id: plan.id,
            status,
            billing_cycle,
            auto_renew: true,
            is_active: status == SubscriptionStatus::Active,
            trial_ends_at,
            started_at,
            ended_at: Some(started_at.add_days(period)),
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_trial(&self) -> bool {
        self.status == SubscriptionStatus::Trial
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubscriptionStatus::Pending
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SubscriptionStatus::Cancelled
    }

    pub fn is_expired(&self) -> bool {
        self.status == SubscriptionStatus::Expired
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// True once a recorded trial end has been reached.
    pub fn trial_has_ended(&self, now: Timestamp) -> bool {
        self.trial_ends_at.map(|end| now >= end).unwrap_or(false)
    }

    /// True once a recorded period end has been reached.
    pub fn period_has_ended(&self, now: Timestamp) -> bool {
        self.ended_at.map(|end| now >= end).unwrap_or(false)
    }

    /// Whole days between `now` and the period end, in either direction.
    ///
    /// None when there is no period end.
    pub fn days_until_renewal(&self, now: Timestamp) -> Option<i64> {
        self.ended_at.map(|end| now.whole_days_between(&end))
    }

    /// Whether the subscription still blocks a new one for the same owner.
    pub fn is_open(&self, now: Timestamp) -> bool {
        match self.status {
            SubscriptionStatus::Trial | SubscriptionStatus::Pending | SubscriptionStatus::Active => {
                true
            }
            SubscriptionStatus::Cancelled => !self.period_has_ended(now),
            SubscriptionStatus::Expired => false,
        }
    }

    /// Trial is over; wait for the first paid period.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is not in trial.
    pub fn end_trial(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Pending, now)
    }

    /// Paid period ran out.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is not active.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired, now)
    }

    /// Cancel at the owner's request. `ended_at` is left as is.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is neither active nor in trial.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled, now)
    }

    /// Reactivate regardless of the current status or period end.
    pub fn resume(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active, now)
    }

    /// Reactivate and extend the period end by one period.
    ///
    /// The extension is added to the current `ended_at` so remaining time is
    /// kept. Without a period end, the new period starts at `now`.
    pub fn renew(&mut self, annual: bool, now: Timestamp) -> Result<(), DomainError> {
        let days = BillingCycle::from_annual(annual).period_days();
        let base = self.ended_at.unwrap_or(now);
        self.transition_to(SubscriptionStatus::Active, now)?;
        self.ended_at = Some(base.add_days(days));
        Ok(())
    }

    /// Hide the subscription from lookups. Invoices are kept.
    pub fn soft_delete(&mut self, now: Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn transition_to(
        &mut self,
        target: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target)?;
        self.is_active = self.status == SubscriptionStatus::Active;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, OwnerId};
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap())
    }

    fn owner() -> Owner {
        Owner::user(OwnerId::new("user-1").unwrap())
    }

    fn plan(trial_days: u32) -> Plan {
        Plan::new("Pro", 1_000, 10_000, "USD")
            .unwrap()
            .with_trial_days(trial_days)
            .unwrap()
    }

    fn active(cycle: BillingCycle) -> Subscription {
        Subscription::start(owner(), &plan(0), cycle, now())
    }

    // ════════════════════════════════════════════════════════════════════
    // Start
    // ════════════════════════════════════════════════════════════════════

    #[test]
    fn trial_plan_starts_in_trial_with_shifted_period() {
        let sub = Subscription::start(owner(), &plan(5), BillingCycle::Monthly, now());

        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert!(!sub.is_active);
        assert_eq!(sub.trial_ends_at, Some(now().add_days(5)));
        assert_eq!(sub.started_at, now().add_days(5));
        assert_eq!(sub.ended_at, Some(now().add_days(35)));
    }

    #[test]
    fn plan_without_trial_starts_active_now() {
        let sub = active(BillingCycle::Yearly);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_active);
        assert_eq!(sub.trial_ends_at, None);
        assert_eq!(sub.started_at, now());
        assert_eq!(sub.ended_at, Some(now().add_days(365)));
        assert_eq!(sub.version, 0);
    }

    // ════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════

    #[test]
    fn end_trial_moves_to_pending() {
        let mut sub = Subscription::start(owner(), &plan(5), BillingCycle::Monthly, now());
        let later = now().add_days(6);

        sub.end_trial(later).unwrap();

        assert!(sub.is_pending());
        assert!(!sub.is_active);
        assert_eq!(sub.updated_at, later);
    }

    #[test]
    fn expire_requires_active() {
        let mut sub = Subscription::start(owner(), &plan(5), BillingCycle::Monthly, now());
        let err = sub.expire(now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert!(sub.is_trial());
    }

    #[test]
    fn cancel_keeps_period_end() {
        let mut sub = active(BillingCycle::Monthly);
        let ended_at = sub.ended_at;

        sub.cancel(now()).unwrap();

        assert!(sub.is_cancelled());
        assert!(!sub.is_active);
        assert_eq!(sub.ended_at, ended_at);
    }

    #[test]
    fn resume_reactivates_cancelled() {
        let mut sub = active(BillingCycle::Monthly);
        sub.cancel(now()).unwrap();

        sub.resume(now()).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_active);
    }

    #[test]
    fn renew_extends_from_current_period_end() {
        let mut sub = active(BillingCycle::Monthly);
        let end = sub.ended_at.unwrap();

        sub.renew(true, now()).unwrap();

        assert_eq!(sub.ended_at, Some(end.add_days(365)));
        assert!(sub.is_active);
    }

    #[test]
    fn renew_of_expired_keeps_elapsed_base() {
        let mut sub = active(BillingCycle::Monthly);
        let end = sub.ended_at.unwrap();
        sub.expire(end).unwrap();

        sub.renew(false, end.add_days(10)).unwrap();

        assert_eq!(sub.ended_at, Some(end.add_days(30)));
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn renew_without_period_end_starts_from_now() {
        let mut sub = active(BillingCycle::Monthly);
        sub.ended_at = None;

        sub.renew(false, now()).unwrap();

        assert_eq!(sub.ended_at, Some(now().add_days(30)));
    }

    // ════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════

    #[test]
    fn days_until_renewal_is_absolute_and_truncated() {
        let sub = active(BillingCycle::Monthly);
        let end = sub.ended_at.unwrap();

        assert_eq!(sub.days_until_renewal(end.minus_days(3).add_hours(-5)), Some(3));
        assert_eq!(sub.days_until_renewal(end.add_days(2)), Some(2));
    }

    #[test]
    fn days_until_renewal_absent_without_period_end() {
        let mut sub = active(BillingCycle::Monthly);
        sub.ended_at = None;
        assert_eq!(sub.days_until_renewal(now()), None);
        assert!(!sub.period_has_ended(now().add_days(10_000)));
    }

    #[test]
    fn cancelled_is_open_until_period_end() {
        let mut sub = active(BillingCycle::Monthly);
        sub.cancel(now()).unwrap();
        let end = sub.ended_at.unwrap();

        assert!(sub.is_open(end.minus_days(1)));
        assert!(!sub.is_open(end));
    }

    #[test]
    fn soft_delete_marks_deleted() {
        let mut sub = active(BillingCycle::Monthly);
        sub.soft_delete(now());
        assert!(sub.is_deleted());
    }
}
