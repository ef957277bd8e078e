//! Export quota policy.
//!
//! Decides whether an account may export right now and how many credits a
//! successful export consumes. Everything here is pure; the daily export count
//! and clock readings are supplied by the caller.

use chrono::{DateTime, Local, NaiveTime, Utc};
use mockable::Clock;
use serde::Serialize;

use crate::domain::{Plan, PlanType, UserAccount};

/// Why an export was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum QuotaDenial {
    /// Free plan with an exhausted starter allowance.
    NoFreeCredits,
    /// Pay-per-document plan with no purchased credits left.
    NoPurchasedCredits,
    /// Subscription plan that already hit its daily cap.
    DailyLimitReached { limit: u32 },
}

impl QuotaDenial {
    /// Short machine-oriented reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoFreeCredits => "no free credits",
            Self::NoPurchasedCredits => "no purchased credits",
            Self::DailyLimitReached { .. } => "daily limit reached",
        }
    }

    /// Notice shown to the user when the browser export is bounced.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::NoFreeCredits => concat!(
                "You have no free document credits left. ",
                "Please upgrade your plan to keep exporting."
            )
            .to_owned(),
            Self::NoPurchasedCredits => {
                "You have no document credits. Please purchase more to export.".to_owned()
            }
            Self::DailyLimitReached { limit } => format!(
                "You have reached your daily export limit of {limit} documents. \
                 Please upgrade your plan or try again tomorrow."
            ),
        }
    }

    /// Denial to report when the stored balance ran out between the quota
    /// check and the commit.
    #[must_use]
    pub const fn credits_exhausted_for(plan_type: PlanType) -> Self {
        match plan_type {
            PlanType::OneTimeDocument => Self::NoPurchasedCredits,
            PlanType::Free | PlanType::MonthlySubscription => Self::NoFreeCredits,
        }
    }
}

impl std::fmt::Display for QuotaDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny(QuotaDenial),
}

/// Apply the plan rules, first match wins:
///
/// 1. free plan without credits is denied;
/// 2. pay-per-document plan without credits is denied;
/// 3. subscription with a daily cap already reached is denied;
/// 4. anything else is allowed.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::export::{evaluate, QuotaDecision, QuotaDenial};
/// # use assignment_formatter::domain::{Plan, PlanId, PlanType, UserAccount, UserId};
/// # let plan = Plan {
/// #     id: PlanId::new(1).unwrap(), name: "Free".into(), plan_type: PlanType::Free,
/// #     price_minor: 0, currency: "USD".into(), document_cost_minor: 0,
/// #     is_watermarked_export: true, max_documents_per_day: None, initial_credits: 3,
/// #     features: vec![],
/// # };
/// # let user = UserAccount {
/// #     id: UserId::new(1).unwrap(), name: "Ada".into(), document_credits: 0,
/// #     current_plan_id: plan.id, subscription_end: None,
/// # };
/// assert_eq!(
///     evaluate(&plan, &user, 0),
///     QuotaDecision::Deny(QuotaDenial::NoFreeCredits)
/// );
/// ```
#[must_use]
pub fn evaluate(plan: &Plan, user: &UserAccount, today_export_count: u32) -> QuotaDecision {
    match plan.plan_type {
        PlanType::Free if user.document_credits <= 0 => {
            QuotaDecision::Deny(QuotaDenial::NoFreeCredits)
        }
        PlanType::OneTimeDocument if user.document_credits <= 0 => {
            QuotaDecision::Deny(QuotaDenial::NoPurchasedCredits)
        }
        PlanType::MonthlySubscription => match plan.max_documents_per_day {
            Some(limit) if today_export_count >= limit => {
                QuotaDecision::Deny(QuotaDenial::DailyLimitReached { limit })
            }
            _ => QuotaDecision::Allow,
        },
        _ => QuotaDecision::Allow,
    }
}

/// Credits consumed by a successful export.
///
/// Pay-per-document always spends one credit; the free plan spends one while
/// it has any; subscriptions never spend credits. The store applies every
/// decrement with a `credits >= 1` guard, so the balance cannot go negative.
#[must_use]
pub const fn credit_delta(plan_type: PlanType, document_credits: i32) -> i32 {
    match plan_type {
        PlanType::OneTimeDocument => -1,
        PlanType::Free if document_credits > 0 => -1,
        PlanType::Free | PlanType::MonthlySubscription => 0,
    }
}

/// Start of the current calendar day, with the boundary at local midnight.
///
/// When local midnight does not exist (a DST gap), the earliest valid instant
/// of the day is used instead.
pub fn local_day_start(clock: &dyn Clock) -> DateTime<Utc> {
    let now = clock.local();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local).earliest() {
        Some(start) => start.with_timezone(&Utc),
        None => {
            let elapsed = now.time() - NaiveTime::MIN;
            (now - elapsed).with_timezone(&Utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Timelike};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{PlanId, UserId};

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn plan(plan_type: PlanType, max_documents_per_day: Option<u32>) -> Plan {
        Plan {
            id: PlanId::new(1).expect("valid id"),
            name: "Test".to_owned(),
            plan_type,
            price_minor: 0,
            currency: "USD".to_owned(),
            document_cost_minor: 0,
            is_watermarked_export: false,
            max_documents_per_day,
            initial_credits: 0,
            features: Vec::new(),
        }
    }

    fn account(document_credits: i32) -> UserAccount {
        UserAccount {
            id: UserId::new(7).expect("valid id"),
            name: "Ada".to_owned(),
            document_credits,
            current_plan_id: PlanId::new(1).expect("valid id"),
            subscription_end: None,
        }
    }

    #[fixture]
    fn monthly_capped() -> Plan {
        plan(PlanType::MonthlySubscription, Some(3))
    }

    #[rstest]
    #[case(PlanType::Free, 0, QuotaDecision::Deny(QuotaDenial::NoFreeCredits))]
    #[case(PlanType::Free, -1, QuotaDecision::Deny(QuotaDenial::NoFreeCredits))]
    #[case(PlanType::Free, 1, QuotaDecision::Allow)]
    #[case(
        PlanType::OneTimeDocument,
        0,
        QuotaDecision::Deny(QuotaDenial::NoPurchasedCredits)
    )]
    #[case(PlanType::OneTimeDocument, 2, QuotaDecision::Allow)]
    #[case(PlanType::MonthlySubscription, 0, QuotaDecision::Allow)]
    fn credit_rules(
        #[case] plan_type: PlanType,
        #[case] credits: i32,
        #[case] expected: QuotaDecision,
    ) {
        assert_eq!(evaluate(&plan(plan_type, None), &account(credits), 0), expected);
    }

    #[rstest]
    fn monthly_cap_denies_once_reached(monthly_capped: Plan) {
        assert_eq!(
            evaluate(&monthly_capped, &account(0), 3),
            QuotaDecision::Deny(QuotaDenial::DailyLimitReached { limit: 3 })
        );
    }

    #[rstest]
    fn monthly_cap_allows_below_limit(monthly_capped: Plan) {
        assert_eq!(evaluate(&monthly_capped, &account(0), 2), QuotaDecision::Allow);
    }

    #[rstest]
    fn monthly_without_cap_is_unlimited() {
        let plan = plan(PlanType::MonthlySubscription, None);
        assert_eq!(evaluate(&plan, &account(0), 10_000), QuotaDecision::Allow);
    }

    #[rstest]
    fn daily_cap_is_ignored_for_credit_plans() {
        let plan = plan(PlanType::OneTimeDocument, Some(1));
        assert_eq!(evaluate(&plan, &account(5), 9), QuotaDecision::Allow);
    }

    #[rstest]
    #[case(PlanType::OneTimeDocument, 4, -1)]
    #[case(PlanType::Free, 1, -1)]
    #[case(PlanType::Free, 0, 0)]
    #[case(PlanType::MonthlySubscription, 9, 0)]
    fn credit_delta_per_plan(#[case] plan_type: PlanType, #[case] credits: i32, #[case] delta: i32) {
        assert_eq!(credit_delta(plan_type, credits), delta);
    }

    #[rstest]
    fn day_start_is_local_midnight_before_now() {
        let utc_now = Utc
            .with_ymd_and_hms(2026, 3, 14, 15, 30, 0)
            .single()
            .expect("valid timestamp");
        let clock = FixtureClock { utc_now };

        let start = local_day_start(&clock);

        assert!(start <= utc_now);
        assert!(utc_now - start < Duration::hours(25));
        let local_start = start.with_timezone(&Local);
        assert_eq!(local_start.date_naive(), clock.local().date_naive());
        assert_eq!(local_start.hour(), 0);
    }

    #[rstest]
    fn denial_notice_mentions_the_limit() {
        let notice = QuotaDenial::DailyLimitReached { limit: 3 }.notice();
        assert!(notice.contains("daily export limit of 3"));
    }
}
