use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::AuthorityCalendar;
use crate::error::Result;
use crate::reservation::Reservation;
use crate::resource::ResourceSet;
use crate::term::Term;

/// Pluggable decision points the engine calls but must never embed. The
/// engine hands the calendar in read-only for inspection; any mutation a
/// policy wants goes back through the engine's own API so invariants keep
/// holding.
///
/// Implementations must not block: they run inline inside the kernel's
/// single task, so a blocking policy would stall every other reservation
/// the kernel owns.
#[async_trait]
pub trait Policy: Send + Sync {
    async fn allocate(&self, request: &ResourceSet, term: &Term, calendar: &AuthorityCalendar, now: DateTime<Utc>) -> Result<Option<(ResourceSet, Term)>>;

    async fn extend(&self, reservation: &Reservation, new_end: DateTime<Utc>, calendar: &AuthorityCalendar, now: DateTime<Utc>) -> Result<Option<Term>>;

    async fn close_eligible(&self, reservation: &Reservation, now: DateTime<Utc>) -> bool;
}

/// Admits every request for the units requested, for the remainder of the
/// requested term; extends to whatever end time is asked. Useful as the
/// default for tests and single-actor demos where no real inventory backs
/// the decision.
pub struct AdmitAllPolicy;

#[async_trait]
impl Policy for AdmitAllPolicy {
    async fn allocate(&self, request: &ResourceSet, term: &Term, _calendar: &AuthorityCalendar, _now: DateTime<Utc>) -> Result<Option<(ResourceSet, Term)>> {
        Ok(Some((request.clone(), *term)))
    }

    async fn extend(&self, reservation: &Reservation, new_end: DateTime<Utc>, _calendar: &AuthorityCalendar, _now: DateTime<Utc>) -> Result<Option<Term>> {
        let current = reservation.term.or(reservation.approved_term).ok_or_else(|| crate::error::ControlPlaneError::Validation("no term to extend".into()))?;
        Ok(Some(current.extend(new_end)?))
    }

    async fn close_eligible(&self, reservation: &Reservation, now: DateTime<Utc>) -> bool {
        reservation.term.map(|t| now > t.end()).unwrap_or(false)
    }
}
