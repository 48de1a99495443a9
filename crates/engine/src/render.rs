//! Vacation-grant message rendering.
//!
//! Turns one payroll entry plus its joined address and profile records into
//! a ready-to-send email. Rendering is pure: it reads the pre-built indexes
//! and mutates nothing, so concurrent batch dispatchers can share one
//! renderer without synchronization.

use chrono::{DateTime, Utc};

use herald_common::error::DispatchError;
use herald_common::types::{
    AddressRecord, EmployeeProfile, OutboundEmail, PayrollEntry, ReferenceDate,
};

const MILLISECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Fractional years elapsed between `reference` and `now` (365-day years).
fn years_since(reference: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - reference).num_milliseconds() as f64 / MILLISECONDS_PER_YEAR
}

/// Renderer for the bonus-vacation grant notice: one day per year of
/// employment, added to the current payroll balance.
#[derive(Debug)]
pub struct VacationRenderer {
    addresses: crate::join::RecordIndex<AddressRecord>,
    profiles: crate::join::RecordIndex<EmployeeProfile>,
    reference: ReferenceDate,
    now: DateTime<Utc>,
}

impl VacationRenderer {
    /// Index the auxiliary collections and fix the grant instant to "now".
    ///
    /// Fails with a configuration error if either collection carries a
    /// duplicate identifier.
    pub fn new(
        addresses: Vec<AddressRecord>,
        profiles: Vec<EmployeeProfile>,
        reference: ReferenceDate,
    ) -> Result<Self, DispatchError> {
        let addresses = crate::join::RecordIndex::build("address", addresses, |a| &a.emp_id)?;
        let profiles = crate::join::RecordIndex::build("profile", profiles, |p| &p.id)?;
        tracing::debug!(
            addresses = addresses.len(),
            profiles = profiles.len(),
            reference = %reference,
            "Record indexes built"
        );
        Ok(Self {
            addresses,
            profiles,
            reference,
            now: Utc::now(),
        })
    }

    /// Pin the grant instant, replacing the wall clock read in `new`.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Render the notice for one payroll entry.
    ///
    /// Missing address or profile records surface as per-item lookup
    /// failures; a missing end date under `ReferenceDate::End` is a
    /// per-item render failure. Neither affects sibling items.
    pub fn render(&self, entry: &PayrollEntry) -> Result<OutboundEmail, DispatchError> {
        let address = self.addresses.lookup(&entry.emp_id)?;
        let profile = self.profiles.lookup(&entry.emp_id)?;

        let reference = match self.reference {
            ReferenceDate::Start => profile.start_date,
            ReferenceDate::End => profile.end_date.ok_or_else(|| DispatchError::Render {
                emp_id: entry.emp_id.clone(),
                reason: "profile has no end date".to_string(),
            })?,
        };

        let years_employed = years_since(reference, self.now);
        let new_balance = years_employed + entry.vacation_days;

        Ok(OutboundEmail {
            to: address.email.clone(),
            subject: "Good news!".to_string(),
            body: format!(
                "Dear {}\nbased on your {} years of employment, you have been granted {} days of vacation, bringing your total to {}",
                profile.name, years_employed, years_employed, new_balance
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_profile(id: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> EmployeeProfile {
        EmployeeProfile {
            id: id.to_string(),
            name: format!("{id} name"),
            start_date: start,
            end_date: end,
        }
    }

    fn make_address(emp_id: &str) -> AddressRecord {
        AddressRecord {
            emp_id: emp_id.to_string(),
            first: "Ada".to_string(),
            last: "Lovelace".to_string(),
            email: format!("{emp_id}@example.com"),
        }
    }

    #[test]
    fn test_render_grants_one_day_per_year_from_start_date() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        // Exactly 4 * 365 days later.
        let now = start + chrono::Duration::days(4 * 365);

        let renderer = VacationRenderer::new(
            vec![make_address("1")],
            vec![make_profile("1", start, None)],
            ReferenceDate::Start,
        )
        .unwrap()
        .with_now(now);

        let email = renderer
            .render(&PayrollEntry {
                emp_id: "1".to_string(),
                vacation_days: 3.0,
            })
            .unwrap();

        assert_eq!(email.to, "1@example.com");
        assert_eq!(email.subject, "Good news!");
        assert!(email.body.starts_with("Dear 1 name\n"));
        assert!(email.body.contains("your 4 years of employment"));
        assert!(email.body.contains("granted 4 days of vacation"));
        assert!(email.body.contains("bringing your total to 7"));
    }

    #[test]
    fn test_render_uses_end_date_when_selected() {
        let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = end + chrono::Duration::days(365);

        let renderer = VacationRenderer::new(
            vec![make_address("1")],
            vec![make_profile("1", start, Some(end))],
            ReferenceDate::End,
        )
        .unwrap()
        .with_now(now);

        let email = renderer
            .render(&PayrollEntry {
                emp_id: "1".to_string(),
                vacation_days: 0.0,
            })
            .unwrap();

        assert!(email.body.contains("your 1 years of employment"));
    }

    #[test]
    fn test_render_fails_per_item_on_missing_address() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let renderer = VacationRenderer::new(
            vec![make_address("1")],
            vec![
                make_profile("1", start, None),
                make_profile("2", start, None),
            ],
            ReferenceDate::Start,
        )
        .unwrap();

        let err = renderer
            .render(&PayrollEntry {
                emp_id: "2".to_string(),
                vacation_days: 0.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::LookupMiss { record: "address", .. }
        ));

        // Sibling item with complete records still renders.
        assert!(
            renderer
                .render(&PayrollEntry {
                    emp_id: "1".to_string(),
                    vacation_days: 0.0,
                })
                .is_ok()
        );
    }

    #[test]
    fn test_render_fails_when_end_date_required_but_absent() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let renderer = VacationRenderer::new(
            vec![make_address("1")],
            vec![make_profile("1", start, None)],
            ReferenceDate::End,
        )
        .unwrap();

        let err = renderer
            .render(&PayrollEntry {
                emp_id: "1".to_string(),
                vacation_days: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, DispatchError::Render { .. }));
        assert!(err.is_item_scoped());
    }

    #[test]
    fn test_duplicate_profile_identifier_rejected_at_build() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let err = VacationRenderer::new(
            vec![make_address("1")],
            vec![
                make_profile("1", start, None),
                make_profile("1", start, None),
            ],
            ReferenceDate::Start,
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
    }
}
