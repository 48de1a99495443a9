use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of notification work: an employee owed a vacation-balance notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub emp_id: String,
    /// Current vacation-day balance before the grant is applied.
    pub vacation_days: f64,
}

/// Contact record for an employee, keyed by the same `emp_id` as payroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    pub emp_id: String,
    pub first: String,
    pub last: String,
    pub email: String,
}

/// Employment profile with the reference dates the accrual math reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A fully rendered message, ready to enqueue against a batch handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Opaque identifier for one open batch on the backend.
///
/// Issued by `open_batch`, unique among concurrently open batches, and used
/// exactly once: one open, N enqueues, one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchHandle(pub u64);

impl std::fmt::Display for BatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch-{}", self.0)
    }
}

/// Which profile date the accrual math measures employment from.
///
/// Left as a caller choice because existing report code disagrees on the
/// field; both behaviors are supported rather than silently picking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDate {
    Start,
    End,
}

impl std::fmt::Display for ReferenceDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceDate::Start => write!(f, "start"),
            ReferenceDate::End => write!(f, "end"),
        }
    }
}
