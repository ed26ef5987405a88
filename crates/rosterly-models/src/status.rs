//! Status enumerations for enrollments, teacher assignments, and fees.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a (student, subject, academic year) enrollment.
///
/// `Enrolled` is the only state with outgoing transitions; `Completed` and
/// `Dropped` are terminal for the same academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

/// State of a teacher↔subject or teacher↔class assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

/// Fee settlement status, always derived from `total_fees` and `fees_paid`,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FeeStatus {
    Unpaid,
    Partial,
    Paid,
}

impl FeeStatus {
    /// Derive the status label from the stored amounts.
    pub fn derive(total_fees: i64, fees_paid: i64) -> Self {
        if fees_paid <= 0 {
            FeeStatus::Unpaid
        } else if fees_paid < total_fees {
            FeeStatus::Partial
        } else {
            FeeStatus::Paid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_status_boundaries() {
        assert_eq!(FeeStatus::derive(5000, 0), FeeStatus::Unpaid);
        assert_eq!(FeeStatus::derive(5000, 1), FeeStatus::Partial);
        assert_eq!(FeeStatus::derive(5000, 4999), FeeStatus::Partial);
        assert_eq!(FeeStatus::derive(5000, 5000), FeeStatus::Paid);
        assert_eq!(FeeStatus::derive(5000, 6000), FeeStatus::Paid);
    }

    #[test]
    fn zero_total_with_no_payment_is_unpaid() {
        assert_eq!(FeeStatus::derive(0, 0), FeeStatus::Unpaid);
    }
}
