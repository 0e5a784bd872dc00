//! Closed role and status domains, plus the guide-request transition rules.
//!
//! The request lifecycle is one state machine even though it is driven from
//! several endpoints: admins approve/reject/assign, guides accept/reject and
//! complete, visitors cancel. [`RequestStatus::transition_allowed`] is the
//! single source of truth for which moves are legal; preconditions that need
//! data (confirmed payment, guide ownership) are checked by the operations
//! in [`crate::guide_request`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// User role. Stored as lowercase text in the `users.role` column.
///
/// The legacy `site_agent` label is accepted on input and normalized to
/// [`Role::Guide`]; the two names refer to the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Visitor,
    Researcher,
    Admin,
    Guide,
}

impl Role {
    /// Parse a role label, tolerating the legacy `site_agent` spelling.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "visitor" => Some(Role::Visitor),
            "researcher" => Some(Role::Researcher),
            "admin" => Some(Role::Admin),
            "guide" | "site_agent" => Some(Role::Guide),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Visitor => "visitor",
            Role::Researcher => "researcher",
            Role::Admin => "admin",
            Role::Guide => "guide",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a site in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SiteStatus {
    Pending,
    Approved,
    Rejected,
}

impl SiteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteStatus::Pending => "pending",
            SiteStatus::Approved => "approved",
            SiteStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PendingVerification,
    Confirmed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PendingVerification => "pending_verification",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a guide request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Assigned,
    AcceptedByGuide,
    RejectedByGuide,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Assigned => "assigned",
            RequestStatus::AcceptedByGuide => "accepted_by_guide",
            RequestStatus::RejectedByGuide => "rejected_by_guide",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            "assigned" => Some(RequestStatus::Assigned),
            "accepted_by_guide" => Some(RequestStatus::AcceptedByGuide),
            "rejected_by_guide" => Some(RequestStatus::RejectedByGuide),
            "completed" => Some(RequestStatus::Completed),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether `actor` may move a request from `self` to `to`.
    ///
    /// Admins approve from `pending` (and re-approve from `rejected`),
    /// reject from `pending` or `approved`, and assign from `approved`.
    /// Guides act on `approved` or `assigned` requests and complete
    /// accepted ones. Visitors may cancel while still `pending`.
    pub fn transition_allowed(self, to: RequestStatus, actor: Role) -> bool {
        use RequestStatus::*;
        match actor {
            Role::Admin => matches!(
                (self, to),
                (Pending, Approved)
                    | (Rejected, Approved)
                    | (Pending, Rejected)
                    | (Approved, Rejected)
                    | (Approved, Assigned)
            ),
            Role::Guide => matches!(
                (self, to),
                (Approved, AcceptedByGuide)
                    | (Assigned, AcceptedByGuide)
                    | (Approved, RejectedByGuide)
                    | (Assigned, RejectedByGuide)
                    | (AcceptedByGuide, Completed)
            ),
            Role::Visitor => matches!((self, to), (Pending, Cancelled)),
            Role::Researcher => false,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
