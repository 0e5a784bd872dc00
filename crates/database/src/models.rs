//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::{PaymentStatus, RequestStatus, Role, SiteStatus};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub must_change_password: bool,
    pub created_at: String,
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// A tourism site row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Site {
    pub site_id: i64,
    pub site_name: String,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub location_address: Option<String>,
    pub visit_price: Option<f64>,
    pub estimated_duration: Option<String>,
    pub image_url: Option<String>,
    pub map_url: Option<String>,
    pub nearby_attractions: Option<String>,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    pub is_approved: bool,
    pub status: SiteStatus,
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// A site joined with its primary image, lookup names, and creator name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SiteListing {
    pub site_id: i64,
    pub site_name: String,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub location_address: Option<String>,
    pub visit_price: Option<f64>,
    pub estimated_duration: Option<String>,
    pub image_url: Option<String>,
    pub map_url: Option<String>,
    pub nearby_attractions: Option<String>,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    pub is_approved: bool,
    pub status: SiteStatus,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub region: Option<String>,
    pub category: Option<String>,
    pub researcher_name: Option<String>,
}

/// A visitor's booking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GuideRequest {
    pub request_id: i64,
    pub visitor_id: i64,
    pub site_id: i64,
    pub preferred_date: String,
    pub group_size: i64,
    pub status: RequestStatus,
    pub assigned_guide_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A request joined with visitor name, site name, and site price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RequestListing {
    pub request_id: i64,
    pub visitor_id: i64,
    pub site_id: i64,
    pub preferred_date: String,
    pub group_size: i64,
    pub status: RequestStatus,
    pub assigned_guide_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub visitor_name: Option<String>,
    pub site_name: Option<String>,
    pub amount: Option<f64>,
}

/// One payment attempt for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub request_id: i64,
    pub amount: f64,
    pub currency: String,
    pub method: String,
    pub tx_ref: String,
    pub status: PaymentStatus,
    pub created_at: String,
}

/// A guide's report for a completed visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub report_id: i64,
    pub request_id: i64,
    pub guide_id: i64,
    pub report_text: String,
    pub report_date: String,
    pub created_at: String,
}

/// A report joined with guide name and site name for the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReportListing {
    pub report_id: i64,
    pub request_id: i64,
    pub guide_id: i64,
    pub report_text: String,
    pub report_date: String,
    pub created_at: String,
    pub guide_name: Option<String>,
    pub site_name: Option<String>,
}

/// A user-addressed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_request_id: Option<i64>,
    pub related_payment_id: Option<i64>,
    pub is_read: bool,
    pub created_at: String,
}

/// Fields for creating a notification.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_request_id: Option<i64>,
    pub related_payment_id: Option<i64>,
}

/// A researcher activity log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResearcherActivity {
    pub activity_id: i64,
    pub researcher_id: Option<i64>,
    pub activity_type: String,
    pub description: String,
    pub related_site_id: Option<i64>,
    pub created_at: String,
}
