//! Request/response types for the employee request APIs.
//!
//! These payloads are shared between handlers and `OpenAPI` generation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Canonical string stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Columns every request type shares.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub status: RequestStatus,
    pub reason: String,
    pub created_at: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number, defaults to 1.
    pub page: Option<String>,
    /// One of 5, 10, 20, 50; anything else uses the configured default.
    pub limit: Option<String>,
    /// `pending`, `approved` or `rejected`; anything else lists all.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub status: RequestStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdvanceSalaryRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdvanceSalaryResponse {
    #[serde(flatten)]
    pub record: RequestRecord,
    pub amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExitPermissionRequest {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub from_time: String,
    /// `HH:MM`, later than `from_time`
    pub to_time: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExitPermissionResponse {
    #[serde(flatten)]
    pub record: RequestRecord,
    pub date: String,
    pub from_time: String,
    pub to_time: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    pub leave_type: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`, not before `start_date`
    pub end_date: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveResponse {
    #[serde(flatten)]
    pub record: RequestRecord,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Number of monthly installments.
    pub installments: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanResponse {
    #[serde(flatten)]
    pub record: RequestRecord,
    pub amount: i64,
    pub installments: i32,
}
