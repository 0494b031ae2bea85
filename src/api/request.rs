//! Request types for the HR engine API.
//!
//! This module defines the JSON bodies, query strings and the caller
//! identity extractor. Authentication happens upstream; the gateway passes
//! the authenticated caller in the `x-actor-id` and `x-actor-role` headers.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Actor, LeaveOutcome, PayrollAmounts, Role};

use super::response::ApiErrorResponse;

/// Header carrying the caller's employee id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated caller, read from the identity headers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(ACTOR_ID_HEADER)
            .ok_or_else(|| {
                ApiErrorResponse::unauthenticated(format!("missing {} header", ACTOR_ID_HEADER))
            })?
            .parse::<Uuid>()
            .map_err(|_| {
                ApiErrorResponse::unauthenticated(format!("{} is not a valid id", ACTOR_ID_HEADER))
            })?;
        let role = header(ACTOR_ROLE_HEADER)
            .ok_or_else(|| {
                ApiErrorResponse::unauthenticated(format!("missing {} header", ACTOR_ROLE_HEADER))
            })?
            .parse::<Role>()
            .map_err(|e| ApiErrorResponse::unauthenticated(e.to_string()))?;

        Ok(CurrentActor(Actor { id, role }))
    }
}

/// Body of `POST /leaves/:id/decision`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// `approved` or `rejected`.
    pub outcome: LeaveOutcome,
    /// Optional note for the employee.
    #[serde(default)]
    pub admin_comment: Option<String>,
}

/// Body of `PUT /payroll/:employee_id/:year/:month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Deductions for the month.
    #[serde(default)]
    pub deductions: Decimal,
    /// Bonuses for the month.
    #[serde(default)]
    pub bonuses: Decimal,
}

impl From<PayrollRequest> for PayrollAmounts {
    fn from(req: PayrollRequest) -> Self {
        PayrollAmounts {
            basic_salary: req.basic_salary,
            deductions: req.deductions,
            bonuses: req.bonuses,
        }
    }
}

/// Body of `PUT /employees/:id/active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRequest {
    /// Whether the employee should be active.
    pub is_active: bool,
}

/// Query string selecting an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeFilter {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

/// Query string selecting a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthQuery {
    /// Restrict to one employee; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

/// Query string selecting a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayQuery {
    /// Restrict to one employee; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// The date to look up.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<CurrentActor, ApiErrorResponse> {
        let (mut parts, _) = request.into_parts();
        CurrentActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_actor_headers_are_parsed() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, id.to_string())
            .header(ACTOR_ROLE_HEADER, "Admin")
            .body(())
            .unwrap();

        let CurrentActor(actor) = extract(request).await.unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_missing_or_bad_headers_are_rejected() {
        let missing = Request::builder().body(()).unwrap();
        let err = extract(missing).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);

        let bad_role = Request::builder()
            .header(ACTOR_ID_HEADER, Uuid::new_v4().to_string())
            .header(ACTOR_ROLE_HEADER, "superuser")
            .body(())
            .unwrap();
        assert!(extract(bad_role).await.is_err());
    }

    #[test]
    fn test_payroll_request_defaults() {
        let req: PayrollRequest = serde_json::from_str(r#"{"basic_salary": "50000"}"#).unwrap();
        let amounts: PayrollAmounts = req.into();
        assert_eq!(amounts.basic_salary, Decimal::new(50000, 0));
        assert_eq!(amounts.deductions, Decimal::ZERO);
    }
}
