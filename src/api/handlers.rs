//! HTTP request handlers for the HR engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AttendanceStatus, PayrollKey};
use crate::services::{EmployeeUpdate, LeaveApplication, NewEmployee, ProfileUpdate};
use crate::store::{AttendanceQuery, PayrollQuery};

use super::request::{
    ActiveRequest, CurrentActor, DayQuery, DecisionRequest, EmployeeFilter, MonthQuery,
    PayrollRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type HandlerResult = Result<Response, Response>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/employees", post(register_employee).get(list_employees))
        .route("/employees/:id", get(get_employee).put(update_employee))
        .route("/employees/:id/profile", put(update_profile))
        .route("/employees/:id/active", put(set_active))
        .route("/attendance", get(list_attendance))
        .route("/attendance/check-in", post(check_in))
        .route("/attendance/check-out", post(check_out))
        .route("/attendance/calendar", get(attendance_calendar))
        .route("/attendance/status", get(attendance_status))
        .route("/leaves", post(submit_leave).get(list_leaves))
        .route("/leaves/:id", get(get_leave))
        .route("/leaves/:id/decision", post(decide_leave))
        .route("/leaves/:id/cascade", post(resume_cascade))
        .route("/payroll", get(list_payroll))
        .route(
            "/payroll/:employee_id/:year/:month",
            get(payroll_entry).put(upsert_payroll),
        )
        .route("/payroll/:employee_id/:year/:month/paid", post(mark_paid))
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/summary", get(employee_summary))
        .route("/reports/attendance", get(attendance_report))
        .route("/reports/leaves", get(leave_report))
        .route("/reports/payroll", get(payroll_report))
        .route("/exports/attendance", get(export_attendance))
        .route("/exports/leaves", get(export_leaves))
        .route("/exports/payroll", get(export_payroll))
        .with_state(state)
}

/// Unwraps a JSON body or turns the rejection into a 400 response.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error).into_response())
}

/// Unwraps a query string or turns the rejection into a 400 response.
fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    query.map(|Query(params)| params).map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid query string"
        );
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
            .into_response()
    })
}

/// Serializes a service result, logging the outcome.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    status: StatusCode,
    result: EngineResult<T>,
) -> HandlerResult {
    match result {
        Ok(body) => {
            info!(correlation_id = %correlation_id, operation, "Request completed");
            Ok((status, Json(body)).into_response())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            Err(ApiErrorResponse::from(err).into_response())
        }
    }
}

/// Returns a CSV export as a file download.
fn respond_csv(
    correlation_id: Uuid,
    filename: &str,
    result: EngineResult<String>,
) -> HandlerResult {
    match result {
        Ok(csv) => {
            info!(correlation_id = %correlation_id, filename, "Export generated");
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                csv,
            )
                .into_response())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                filename,
                error = %err,
                "Export failed"
            );
            Err(ApiErrorResponse::from(err).into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

async fn register_employee(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, actor_id = %actor.id, "Registering employee");
    let body = json_body(payload, correlation_id)?;

    let result = state.employees().register(&actor, body).await;
    respond(correlation_id, "register_employee", StatusCode::CREATED, result)
}

async fn list_employees(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let result = state.employees().list(&actor).await;
    respond(correlation_id, "list_employees", StatusCode::OK, result)
}

async fn get_employee(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let result = state.employees().get(&actor, id).await;
    respond(correlation_id, "get_employee", StatusCode::OK, result)
}

async fn update_employee(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %id, "Updating employee");
    let body = json_body(payload, correlation_id)?;

    let result = state.employees().update(&actor, id, body).await;
    respond(correlation_id, "update_employee", StatusCode::OK, result)
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let body = json_body(payload, correlation_id)?;

    let result = state.employees().update_profile(&actor, id, body).await;
    respond(correlation_id, "update_profile", StatusCode::OK, result)
}

async fn set_active(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<ActiveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let body = json_body(payload, correlation_id)?;

    let result = state.employees().set_active(&actor, id, body.is_active).await;
    respond(correlation_id, "set_active", StatusCode::OK, result)
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

async fn check_in(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %actor.id, "Processing check-in");

    let result = state.attendance().check_in(&actor, actor.id).await;
    respond(correlation_id, "check_in", StatusCode::OK, result)
}

async fn check_out(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %actor.id, "Processing check-out");

    let result = state.attendance().check_out(&actor, actor.id).await;
    respond(correlation_id, "check_out", StatusCode::OK, result)
}

async fn list_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.attendance().list(&actor, query).await;
    respond(correlation_id, "list_attendance", StatusCode::OK, result)
}

async fn attendance_calendar(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let employee_id = query.employee_id.unwrap_or(actor.id);

    let result = state
        .attendance()
        .month_calendar(&actor, employee_id, query.year, query.month)
        .await;
    respond(correlation_id, "attendance_calendar", StatusCode::OK, result)
}

#[derive(Serialize)]
struct DayStatus {
    employee_id: Uuid,
    date: NaiveDate,
    status: Option<AttendanceStatus>,
}

async fn attendance_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let employee_id = query.employee_id.unwrap_or(actor.id);

    let result = state
        .attendance()
        .status_on(&actor, employee_id, query.date)
        .await
        .map(|status| DayStatus {
            employee_id,
            date: query.date,
            status,
        });
    respond(correlation_id, "attendance_status", StatusCode::OK, result)
}

// ---------------------------------------------------------------------------
// Leave
// ---------------------------------------------------------------------------

async fn submit_leave(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %actor.id, "Submitting leave request");
    let body = json_body(payload, correlation_id)?;

    let result = state.leave().submit(&actor, body).await;
    respond(correlation_id, "submit_leave", StatusCode::CREATED, result)
}

async fn list_leaves(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<EmployeeFilter>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.leave().list(&actor, query.employee_id).await;
    respond(correlation_id, "list_leaves", StatusCode::OK, result)
}

async fn get_leave(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().get(&actor, id).await;
    respond(correlation_id, "get_leave", StatusCode::OK, result)
}

async fn decide_leave(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id = %id, "Deciding leave request");
    let body = json_body(payload, correlation_id)?;

    let result = state
        .leave()
        .decide(&actor, id, body.outcome, body.admin_comment)
        .await;
    if let Ok(decision) = &result {
        if let Some(cascade) = decision.cascade.as_ref().filter(|c| !c.is_complete()) {
            warn!(
                correlation_id = %correlation_id,
                request_id = %id,
                failed = cascade.failed.len(),
                "Leave approved with incomplete attendance cascade"
            );
        }
    }
    respond(correlation_id, "decide_leave", StatusCode::OK, result)
}

async fn resume_cascade(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id = %id, "Resuming leave cascade");

    let result = state.leave().resume_cascade(&actor, id).await;
    respond(correlation_id, "resume_cascade", StatusCode::OK, result)
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

async fn list_payroll(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<PayrollQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.payroll().list(&actor, query).await;
    respond(correlation_id, "list_payroll", StatusCode::OK, result)
}

async fn payroll_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((employee_id, year, month)): Path<(Uuid, i32, u32)>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let key = PayrollKey {
        employee_id,
        month,
        year,
    };

    let result = state.payroll().entry(&actor, key).await;
    respond(correlation_id, "payroll_entry", StatusCode::OK, result)
}

async fn upsert_payroll(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((employee_id, year, month)): Path<(Uuid, i32, u32)>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Saving payroll"
    );
    let body = json_body(payload, correlation_id)?;
    let key = PayrollKey {
        employee_id,
        month,
        year,
    };

    let result = state.payroll().upsert(&actor, key, body.into()).await;
    respond(correlation_id, "upsert_payroll", StatusCode::OK, result)
}

async fn mark_paid(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((employee_id, year, month)): Path<(Uuid, i32, u32)>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Marking payroll as paid"
    );
    let key = PayrollKey {
        employee_id,
        month,
        year,
    };

    let result = state.payroll().mark_paid(&actor, key).await;
    respond(correlation_id, "mark_paid", StatusCode::OK, result)
}

// ---------------------------------------------------------------------------
// Reports and exports
// ---------------------------------------------------------------------------

async fn dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let result = state.reports().dashboard(&actor).await;
    respond(correlation_id, "dashboard", StatusCode::OK, result)
}

async fn employee_summary(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let employee_id = query.employee_id.unwrap_or(actor.id);

    let result = state
        .reports()
        .employee_summary(&actor, employee_id, query.year, query.month)
        .await;
    respond(correlation_id, "employee_summary", StatusCode::OK, result)
}

async fn attendance_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().attendance(&actor, query).await;
    respond(correlation_id, "attendance_report", StatusCode::OK, result)
}

async fn leave_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<EmployeeFilter>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().leave(&actor, query.employee_id).await;
    respond(correlation_id, "leave_report", StatusCode::OK, result)
}

async fn payroll_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<PayrollQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().payroll(&actor, query).await;
    respond(correlation_id, "payroll_report", StatusCode::OK, result)
}

async fn export_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().attendance_csv(&actor, query).await;
    respond_csv(correlation_id, "attendance_report.csv", result)
}

async fn export_leaves(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<EmployeeFilter>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().leave_csv(&actor, query.employee_id).await;
    respond_csv(correlation_id, "leaves_report.csv", result)
}

async fn export_payroll(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<PayrollQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let result = state.reports().payroll_csv(&actor, query).await;
    respond_csv(correlation_id, "salary_report.csv", result)
}
