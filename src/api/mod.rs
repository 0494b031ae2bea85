//! HTTP API module for the HR engine.
//!
//! This module exposes employees, attendance, leave, payroll, reports and
//! CSV exports over REST. The caller's identity arrives in request headers
//! set by the authenticating gateway.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, ActiveRequest, CurrentActor, DayQuery, DecisionRequest,
    EmployeeFilter, MonthQuery, PayrollRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
