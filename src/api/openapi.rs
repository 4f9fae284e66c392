#![allow(clippy::needless_for_each)]

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::handlers::{
    auth::session,
    envelope::ResponseKey,
    health,
    requests::{advance_salaries, exit_permissions, leaves, loans, types},
};
use crate::token::RoleAssignment;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::current_session,
        advance_salaries::create_advance_salary,
        advance_salaries::get_advance_salary,
        advance_salaries::list_company_advance_salaries,
        advance_salaries::list_user_advance_salaries,
        advance_salaries::review_advance_salary,
        advance_salaries::delete_advance_salary,
        exit_permissions::create_exit_permission,
        exit_permissions::get_exit_permission,
        exit_permissions::list_company_exit_permissions,
        exit_permissions::list_user_exit_permissions,
        exit_permissions::review_exit_permission,
        exit_permissions::delete_exit_permission,
        leaves::create_leave,
        leaves::get_leave,
        leaves::list_company_leaves,
        leaves::list_user_leaves,
        leaves::review_leave,
        leaves::delete_leave,
        loans::create_loan,
        loans::get_loan,
        loans::list_company_loans,
        loans::list_user_loans,
        loans::review_loan,
        loans::delete_loan,
    ),
    components(schemas(
        health::Health,
        session::Session,
        RoleAssignment,
        ResponseKey,
        types::RequestStatus,
        types::RequestRecord,
        types::ReviewRequest,
        types::CreateAdvanceSalaryRequest,
        types::AdvanceSalaryResponse,
        types::CreateExitPermissionRequest,
        types::ExitPermissionResponse,
        types::CreateLeaveRequest,
        types::LeaveResponse,
        types::CreateLoanRequest,
        types::LoanResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "hrdesk", description = "HR operations API"),
        (name = "health", description = "Service health"),
        (name = "session", description = "Credential introspection"),
        (name = "advance-salaries", description = "Advance salary requests"),
        (name = "exit-permissions", description = "Exit permission requests"),
        (name = "leaves", description = "Leave requests"),
        (name = "loans", description = "Loan requests"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
