//! Router-level tests for the request endpoints.
//!
//! The first group runs against a pool that never connects: everything it
//! checks is decided before the first query. The lifecycle tests start a
//! throwaway Postgres container and are skipped when no container runtime is
//! reachable.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::{handlers::pagination::PaginationConfig, router};
use crate::test_support::{ensure_container_runtime, TestDb};
use crate::token::{RoleAssignment, TokenCodec};

const KINDS: [&str; 4] = ["advance-salaries", "exit-permissions", "leaves", "loans"];

struct Harness {
    app: Router,
    codec: Arc<TokenCodec>,
}

impl Harness {
    fn with_pool(pool: PgPool) -> Result<Self> {
        let codec = Arc::new(TokenCodec::new(
            SecretString::from("requests-test-secret".to_string()),
            Duration::from_secs(600),
        )?);
        let app = router(pool, codec.clone(), PaginationConfig::default());
        Ok(Self { app, codec })
    }

    fn offline() -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://hrdesk@127.0.0.1:1/hrdesk")?;
        Self::with_pool(pool)
    }

    fn token(&self, user_id: Uuid, company_id: Uuid, roles: &[RoleAssignment]) -> Result<String> {
        Ok(self.codec.issue(user_id, company_id, roles)?)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response is not JSON")?
        };
        Ok((status, value))
    }
}

fn assert_rejected(status: StatusCode, body: &Value, expected: StatusCode, key: &str) {
    assert_eq!(status, expected, "body: {body}");
    assert_eq!(body["responseKey"], key);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn every_route_requires_a_credential() -> Result<()> {
    let harness = Harness::offline()?;
    let id = Uuid::new_v4();
    for kind in KINDS {
        let routes = [
            (Method::POST, format!("/v1/{kind}")),
            (Method::GET, format!("/v1/{kind}/{id}")),
            (Method::DELETE, format!("/v1/{kind}/{id}")),
            (Method::PATCH, format!("/v1/{kind}/{id}/status")),
            (Method::GET, format!("/v1/companies/{id}/{kind}")),
            (Method::GET, format!("/v1/users/{id}/{kind}")),
        ];
        for (method, uri) in routes {
            let (status, body) = harness.send(method, &uri, None, None).await?;
            assert_rejected(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
        }
    }
    Ok(())
}

#[tokio::test]
async fn expired_credential_is_rejected() -> Result<()> {
    let harness = Harness::offline()?;
    let expired = crate::token::issue_at(
        Uuid::new_v4(),
        Uuid::new_v4(),
        &[],
        Duration::from_secs(60),
        b"requests-test-secret",
        1_000,
    )?;
    let (status, body) = harness
        .send(Method::GET, "/v1/session", Some(&expired), None)
        .await?;
    assert_rejected(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn non_uuid_ids_are_invalid() -> Result<()> {
    let harness = Harness::offline()?;
    let token = harness.token(Uuid::new_v4(), Uuid::new_v4(), &[])?;
    for kind in KINDS {
        let (status, body) = harness
            .send(Method::GET, &format!("/v1/{kind}/42"), Some(&token), None)
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

        let (status, body) = harness
            .send(
                Method::GET,
                &format!("/v1/companies/acme/{kind}"),
                Some(&token),
                None,
            )
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

        let (status, body) = harness
            .send(
                Method::PATCH,
                &format!("/v1/{kind}/42/status"),
                Some(&token),
                Some(json!({"status": "approved"})),
            )
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn listing_another_tenant_or_user_is_denied() -> Result<()> {
    let harness = Harness::offline()?;
    let company_id = Uuid::new_v4();
    let role = RoleAssignment {
        id: Uuid::new_v4(),
        name: "manager".to_string(),
        company_id,
    };
    let token = harness.token(Uuid::new_v4(), company_id, &[role])?;
    for kind in KINDS {
        let (status, body) = harness
            .send(
                Method::GET,
                &format!("/v1/companies/{}/{kind}", Uuid::new_v4()),
                Some(&token),
                None,
            )
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

        let (status, body) = harness
            .send(
                Method::GET,
                &format!("/v1/users/{}/{kind}", Uuid::new_v4()),
                Some(&token),
                None,
            )
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn undecodable_list_query_still_answers_with_envelope() -> Result<()> {
    let harness = Harness::offline()?;
    let token = harness.token(Uuid::new_v4(), Uuid::new_v4(), &[])?;
    for kind in KINDS {
        let (status, body) = harness
            .send(
                Method::GET,
                &format!("/v1/companies/{}/{kind}?page=1&page=2", Uuid::new_v4()),
                Some(&token),
                None,
            )
            .await?;
        assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected_before_storage() -> Result<()> {
    let harness = Harness::offline()?;
    let token = harness.token(Uuid::new_v4(), Uuid::new_v4(), &[])?;
    let cases = [
        ("advance-salaries", json!({"amount": 0, "reason": "rent"})),
        ("advance-salaries", json!({"amount": 100, "reason": "  "})),
        ("advance-salaries", json!({"reason": "rent"})),
        (
            "exit-permissions",
            json!({"date": "2024-02-30", "from_time": "09:00", "to_time": "10:00", "reason": "bank"}),
        ),
        (
            "exit-permissions",
            json!({"date": "2024-03-01", "from_time": "11:00", "to_time": "10:00", "reason": "bank"}),
        ),
        (
            "exit-permissions",
            json!({"date": "2024-03-01", "from_time": "10:00", "to_time": "10:00", "reason": "bank"}),
        ),
        (
            "leaves",
            json!({"leave_type": "annual", "start_date": "2024-05-10", "end_date": "2024-05-01", "reason": "trip"}),
        ),
        (
            "leaves",
            json!({"leave_type": "", "start_date": "2024-05-01", "end_date": "2024-05-10", "reason": "trip"}),
        ),
        ("loans", json!({"amount": 5000, "installments": 0, "reason": "car"})),
        ("loans", json!({"amount": 5000, "installments": 121, "reason": "car"})),
        ("loans", json!({"amount": -1, "installments": 12, "reason": "car"})),
    ];
    for (kind, body) in cases {
        let (status, response) = harness
            .send(Method::POST, &format!("/v1/{kind}"), Some(&token), Some(body.clone()))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{kind} {body}");
        assert_eq!(response["responseKey"], "INVALID_REQUEST");
    }

    // Not JSON at all.
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/v1/loans")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("amount=5"))?;
    let response = harness.app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn pending_and_unknown_are_not_review_outcomes() -> Result<()> {
    let harness = Harness::offline()?;
    let token = harness.token(Uuid::new_v4(), Uuid::new_v4(), &[])?;
    let id = Uuid::new_v4();
    for status in ["pending", "done"] {
        let (code, body) = harness
            .send(
                Method::PATCH,
                &format!("/v1/leaves/{id}/status"),
                Some(&token),
                Some(json!({ "status": status })),
            )
            .await?;
        assert_rejected(code, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    }
    Ok(())
}

// Lifecycle tests against a real database.

struct Tenant {
    company_id: Uuid,
    employee: Uuid,
    coworker: Uuid,
    manager: Uuid,
    manager_role: RoleAssignment,
}

async fn test_db() -> Result<Option<TestDb>> {
    if let Err(err) = ensure_container_runtime() {
        eprintln!("Skipping database test: {err}");
        return Ok(None);
    }
    TestDb::new().await.map(Some)
}

async fn seed_tenant(pool: &PgPool) -> Result<Tenant> {
    let company_id: Uuid = sqlx::query_scalar("INSERT INTO companies (name) VALUES ($1) RETURNING id")
        .bind(format!("company-{}", Uuid::new_v4()))
        .fetch_one(pool)
        .await?;

    let mut users = Vec::new();
    for name in ["employee", "coworker", "manager"] {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (company_id, full_name, email) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(company_id)
        .bind(name)
        .bind(format!("{name}-{}@hrdesk.test", Uuid::new_v4()))
        .fetch_one(pool)
        .await?;
        users.push(id);
    }

    let role_id: Uuid =
        sqlx::query_scalar("INSERT INTO roles (company_id, name) VALUES ($1, 'manager') RETURNING id")
            .bind(company_id)
            .fetch_one(pool)
            .await?;
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(users[2])
        .bind(role_id)
        .execute(pool)
        .await?;

    Ok(Tenant {
        company_id,
        employee: users[0],
        coworker: users[1],
        manager: users[2],
        manager_role: RoleAssignment {
            id: role_id,
            name: "manager".to_string(),
            company_id,
        },
    })
}

#[tokio::test]
async fn leave_lifecycle() -> Result<()> {
    let Some(db) = test_db().await? else {
        return Ok(());
    };
    let pool = db.pool.clone();
    let tenant = seed_tenant(&pool).await?;
    let harness = Harness::with_pool(pool)?;
    let employee = harness.token(tenant.employee, tenant.company_id, &[])?;
    let coworker = harness.token(tenant.coworker, tenant.company_id, &[])?;
    let manager = harness.token(
        tenant.manager,
        tenant.company_id,
        std::slice::from_ref(&tenant.manager_role),
    )?;

    let (status, created) = harness
        .send(
            Method::POST,
            "/v1/leaves",
            Some(&employee),
            Some(json!({
                "leave_type": "annual",
                "start_date": "2024-07-01",
                "end_date": "2024-07-05",
                "reason": " summer trip "
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["responseKey"], "CREATED");
    let leave = &created["data"];
    assert_eq!(leave["status"], "pending");
    assert_eq!(leave["reason"], "summer trip");
    assert_eq!(leave["start_date"], "2024-07-01");
    assert_eq!(leave["user_id"], tenant.employee.to_string());
    assert!(leave["reviewed_by"].is_null());
    let id = leave["id"].as_str().context("leave id")?.to_string();

    let (status, _) = harness
        .send(Method::GET, &format!("/v1/leaves/{id}"), Some(&employee), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = harness
        .send(Method::GET, &format!("/v1/leaves/{id}"), Some(&manager), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = harness
        .send(Method::GET, &format!("/v1/leaves/{id}"), Some(&coworker), None)
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

    let (status, page) = harness
        .send(
            Method::GET,
            &format!("/v1/companies/{}/leaves?limit=5", tenant.company_id),
            Some(&employee),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["limit"], 5);
    assert_eq!(page["data"]["items"][0]["id"], id.as_str());

    let (status, page) = harness
        .send(
            Method::GET,
            &format!(
                "/v1/companies/{}/leaves?page=3&page=4&limit=5",
                tenant.company_id
            ),
            Some(&employee),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["data"]["page"], 1);
    assert_eq!(page["data"]["limit"], 10);
    assert_eq!(page["data"]["total"], 1);

    let (status, page) = harness
        .send(
            Method::GET,
            &format!("/v1/users/{}/leaves?status=approved&limit=7", tenant.employee),
            Some(&employee),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 0);
    assert_eq!(page["data"]["limit"], 10);

    let review = json!({"status": "approved"});
    let (status, body) = harness
        .send(
            Method::PATCH,
            &format!("/v1/leaves/{id}/status"),
            Some(&employee),
            Some(review.clone()),
        )
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

    let (status, reviewed) = harness
        .send(
            Method::PATCH,
            &format!("/v1/leaves/{id}/status"),
            Some(&manager),
            Some(review.clone()),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{reviewed}");
    assert_eq!(reviewed["data"]["status"], "approved");
    assert_eq!(reviewed["data"]["reviewed_by"], tenant.manager.to_string());
    assert!(reviewed["data"]["reviewed_at"].is_string());

    let (status, body) = harness
        .send(
            Method::PATCH,
            &format!("/v1/leaves/{id}/status"),
            Some(&manager),
            Some(json!({"status": "rejected"})),
        )
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

    let (status, body) = harness
        .send(Method::DELETE, &format!("/v1/leaves/{id}"), Some(&employee), None)
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    Ok(())
}

#[tokio::test]
async fn pending_loan_can_be_withdrawn_by_its_owner_only() -> Result<()> {
    let Some(db) = test_db().await? else {
        return Ok(());
    };
    let pool = db.pool.clone();
    let tenant = seed_tenant(&pool).await?;
    let harness = Harness::with_pool(pool)?;
    let employee = harness.token(tenant.employee, tenant.company_id, &[])?;
    let manager = harness.token(
        tenant.manager,
        tenant.company_id,
        std::slice::from_ref(&tenant.manager_role),
    )?;

    let (status, created) = harness
        .send(
            Method::POST,
            "/v1/loans",
            Some(&employee),
            Some(json!({"amount": 250_000, "installments": 12, "reason": "car"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["installments"], 12);
    let id = created["data"]["id"].as_str().context("loan id")?.to_string();

    let (status, body) = harness
        .send(Method::DELETE, &format!("/v1/loans/{id}"), Some(&manager), None)
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");

    let (status, body) = harness
        .send(Method::DELETE, &format!("/v1/loans/{id}"), Some(&employee), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responseKey"], "SUCCESS");
    assert!(body["data"].is_null());

    let (status, body) = harness
        .send(Method::GET, &format!("/v1/loans/{id}"), Some(&employee), None)
        .await?;
    assert_rejected(status, &body, StatusCode::NOT_FOUND, "DATA_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn other_tenants_see_not_found() -> Result<()> {
    let Some(db) = test_db().await? else {
        return Ok(());
    };
    let pool = db.pool.clone();
    let home = seed_tenant(&pool).await?;
    let away = seed_tenant(&pool).await?;
    let harness = Harness::with_pool(pool)?;
    let employee = harness.token(home.employee, home.company_id, &[])?;
    let outsider = harness.token(
        away.manager,
        away.company_id,
        std::slice::from_ref(&away.manager_role),
    )?;

    let (status, created) = harness
        .send(
            Method::POST,
            "/v1/exit-permissions",
            Some(&employee),
            Some(json!({
                "date": "2024-03-04",
                "from_time": "09:30",
                "to_time": "11:00",
                "reason": "doctor"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["from_time"], "09:30");
    let id = created["data"]["id"].as_str().context("exit id")?.to_string();

    for (method, uri, body) in [
        (Method::GET, format!("/v1/exit-permissions/{id}"), None),
        (
            Method::PATCH,
            format!("/v1/exit-permissions/{id}/status"),
            Some(json!({"status": "approved"})),
        ),
        (Method::DELETE, format!("/v1/exit-permissions/{id}"), None),
    ] {
        let (status, response) = harness.send(method, &uri, Some(&outsider), body).await?;
        assert_rejected(status, &response, StatusCode::NOT_FOUND, "DATA_NOT_FOUND");
    }

    let (status, _) = harness
        .send(
            Method::GET,
            &format!("/v1/exit-permissions/{}", Uuid::new_v4()),
            Some(&employee),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn advance_salary_lifecycle() -> Result<()> {
    let Some(db) = test_db().await? else {
        return Ok(());
    };
    let pool = db.pool.clone();
    let tenant = seed_tenant(&pool).await?;
    let harness = Harness::with_pool(pool)?;
    let employee = harness.token(tenant.employee, tenant.company_id, &[])?;
    let manager = harness.token(
        tenant.manager,
        tenant.company_id,
        std::slice::from_ref(&tenant.manager_role),
    )?;

    let mut ids = Vec::new();
    for amount in [50_000, 75_000] {
        let (status, created) = harness
            .send(
                Method::POST,
                "/v1/advance-salaries",
                Some(&employee),
                Some(json!({"amount": amount, "reason": "school fees"})),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["data"]["amount"], amount);
        assert_eq!(created["data"]["status"], "pending");
        assert_eq!(created["data"]["company_id"], tenant.company_id.to_string());
        ids.push(created["data"]["id"].as_str().context("advance id")?.to_string());
    }

    let (status, reviewed) = harness
        .send(
            Method::PATCH,
            &format!("/v1/advance-salaries/{}/status", ids[0]),
            Some(&manager),
            Some(json!({"status": "rejected"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{reviewed}");
    assert_eq!(reviewed["data"]["status"], "rejected");

    let (status, page) = harness
        .send(
            Method::GET,
            &format!("/v1/users/{}/advance-salaries?status=pending", tenant.employee),
            Some(&employee),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["items"][0]["id"], ids[1].as_str());

    let (status, page) = harness
        .send(
            Method::GET,
            &format!("/v1/companies/{}/advance-salaries?limit=5", tenant.company_id),
            Some(&manager),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["data"]["total"], 2);
    // Newest first.
    assert_eq!(page["data"]["items"][0]["id"], ids[1].as_str());

    // A user whose row is gone no longer belongs to the company.
    let ghost = harness.token(Uuid::new_v4(), tenant.company_id, &[])?;
    let (status, body) = harness
        .send(
            Method::POST,
            "/v1/advance-salaries",
            Some(&ghost),
            Some(json!({"amount": 10, "reason": "rent"})),
        )
        .await?;
    assert_rejected(status, &body, StatusCode::BAD_REQUEST, "INVALID_REQUEST");
    Ok(())
}
