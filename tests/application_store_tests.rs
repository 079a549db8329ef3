//! Database-backed store tests
//!
//! Run with `TEST_DATABASE_URL` pointing at a scratch database and
//! `cargo test -- --ignored`.

mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::common::sample_request;
    use loanflow_server::application::{
        ApplicationError, LenderResponse, ListApplicationsQuery, LoanApplicationService,
        ReviewStatus, WorkflowError,
    };
    use loanflow_server::auth::{AuthError, AuthService};
    use loanflow_server::config::Environment;
    use loanflow_server::models::{ClientInfo, LoginRequest, RegisterRequest, User, UserRole};
    use loanflow_server::routes::create_router;
    use loanflow_server::state::AppState;

    /// Helper to create a migrated test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/loanflow_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        loanflow_server::db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn auth_service(pool: &PgPool) -> AuthService {
        AuthService::new(
            pool.clone(),
            "store-test-secret".to_string(),
            1,
            Vec::new(),
            false,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "motdepasse".to_string(),
            first_name: "Moussa".to_string(),
            last_name: "Traoré".to_string(),
        }
    }

    async fn new_user(auth: &AuthService) -> User {
        let email = format!("client-{}@loanflow.test", Uuid::new_v4());
        auth.register(&register_request(&email))
            .await
            .expect("register user")
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_register_login_and_sessions() {
        let pool = setup_test_db().await;
        let auth = auth_service(&pool);

        let email = format!("Client-{}@LoanFlow.test", Uuid::new_v4());
        let user = auth.register(&register_request(&email)).await.unwrap();
        assert_eq!(user.email, email.to_lowercase());
        assert_eq!(user.role, UserRole::User);
        assert_ne!(user.password_hash, "motdepasse");

        let duplicate = auth.register(&register_request(&email)).await;
        assert!(matches!(duplicate, Err(AuthError::EmailTaken)));

        let wrong = auth
            .login(&LoginRequest {
                email: email.clone(),
                password: "mauvais".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let logged_in = auth
            .login(&LoginRequest {
                email: email.clone(),
                password: "motdepasse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let session = auth
            .issue_session(&logged_in, ClientInfo::default())
            .await
            .unwrap();
        assert!(auth.verify_session(&session.jti).await.is_ok());

        auth.revoke_session(&session.jti).await.unwrap();
        assert!(matches!(
            auth.verify_session(&session.jti).await,
            Err(AuthError::SessionNotFound)
        ));
        assert!(matches!(
            auth.revoke_session(&session.jti).await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_purge_removes_revoked_sessions() {
        let pool = setup_test_db().await;
        let auth = auth_service(&pool);
        let user = new_user(&auth).await;

        let revoked = auth.issue_session(&user, ClientInfo::default()).await.unwrap();
        let live = auth.issue_session(&user, ClientInfo::default()).await.unwrap();
        auth.revoke_session(&revoked.jti).await.unwrap();

        assert!(auth.purge_expired_sessions().await.unwrap() >= 1);
        auth.purge_stale_sessions().await;

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auth_sessions WHERE jti = $1")
            .bind(&revoked.jti)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(auth.verify_session(&live.jti).await.is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_admin_email_gets_admin_role() {
        let pool = setup_test_db().await;
        let email = format!("chef-{}@loanflow.test", Uuid::new_v4());
        let auth = AuthService::new(
            pool.clone(),
            "store-test-secret".to_string(),
            1,
            vec![email.clone()],
            false,
        );

        let user = auth.register(&register_request(&email)).await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_create_uses_server_side_figures() {
        let pool = setup_test_db().await;
        let user = new_user(&auth_service(&pool)).await;
        let service = LoanApplicationService::new(pool.clone(), 0.05);

        let mut request = sample_request();
        request.processing_fee = Some(1);
        let application = service.create(request, user.id).await.unwrap();

        assert_eq!(application.user_id, user.id);
        assert_eq!(application.current_step, 1);
        assert_eq!(application.status, "step1");
        assert!(application.step1_completed_at.is_some());
        assert!(application.step2_completed_at.is_none());
        assert_eq!(application.monthly_payment, "254");
        assert_eq!(application.total_cost, "1524");
        assert_eq!(application.processing_fee, 157);

        let fetched = service.get(application.id).await.unwrap();
        assert_eq!(fetched.id, application.id);
        assert_eq!(fetched.user_id, user.id);
        assert_eq!(fetched.amount, 1500);
        assert_eq!(fetched.duration, 6);
        assert_eq!(fetched.purpose, "Achat véhicule");
        assert_eq!(fetched.first_name, "Awa");
        assert_eq!(fetched.last_name, "Konaté");
        assert_eq!(fetched.email, "awa.konate@example.com");
        assert_eq!(fetched.phone, "0612345678");
        assert_eq!(fetched.date_of_birth, "1990-05-12");
        assert_eq!(fetched.employment_status, "cdi");
        assert_eq!(fetched.monthly_income, "2000-2500");
        assert_eq!(fetched.monthly_expenses, Some(800));
        assert_eq!(fetched.client_type, "particulier");
        assert_eq!(fetched.country, "France");
        assert_eq!(fetched.processing_fee, 157);
        assert_eq!(fetched.monthly_payment, "254");
        assert_eq!(fetched.total_cost, "1524");
        assert!(fetched.terms_accepted);
        assert!(fetched.credit_check_accepted);
        assert!(!fetched.marketing_accepted);
        assert_eq!(fetched.current_step, 1);
        assert_eq!(fetched.status, "step1");
        assert!(fetched.lender_id.is_none());
        assert!(fetched.account_number.is_none());
        assert_eq!(fetched.created_at, application.created_at);
        assert_eq!(fetched.step1_completed_at, application.step1_completed_at);

        let mine = service.list_by_user(user.id).await.unwrap();
        assert_eq!(mine.len(), 1);

        let all = service
            .list_all(ListApplicationsQuery {
                status: Some("step1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(all.iter().any(|a| a.id == application.id));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_pipeline_persists_through_completion() {
        let pool = setup_test_db().await;
        let user = new_user(&auth_service(&pool)).await;
        let service = LoanApplicationService::new(pool.clone(), 0.05);
        let id = service.create(sample_request(), user.id).await.unwrap().id;

        for step in 2..=4 {
            service.advance_step(id, step).await.unwrap();
        }
        service.assign_lender(id, "BANK003", "Société Générale").await.unwrap();
        service.advance_step(id, 5).await.unwrap();
        service
            .record_lender_response(id, LenderResponse::Approved, Some("OK".to_string()))
            .await
            .unwrap();
        service.advance_step(id, 6).await.unwrap();
        service.set_account_number(id, "FR7630003000001234567890185").await.unwrap();
        let done = service.advance_step(id, 7).await.unwrap();

        assert_eq!(done.current_step, 7);
        assert_eq!(done.status, "completed");
        assert!(done.step7_completed_at.is_some());
        assert_eq!(done.lender_name.as_deref(), Some("Société Générale"));

        let err = service.advance_step(id, 7).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Workflow(WorkflowError::Terminal(_))
        ));
        let err = service
            .update_status(id, ReviewStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Workflow(WorkflowError::Terminal(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_rejected_mutation_leaves_row_untouched() {
        let pool = setup_test_db().await;
        let user = new_user(&auth_service(&pool)).await;
        let service = LoanApplicationService::new(pool.clone(), 0.05);
        let created = service.create(sample_request(), user.id).await.unwrap();

        let err = service.advance_step(created.id, 4).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Workflow(WorkflowError::OutOfOrder { current: 1, target: 4 })
        ));

        let reloaded = service.get(created.id).await.unwrap();
        assert_eq!(reloaded.current_step, 1);
        assert_eq!(reloaded.updated_at, created.updated_at);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_lender_rejection_stays_rejected() {
        let pool = setup_test_db().await;
        let user = new_user(&auth_service(&pool)).await;
        let service = LoanApplicationService::new(pool.clone(), 0.05);
        let id = service.create(sample_request(), user.id).await.unwrap().id;

        for step in 2..=4 {
            service.advance_step(id, step).await.unwrap();
        }
        service.assign_lender(id, "BANK004", "LCL").await.unwrap();
        service.advance_step(id, 5).await.unwrap();
        service
            .record_lender_response(id, LenderResponse::Rejected, None)
            .await
            .unwrap();

        let err = service
            .update_status(id, ReviewStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Workflow(WorkflowError::Terminal(_))
        ));

        let reloaded = service.get(id).await.unwrap();
        assert_eq!(reloaded.status, "rejected");
        assert_eq!(reloaded.lender_response.as_deref(), Some("rejected"));
        assert_eq!(reloaded.current_step, 5);
    }

    // ========================================================================
    // Access control over HTTP
    // ========================================================================

    async fn bearer_for(auth: &AuthService, user: &User) -> String {
        let session = auth
            .issue_session(user, ClientInfo::default())
            .await
            .expect("issue session");
        format!("Bearer {}", session.token)
    }

    async fn get_status(router: &Router, uri: &str, authorization: &str) -> StatusCode {
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("request");
        router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch")
            .status()
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_get_application_owner_or_admin_only() {
        let pool = setup_test_db().await;
        let admin_email = format!("admin-{}@loanflow.test", Uuid::new_v4());
        let auth = Arc::new(AuthService::new(
            pool.clone(),
            "store-test-secret".to_string(),
            1,
            vec![admin_email.clone()],
            false,
        ));
        let applications = Arc::new(LoanApplicationService::new(pool.clone(), 0.05));

        let owner = new_user(&auth).await;
        let stranger = new_user(&auth).await;
        let admin = auth.register(&register_request(&admin_email)).await.unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let id = applications
            .create(sample_request(), owner.id)
            .await
            .unwrap()
            .id;
        let uri = format!("/api/loan-applications/{}", id);

        let router = create_router(AppState::new(
            auth.clone(),
            applications,
            pool,
            Environment::Development,
        ));

        let stranger_token = bearer_for(&auth, &stranger).await;
        assert_eq!(
            get_status(&router, &uri, &stranger_token).await,
            StatusCode::FORBIDDEN
        );

        let owner_token = bearer_for(&auth, &owner).await;
        assert_eq!(get_status(&router, &uri, &owner_token).await, StatusCode::OK);

        let admin_token = bearer_for(&auth, &admin).await;
        assert_eq!(get_status(&router, &uri, &admin_token).await, StatusCode::OK);

        assert_eq!(
            get_status(&router, "/api/loan-applications/2147483647", &owner_token).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_missing_application() {
        let pool = setup_test_db().await;
        let service = LoanApplicationService::new(pool, 0.05);

        assert!(matches!(
            service.get(i32::MAX).await,
            Err(ApplicationError::NotFound(id)) if id == i32::MAX
        ));
        assert!(matches!(
            service.advance_step(i32::MAX, 2).await,
            Err(ApplicationError::NotFound(_))
        ));
        // Range is checked before the lookup
        assert!(matches!(
            service.advance_step(i32::MAX, 9).await,
            Err(ApplicationError::Workflow(WorkflowError::StepOutOfRange(9)))
        ));
    }
}
