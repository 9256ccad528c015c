use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use punchclock::handlers::{leave_requests, manager};
use serde_json::json;
use serial_test::serial;

mod common;

fn setup_test_app() -> (
    web::Data<punchclock::services::LeaveService>,
    web::Data<punchclock::services::AuditLogger>,
    web::Data<punchclock::Config>,
) {
    let ctx = common::TestContext::new().unwrap();

    (
        web::Data::new(ctx.leave_service),
        web::Data::new(ctx.audit_logger),
        web::Data::new(ctx.config),
    )
}

// Macro to generate unauthorized access tests
macro_rules! test_unauthorized {
    ($test_name:ident, $method:ident, $uri:expr) => {
        #[actix_web::test]
        #[serial]
        async fn $test_name() {
            let (service_data, audit_data, config_data) = setup_test_app();

            let app = test::init_service(
                App::new()
                    .app_data(service_data)
                    .app_data(audit_data)
                    .app_data(config_data)
                    .service(
                        web::scope("/api/v1")
                            .service(
                                web::scope("/leave-requests")
                                    .route("", web::post().to(leave_requests::create))
                                    .route("", web::get().to(leave_requests::list_own)),
                            )
                            .service(
                                web::scope("/manager")
                                    .route(
                                        "/leave-requests",
                                        web::get().to(manager::pending_leave_requests),
                                    )
                                    .route(
                                        "/leave-requests/{id}/approve",
                                        web::post().to(manager::approve_leave_request),
                                    )
                                    .route(
                                        "/leave-requests/{id}/reject",
                                        web::post().to(manager::reject_leave_request),
                                    ),
                            ),
                    ),
            )
            .await;

            let req = test::TestRequest::$method().uri($uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    };
    ($test_name:ident, $method:ident, $uri:expr, $json:expr) => {
        #[actix_web::test]
        #[serial]
        async fn $test_name() {
            let (service_data, audit_data, config_data) = setup_test_app();

            let app = test::init_service(
                App::new()
                    .app_data(service_data)
                    .app_data(audit_data)
                    .app_data(config_data)
                    .service(
                        web::scope("/api/v1")
                            .service(
                                web::scope("/leave-requests")
                                    .route("", web::post().to(leave_requests::create))
                                    .route("", web::get().to(leave_requests::list_own)),
                            )
                            .service(
                                web::scope("/manager")
                                    .route(
                                        "/leave-requests",
                                        web::get().to(manager::pending_leave_requests),
                                    )
                                    .route(
                                        "/leave-requests/{id}/approve",
                                        web::post().to(manager::approve_leave_request),
                                    )
                                    .route(
                                        "/leave-requests/{id}/reject",
                                        web::post().to(manager::reject_leave_request),
                                    ),
                            ),
                    ),
            )
            .await;

            let req = test::TestRequest::$method()
                .uri($uri)
                .set_json(&$json)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    };
}

test_unauthorized!(
    test_create_unauthorized,
    post,
    "/api/v1/leave-requests",
    json!({
        "leaveType": "vacation",
        "startDate": "2026-09-01",
        "endDate": "2026-09-05"
    })
);
test_unauthorized!(test_list_own_unauthorized, get, "/api/v1/leave-requests");
test_unauthorized!(
    test_pending_unauthorized,
    get,
    "/api/v1/manager/leave-requests"
);
test_unauthorized!(
    test_approve_unauthorized,
    post,
    "/api/v1/manager/leave-requests/0a0a0a0a-0a0a-0a0a-0a0a-0a0a0a0a0a0a/approve"
);
test_unauthorized!(
    test_reject_unauthorized,
    post,
    "/api/v1/manager/leave-requests/0a0a0a0a-0a0a-0a0a-0a0a-0a0a0a0a0a0a/reject",
    json!({ "managerComments": "no" })
);
