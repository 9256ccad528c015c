use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use punchclock::handlers::time_entries;
use serde_json::json;
use serial_test::serial;

mod common;

fn setup_test_app() -> (
    web::Data<punchclock::services::TimeEntryService>,
    web::Data<punchclock::services::AuditLogger>,
    web::Data<punchclock::Config>,
) {
    let ctx = common::TestContext::new().unwrap();

    (
        web::Data::new(ctx.time_entry_service),
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
                        web::scope("/api/v1").service(
                            web::scope("/time-entries")
                                .route("", web::post().to(time_entries::start))
                                .route("/active/stop", web::patch().to(time_entries::stop))
                                .route("/active", web::get().to(time_entries::get_active))
                                .route("", web::get().to(time_entries::list))
                                .route("/summary/me", web::get().to(time_entries::summary))
                                .route("/{id}", web::delete().to(time_entries::delete)),
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
                        web::scope("/api/v1").service(
                            web::scope("/time-entries")
                                .route("", web::post().to(time_entries::start))
                                .route("/active/stop", web::patch().to(time_entries::stop))
                                .route("/active", web::get().to(time_entries::get_active))
                                .route("", web::get().to(time_entries::list))
                                .route("/summary/me", web::get().to(time_entries::summary))
                                .route("/{id}", web::delete().to(time_entries::delete)),
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
    test_start_unauthorized,
    post,
    "/api/v1/time-entries",
    json!({ "latitude": 52.52, "longitude": 13.405 })
);
test_unauthorized!(
    test_stop_unauthorized,
    patch,
    "/api/v1/time-entries/active/stop",
    json!({})
);
test_unauthorized!(
    test_get_active_unauthorized,
    get,
    "/api/v1/time-entries/active"
);
test_unauthorized!(test_list_unauthorized, get, "/api/v1/time-entries");
test_unauthorized!(
    test_summary_unauthorized,
    get,
    "/api/v1/time-entries/summary/me"
);
test_unauthorized!(
    test_delete_unauthorized,
    delete,
    "/api/v1/time-entries/0a0a0a0a-0a0a-0a0a-0a0a-0a0a0a0a0a0a"
);
