use crate::{
    deadline::{
        deadline_dto::{CheckTasksRequest, CheckTasksResponse},
        deadline_handlers, DeadlineReminder, NotificationKind, NotificationRecord, TaskFailure,
        TaskPriority, TaskSnapshot, UrgencyLevel,
    },
    middleware::auth_middleware,
    notification::Notification,
    state::AppState,
};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        deadline_handlers::check_tasks,
        deadline_handlers::get_notification_status,
        deadline_handlers::clear_task_history,
        deadline_handlers::end_session,
        deadline_handlers::reminder_stream,
    ),
    components(
        schemas(
            CheckTasksRequest,
            CheckTasksResponse,
            TaskSnapshot,
            TaskPriority,
            TaskFailure,
            DeadlineReminder,
            NotificationKind,
            NotificationRecord,
            UrgencyLevel,
            Notification,
        )
    ),
    tags(
        (name = "deadlines", description = "Deadline reminder endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let deadline_routes = Router::new()
        .route("/", delete(deadline_handlers::end_session))
        .route("/check", post(deadline_handlers::check_tasks))
        .route("/stream", get(deadline_handlers::reminder_stream))
        .route("/:task_id", delete(deadline_handlers::clear_task_history))
        .route(
            "/:task_id/status",
            get(deadline_handlers::get_notification_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new().nest("/deadlines", deadline_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
