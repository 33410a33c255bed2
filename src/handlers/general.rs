// src/handlers/general.rs

use crate::{errors::AppResult, state::AppState};
use axum::{Json, extract::State, response::Html};

/// Landing page
pub async fn root() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>HR Payroll API</title>
    <style>
        body { font-family: sans-serif; max-width: 640px; margin: 4rem auto; color: #222; }
        code { background: #f4f4f4; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>HR Payroll API</h1>
    <p>Multi-tenant payroll administration service.</p>
    <ul>
        <li>Interactive docs: <a href="/swagger-ui">/swagger-ui</a></li>
        <li>Health check: <code>GET /health</code></li>
        <li>API base: <code>/api/v1</code></li>
    </ul>
</body>
</html>"#,
    )
}

/// Liveness check including database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 500, description = "Database unreachable"),
    ),
    tag = "General"
)]
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "service": "hr-payroll",
    })))
}
