use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Log one line at request start and one at completion, correlated by a
/// short request id.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().simple().to_string();
    let rid = &id[..6];
    let path = req.uri().path().to_owned();

    info!(rid, path = %path, "start request");
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        rid,
        completed_in_ms = format_args!("{elapsed_ms:.2}"),
        status_code = response.status().as_u16(),
        "request completed"
    );
    response
}
