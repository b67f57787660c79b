use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, warn};

use crate::web::error::RelayError;
use crate::AppState;

// Chat API endpoint. Body read failures (size limit, broken stream) go through
// the relay so they are answered with the same JSON error shape.
pub async fn chat(
    data: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, RelayError> {
    let body = body.map_err(|e| {
        warn!("Failed to read /chat body: {}", e);
        RelayError::UnreadableBody(e.to_string())
    });
    let reply = data.relay.handle(body).await?;
    Ok(HttpResponse::Ok().json(reply))
}

// Every GET serves the chat page; any other unmatched request is a 404
pub async fn fallback(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    if req.method() != Method::GET {
        return not_found();
    }
    index(&data).await
}

// Read on every request so edits to the page show up without a restart
async fn index(data: &AppState) -> HttpResponse {
    match tokio::fs::read(&data.index_path).await {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Failed to read {}: {}", data.index_path.display(), e);
            HttpResponse::InternalServerError()
                .content_type("text/plain")
                .body("Error loading index.html")
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain")
        .body("Not found")
}
