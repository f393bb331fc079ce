use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Does not reach out to the marketing service. Viewing the response requires
/// `curl -v`.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
