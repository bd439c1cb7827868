//! Cross-origin policy built from the configured origin patterns.

use actix_cors::Cors;
use actix_web::dev::RequestHead;
use actix_web::http::{header::HeaderValue, Method};

/// Matches `origin` against a configured pattern.
///
/// A pattern ending in `:*` accepts the host with any port or with no port at all.
/// Any other pattern must equal the origin exactly.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix(":*") {
        Some(prefix) => match origin.strip_prefix(prefix) {
            Some("") => true,
            Some(rest) => rest
                .strip_prefix(':')
                .map_or(false, |port| {
                    !port.is_empty() && port.chars().all(|c| c.is_ascii_digit())
                }),
            None => false,
        },
        None => pattern == origin,
    }
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    let patterns = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin: &HeaderValue, _req_head: &RequestHead| {
            origin.to_str().map_or(false, |origin| {
                patterns
                    .iter()
                    .any(|pattern| origin_matches(pattern, origin))
            })
        })
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header, test as actix_test, web, App, HttpResponse};

    #[test]
    fn test_wildcard_port() {
        assert!(origin_matches("http://localhost:*", "http://localhost:3000"));
        assert!(origin_matches("http://localhost:*", "http://localhost"));
        assert!(!origin_matches("http://localhost:*", "http://localhost.evil.com"));
        assert!(!origin_matches("http://localhost:*", "http://localhost:"));
        assert!(!origin_matches("http://localhost:*", "https://localhost:3000"));
    }

    #[test]
    fn test_exact_origin() {
        assert!(origin_matches("https://mydomain.com", "https://mydomain.com"));
        assert!(!origin_matches("https://mydomain.com", "https://mydomain.com:8443"));
    }

    #[actix_rt::test]
    async fn test_preflight() {
        let origins = vec!["http://localhost:*".to_string()];
        let app = actix_test::init_service(
            App::new()
                .wrap(cors(&origins))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/ping")
            .insert_header((header::ORIGIN, "http://localhost:4200"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:4200")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }
}
