//! Compiling mock rules into a route table.

use log::{debug, info, warn};

use crate::mock::cors;
use crate::mock::format::Format;
use crate::mock::rule::MockRule;
use crate::parser::{HttpRequest, Method};
use crate::server::{Error, HttpResponse, RoutePath, Router, StatusCode};

/// Build the route table for a snapshot of `rules`.
///
/// Each rule becomes one route, in registration order, so the first of two
/// rules with the same method and path wins. A preflight `OPTIONS` route is
/// then appended for every distinct path; an explicit `OPTIONS` rule on that
/// path therefore takes precedence over it.
pub fn compile(rules: &[MockRule], cors_enabled: bool, format: Format) -> Router {
    let mut router = Router::new();
    let mut catch_all_methods: Vec<Method> = Vec::new();

    for rule in rules {
        if catch_all_methods.contains(&rule.method) {
            warn!(
                "Rule {method} {path} is shadowed by an earlier catch-all rule",
                method = rule.method,
                path = rule.path,
            );
        } else if rule.is_catch_all() {
            catch_all_methods.push(rule.method);
        }

        info!(
            "Registering HTTP route: {method} {path}",
            method = rule.method,
            path = RoutePath::from_pattern(&rule.path),
        );

        // Each handler owns its own copy of the rule
        let rule = rule.clone();
        router.route(RoutePath::from_pattern(&rule.path), vec![rule.method], move |request| {
            let response = respond(&rule, cors_enabled, format, &request);
            async move { Ok::<_, Error>(response) }
        });
    }

    let mut preflight_paths: Vec<RoutePath> = Vec::new();
    for rule in rules {
        let path = RoutePath::from_pattern(&rule.path);
        if !preflight_paths.contains(&path) {
            preflight_paths.push(path);
        }
    }

    for path in preflight_paths {
        router.route(path, vec![Method::OPTIONS], move |request| {
            let response = preflight(cors_enabled, &request);
            async move { Ok::<_, Error>(response) }
        });
    }

    router
}

fn log_request(request: &HttpRequest) {
    match request.remote_addr {
        Some(addr) => info!(
            "HTTP request received: {method} {target} from {addr}",
            method = request.method,
            target = request.target,
        ),
        None => info!(
            "HTTP request received: {method} {target}",
            method = request.method,
            target = request.target,
        ),
    }
    if let Some(origin) = request.get_header("Origin") {
        debug!("Request origin: {origin}");
    }
}

/// Render the response for a request that matched `rule`.
fn respond(
    rule: &MockRule,
    cors_enabled: bool,
    format: Format,
    request: &HttpRequest,
) -> HttpResponse {
    log_request(request);

    let mut response = HttpResponse::new(rule.status);
    if cors_enabled {
        response = cors::apply(response);
    }
    let response = response.with_content_type(format.content_type());

    if !rule.status.allows_body() {
        return response;
    }

    let body = match rule.payload.encode(format) {
        Ok(body) => body,
        Err(e) => {
            warn!(
                "Sending partial body for {method} {path}: {e}",
                method = rule.method,
                path = rule.path,
            );
            e.partial
        }
    };

    response.with_body_bytes(body)
}

/// Answer a CORS preflight: always `200 OK` with no body.
fn preflight(cors_enabled: bool, request: &HttpRequest) -> HttpResponse {
    log_request(request);

    let response = HttpResponse::new(StatusCode::OK);
    if cors_enabled {
        cors::apply(response)
    } else {
        response
    }
}
