//! Route table, OpenAPI document, and HTTP middleware.
//!
//! Every handler is registered through `utoipa-axum` so the OpenAPI document is built
//! from the same table that serves requests. The OTP endpoints sit behind a per-IP rate
//! limiter; CORS and request tracing wrap the whole API.

use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{
    config::Config,
    controller::{
        admin, auth, booking, car, emergency, message, negotiation, notification, preference,
        rating, trip, user,
    },
    error::{config::ConfigError, AppError},
    state::AppState,
};

/// Registers the JWT bearer scheme referenced by `security(("bearer_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by the verify-otp and refresh endpoints",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "AutoPort API",
        description = "Intercity ride-sharing: trips, bookings, price negotiation, and safety",
        version = "1.0.0"
    ),
    tags(
        (name = "auth", description = "Phone registration and login with SMS codes"),
        (name = "users", description = "Profiles and driver applications"),
        (name = "cars", description = "Driver vehicles"),
        (name = "trips", description = "Publishing and searching trips"),
        (name = "bookings", description = "Seat reservations"),
        (name = "negotiations", description = "Price offers between passengers and drivers"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "messages", description = "Trip conversations"),
        (name = "ratings", description = "Post-trip ratings"),
        (name = "emergency", description = "Emergency contacts and alerts"),
        (name = "preferences", description = "Travel preferences and settings"),
        (name = "admin", description = "Moderation and operations")
    )
)]
pub struct ApiDoc;

/// Builds the application router.
///
/// # Arguments
/// - `config` - Supplies the OTP rate limit and the allowed CORS origins
///
/// # Returns
/// - `Ok(Router<AppState>)` - API under `/api/v1`, Swagger UI at `/swagger-ui`
/// - `Err(AppError::ConfigErr)` - Rate limit of zero or an unparsable CORS origin
pub fn router(config: &Config) -> Result<Router<AppState>, AppError> {
    let otp_limit = GovernorConfigBuilder::default()
        .per_second(config.otp_rate_per_second)
        .burst_size(config.otp_rate_burst)
        .finish()
        .ok_or_else(|| {
            ConfigError::Invalid("OTP rate limit period and burst must be positive".to_string())
        })?;

    let routes = api_routes().merge(otp_routes().layer(GovernorLayer::new(Arc::new(otp_limit))));

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v1", routes)
        .split_for_parts();

    let router = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Endpoints that send or check SMS codes.
fn otp_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::request_registration_otp))
        .routes(routes!(auth::verify_registration))
        .routes(routes!(auth::request_login_otp))
        .routes(routes!(auth::verify_login))
}

fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::refresh))
        // users
        .routes(routes!(user::get_me, user::update_me))
        .routes(routes!(user::apply_driver))
        .routes(routes!(user::set_push_token, user::clear_push_token))
        .routes(routes!(user::get_public_profile))
        .routes(routes!(user::deactivate_me))
        // cars
        .routes(routes!(car::create_car, car::get_my_cars))
        .routes(routes!(car::get_car, car::update_car, car::delete_car))
        .routes(routes!(car::set_default_car))
        // trips
        .routes(routes!(trip::create_trip))
        .routes(routes!(trip::search_trips))
        .routes(routes!(trip::get_my_trips))
        .routes(routes!(trip::get_trip, trip::update_trip))
        .routes(routes!(trip::start_trip))
        .routes(routes!(trip::complete_trip))
        .routes(routes!(trip::cancel_trip))
        .routes(routes!(trip::remind_passengers))
        // bookings
        .routes(routes!(booking::create_booking))
        .routes(routes!(booking::get_my_bookings))
        .routes(routes!(booking::get_incoming_bookings))
        .routes(routes!(booking::get_booking))
        .routes(routes!(booking::cancel_booking))
        // negotiations
        .routes(routes!(negotiation::open_negotiation))
        .routes(routes!(negotiation::get_my_offers))
        .routes(routes!(negotiation::get_received_offers))
        .routes(routes!(negotiation::get_trip_negotiations))
        .routes(routes!(
            negotiation::get_auto_accept_rule,
            negotiation::update_auto_accept_rule
        ))
        .routes(routes!(negotiation::get_price_recommendation))
        .routes(routes!(negotiation::bulk_respond))
        .routes(routes!(negotiation::get_negotiation))
        .routes(routes!(negotiation::counter_offer))
        .routes(routes!(negotiation::accept_offer))
        .routes(routes!(negotiation::reject_offer))
        .routes(routes!(negotiation::cancel_negotiation))
        // notifications
        .routes(routes!(notification::get_notifications))
        .routes(routes!(notification::get_unread_count))
        .routes(routes!(notification::mark_read))
        .routes(routes!(notification::mark_all_read))
        .routes(routes!(notification::delete_notification))
        // messages
        .routes(routes!(message::get_threads))
        .routes(routes!(message::get_thread, message::send_message))
        .routes(routes!(message::mark_thread_read))
        .routes(routes!(message::start_trip_conversation))
        .routes(routes!(message::get_unread_count))
        .routes(routes!(message::start_direct_conversation))
        .routes(routes!(message::delete_message))
        // ratings
        .routes(routes!(rating::create_rating))
        .routes(routes!(rating::get_given_ratings))
        .routes(routes!(rating::get_received_ratings))
        .routes(routes!(rating::get_rating_summary))
        .routes(routes!(rating::update_rating, rating::delete_rating))
        .routes(routes!(rating::can_rate_booking))
        .routes(routes!(rating::get_pending_ratings))
        // emergency
        .routes(routes!(emergency::create_contact, emergency::get_contacts))
        .routes(routes!(emergency::update_contact, emergency::delete_contact))
        .routes(routes!(emergency::set_primary_contact))
        .routes(routes!(emergency::create_alert, emergency::get_my_alerts))
        .routes(routes!(emergency::quick_sos))
        .routes(routes!(emergency::get_alert))
        .routes(routes!(emergency::resolve_alert))
        // preferences
        .routes(routes!(
            preference::get_travel_preference,
            preference::save_travel_preference
        ))
        .routes(routes!(preference::get_settings, preference::update_settings))
        .routes(routes!(preference::get_compatibility))
        // admin
        .routes(routes!(admin::get_pending_drivers))
        .routes(routes!(admin::get_pending_cars))
        .routes(routes!(admin::approve_driver))
        .routes(routes!(admin::reject_driver))
        .routes(routes!(admin::approve_car))
        .routes(routes!(admin::reject_car))
        .routes(routes!(admin::block_user))
        .routes(routes!(admin::unblock_user))
        .routes(routes!(admin::retry_failed_notifications))
        .routes(routes!(admin::broadcast_notification))
        .routes(routes!(admin::get_unresolved_alerts))
}

/// Builds the CORS layer. An empty list or a `*` entry allows any origin.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let allow_origin = if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::Invalid(format!("Invalid CORS origin '{}'", origin)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openapi() -> utoipa::openapi::OpenApi {
        let (_, openapi) = OpenApiRouter::<AppState>::with_openapi(ApiDoc::openapi())
            .nest("/api/v1", api_routes().merge(otp_routes()))
            .split_for_parts();
        openapi
    }

    /// Expected: every route group is documented under the `/api/v1` prefix
    #[test]
    fn documents_routes_under_api_prefix() {
        let doc = openapi();

        for path in [
            "/api/v1/auth/register/request-otp",
            "/api/v1/auth/refresh",
            "/api/v1/users/me",
            "/api/v1/trips/search",
            "/api/v1/negotiations/{id}/counter",
            "/api/v1/emergency/sos",
            "/api/v1/admin/notifications/retry-failed",
            "/api/v1/admin/notifications/broadcast",
            "/api/v1/negotiations/bulk-respond",
            "/api/v1/ratings/bookings/{id}/can-rate",
            "/api/v1/messages/users/{user_id}/conversation",
            "/api/v1/users/me/deactivate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
        assert!(doc.paths.paths.keys().all(|path| path.starts_with("/api/v1/")));
    }

    /// Expected: every operation carries a summary and documents its access rules
    #[test]
    fn documents_every_operation() {
        let doc = openapi();

        for (path, item) in &doc.paths.paths {
            let operations = [
                &item.get,
                &item.post,
                &item.put,
                &item.patch,
                &item.delete,
            ];
            for operation in operations.into_iter().flatten() {
                assert!(operation.summary.is_some(), "{path} has no summary");
                let description = operation.description.as_deref().unwrap_or_default();
                assert!(
                    description.contains("# Access Control"),
                    "{path} does not document access"
                );
                assert!(description.contains("# Returns"), "{path} lists no responses");
            }
        }
    }

    /// Expected: the bearer scheme referenced by handlers is registered
    #[test]
    fn registers_bearer_security_scheme() {
        let doc = openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    /// Expected: wildcard and empty origin lists build, malformed origins fail
    #[test]
    fn validates_cors_origins() {
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["*".to_string()]).is_ok());
        assert!(cors_layer(&["https://autoport.uz".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
