//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{contacts, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Contacts API",
        version = "1.0.0",
        description = "CRUD REST API for contacts",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Contacts
        contacts::list_contacts,
        contacts::get_contact,
        contacts::create_contact,
        contacts::update_contact,
        contacts::delete_contact,
    ),
    components(
        schemas(
            crate::models::contact::Contact,
            crate::models::contact::CreateContact,
            crate::models::contact::UpdateContact,
            crate::models::contact::InsertAck,
            crate::api::MessageResponse,
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ValidationErrorResponse,
            crate::validation::FieldError,
            crate::validation::Location,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "contacts", description = "Contact management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
