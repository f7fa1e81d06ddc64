//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::account::{AccountUpdate, NewAccount};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountView, CancelResponse, CreateTransferRequest, ErrorDetail, TransferView,
};
use crate::validation::FieldViolation;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Transfer Ledger API",
        version = "1.0.0",
        description = "Account management and atomic money transfers between accounts.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        // Accounts
        crate::gateway::handlers::list_accounts,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::get_account_by_number,
        crate::gateway::handlers::create_account,
        crate::gateway::handlers::update_account,
        crate::gateway::handlers::delete_account,
        // Transfers
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::list_transfers,
        crate::gateway::handlers::get_transfer,
        crate::gateway::handlers::cancel_transfer,
        crate::gateway::handlers::delete_transfer,
        crate::gateway::handlers::transfer_history,
    ),
    components(
        schemas(
            HealthResponse,
            AccountView,
            NewAccount,
            AccountUpdate,
            TransferView,
            CreateTransferRequest,
            CancelResponse,
            ErrorDetail,
            FieldViolation,
        )
    ),
    tags(
        (name = "Account", description = "Account management"),
        (name = "Transfer", description = "Transfer execution and lifecycle"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Transfer Ledger API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json_str = spec.to_json().unwrap();
        assert!(json_str.contains("Transfer Ledger API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        for path in [
            "/api/v1/health",
            "/api/v1/accounts",
            "/api/v1/accounts/{id}",
            "/api/v1/accounts/by-number/{number}",
            "/api/v1/transfers",
            "/api/v1/transfers/{id}",
            "/api/v1/transfers/{id}/cancel",
            "/api/v1/transfers/history/{account_id}",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_schemas_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.schemas.contains_key("TransferView"));
        assert!(components.schemas.contains_key("CreateTransferRequest"));
        assert!(components.schemas.contains_key("FieldViolation"));
    }
}
