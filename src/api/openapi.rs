//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, orders, playlists, reviews, stats, transactions};

/// Registers the bearer token scheme referenced by protected endpoints
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
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "BookX API",
        version = "1.0.0",
        description = "Bookstore and library service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_categories,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::import_from_google,
        // Reviews
        reviews::add_review,
        reviews::list_reviews,
        reviews::delete_review,
        // Transactions
        transactions::borrow_book,
        transactions::return_book,
        transactions::my_history,
        transactions::list_transactions,
        transactions::approve_borrow,
        transactions::reject_borrow,
        // Playlists
        playlists::create_playlist,
        playlists::add_book,
        playlists::add_book_by_path,
        playlists::remove_book,
        playlists::my_playlists,
        playlists::my_books,
        playlists::public_playlists,
        playlists::get_playlist,
        // Orders
        orders::checkout,
        orders::my_orders,
        orders::manual_confirm,
        orders::pending_orders,
        orders::approve_order,
        orders::reject_order,
        orders::payment_webhook,
        // Statistics
        stats::get_summary,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookPage,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::enums::BookType,
            crate::models::enums::BookStatus,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::ReviewPage,
            // Transactions
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::BookSummary,
            crate::models::transaction::BorrowRequest,
            crate::models::enums::TransactionStatus,
            // Playlists
            crate::models::playlist::Playlist,
            crate::models::playlist::PlaylistBook,
            crate::models::playlist::PlaylistEntry,
            crate::models::playlist::PlaylistDetails,
            crate::models::playlist::PlaylistPage,
            crate::models::playlist::CreatePlaylist,
            crate::models::playlist::AddBookRequest,
            // Orders
            crate::models::order::OrderDetails,
            crate::models::order::OrderItemDetails,
            crate::models::order::CheckoutRequest,
            crate::models::order::CheckoutResponse,
            crate::models::order::WebhookRequest,
            crate::models::enums::OrderStatus,
            crate::models::enums::PaymentMethod,
            crate::models::enums::ItemType,
            // Statistics
            crate::services::stats::StatsSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "reviews", description = "Book reviews and ratings"),
        (name = "transactions", description = "Borrowing and returns"),
        (name = "playlists", description = "User book collections"),
        (name = "orders", description = "Checkout and payments"),
        (name = "statistics", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/orders/checkout"));
        assert!(doc.paths.paths.contains_key("/api/books/{id}/reviews"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
