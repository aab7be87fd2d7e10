use crate::server::router::CinelogState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod handlers;

pub fn router() -> Router<CinelogState> {
    Router::new()
        .route("/", get(handlers::list_reviews_handler))
        .route(
            "/add",
            get(handlers::add_form_handler).post(handlers::add_review_handler),
        )
        .route(
            "/edit/{id}",
            get(handlers::edit_form_handler).post(handlers::edit_review_handler),
        )
        .route("/delete/{id}", post(handlers::delete_review_handler))
}
