//! Upload form handler.

use axum::response::Html;

use crate::render;

/// `GET /`: the upload form.
pub async fn index() -> Html<String> {
    Html(render::index_page())
}
