//! HTTP routes for the inspector server.

pub mod inspect;

/// Root route: the UI is served elsewhere, this just says where to post.
pub async fn usage() -> &'static str {
    "Surface Inspector\n\nPOST an .api.json document to /api/inspect to receive the projected view tree.\n"
}
