//! Decides which requests the route gate looks at at all.

use std::sync::LazyLock;

use regex::Regex;

/// Framework internals and anything that looks like a static file.
/// `.js` counts as static but `.json` does not.
static STATIC_ASSET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(?:_next|[^?]*\.(?:html?|css|js(?:$|[^o]|o(?:$|[^n]))|jpe?g|webp|png|gif|svg|ttf|woff2?|ico|csv|docx?|xlsx?|zip|webmanifest))",
    )
    .expect("static asset regex is valid")
});

static API_ROUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:api|trpc)(?:/|$)").expect("api route regex is valid"));

/// Request matcher for the gate middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteMatcher;

impl RouteMatcher {
    /// API routes are always examined; otherwise static files and
    /// framework internals are skipped.
    pub fn examines(&self, path: &str) -> bool {
        is_api_route(path) || !STATIC_ASSET_REGEX.is_match(path)
    }
}

/// `/api` and `/trpc` as whole segments; `/apiary` is an ordinary path.
pub fn is_api_route(path: &str) -> bool {
    API_ROUTE_REGEX.is_match(path)
}
