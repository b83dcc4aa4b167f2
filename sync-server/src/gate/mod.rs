//! Route gate: which paths need a signed-in session.
//!
//! Every request path falls into one [`RouteClass`]:
//! - `Ignored`: never looked at (static files, webhooks, upload callbacks)
//! - `Public`: a session is attached if present but not required
//! - `Protected`: a valid session is required

pub mod matcher;
pub mod middleware;
pub mod pattern;
pub mod session;

pub use matcher::{is_api_route, RouteMatcher};
pub use middleware::{route_gate, GateState};
pub use pattern::{PatternError, RoutePattern};
pub use session::{JwtSessionVerifier, SessionClaims, SessionError, SessionVerifier};

/// Reachable without a session.
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/", "/events/:id"];

/// Skipped by the gate entirely; external callers hit these unauthenticated.
pub const DEFAULT_IGNORED_ROUTES: &[&str] = &[
    "/api/webhooks/clerk",
    "/api/webhooks/stripe",
    "/api/uploadthing",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Ignored,
    Public,
    Protected,
}

/// Static route configuration, evaluated per request.
#[derive(Debug, Clone)]
pub struct RouteGate {
    public: Vec<RoutePattern>,
    ignored: Vec<RoutePattern>,
    matcher: RouteMatcher,
}

impl RouteGate {
    pub fn new<S: AsRef<str>>(public: &[S], ignored: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            public: pattern::parse_all(public)?,
            ignored: pattern::parse_all(ignored)?,
            matcher: RouteMatcher,
        })
    }

    /// Built-in lists, each replaceable independently.
    pub fn with_overrides(
        public: Option<&[String]>,
        ignored: Option<&[String]>,
    ) -> Result<Self, PatternError> {
        let public = match public {
            Some(routes) => pattern::parse_all(routes)?,
            None => pattern::parse_all(DEFAULT_PUBLIC_ROUTES)?,
        };
        let ignored = match ignored {
            Some(routes) => pattern::parse_all(routes)?,
            None => pattern::parse_all(DEFAULT_IGNORED_ROUTES)?,
        };

        Ok(Self {
            public,
            ignored,
            matcher: RouteMatcher,
        })
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if !self.matcher.examines(path) {
            return RouteClass::Ignored;
        }
        if self.ignored.iter().any(|p| p.matches(path)) {
            return RouteClass::Ignored;
        }
        if self.public.iter().any(|p| p.matches(path)) {
            return RouteClass::Public;
        }
        RouteClass::Protected
    }
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::with_overrides(None, None).expect("built-in route patterns are valid")
    }
}
