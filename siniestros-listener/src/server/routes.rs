use http::{HeaderMap, Method};

use super::cors;

pub const LISTENER_PATH: &str = "/listener";
pub const WEB_MOUNT: &str = "/web";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Preflight,
    Listener,
    /// Path below `/web`, without the mount prefix.
    Web { rel: &'a str, head: bool },
    MethodNotAllowed { allow: &'static str },
    /// `/listener/` answered with a 307 to the canonical path.
    RedirectSlash { location: &'static str },
    Unmatched,
}

impl Route<'_> {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Listener => "listener",
            Route::Web { .. } => "web",
            Route::MethodNotAllowed { .. } => "method_not_allowed",
            Route::RedirectSlash { .. } => "redirect",
            Route::Unmatched => "unmatched",
        }
    }
}

pub fn resolve<'a>(method: &Method, path: &'a str, headers: &HeaderMap) -> Route<'a> {
    if cors::is_preflight(method, headers) {
        return Route::Preflight;
    }

    if path == LISTENER_PATH {
        return if *method == Method::POST {
            Route::Listener
        } else {
            Route::MethodNotAllowed { allow: "POST" }
        };
    }

    if path.strip_suffix('/') == Some(LISTENER_PATH) {
        return Route::RedirectSlash { location: LISTENER_PATH };
    }

    if let Some(rel) = web_rel(path) {
        return match *method {
            Method::GET => Route::Web { rel, head: false },
            Method::HEAD => Route::Web { rel, head: true },
            _ => Route::MethodNotAllowed { allow: "GET, HEAD" },
        };
    }

    Route::Unmatched
}

fn web_rel(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(WEB_MOUNT)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        // "/website" is not under the mount
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, path: &str) -> Route<'_> {
        resolve(&method, path, &HeaderMap::new())
    }

    #[test]
    fn listener_accepts_post_only() {
        assert_eq!(route(Method::POST, "/listener"), Route::Listener);
        assert_eq!(route(Method::GET, "/listener"), Route::MethodNotAllowed { allow: "POST" });
    }

    #[test]
    fn trailing_slash_on_listener_redirects() {
        let want = Route::RedirectSlash { location: "/listener" };
        assert_eq!(route(Method::POST, "/listener/"), want);
        assert_eq!(route(Method::GET, "/listener/"), want);
        assert_eq!(route(Method::POST, "/listener//"), Route::Unmatched);
    }

    #[test]
    fn web_mount_strips_prefix() {
        assert_eq!(route(Method::GET, "/web"), Route::Web { rel: "", head: false });
        assert_eq!(route(Method::GET, "/web/js/app.js"), Route::Web { rel: "/js/app.js", head: false });
        assert_eq!(route(Method::HEAD, "/web/"), Route::Web { rel: "/", head: true });
        assert_eq!(route(Method::GET, "/website"), Route::Unmatched);
        assert_eq!(route(Method::DELETE, "/web/x"), Route::MethodNotAllowed { allow: "GET, HEAD" });
    }

    #[test]
    fn preflight_wins_over_routes() {
        let mut h = HeaderMap::new();
        h.insert("origin", "https://a.example".parse().unwrap());
        h.insert("access-control-request-method", "POST".parse().unwrap());
        assert_eq!(resolve(&Method::OPTIONS, "/listener", &h), Route::Preflight);
        assert_eq!(resolve(&Method::OPTIONS, "/anything", &h), Route::Preflight);
    }

    #[test]
    fn everything_else_is_unmatched() {
        assert_eq!(route(Method::GET, "/"), Route::Unmatched);
        assert_eq!(route(Method::GET, "/docs"), Route::Unmatched);
        assert_eq!(route(Method::OPTIONS, "/listener"), Route::MethodNotAllowed { allow: "POST" });
    }
}
