use crate::config::GatewayConfig;

/// One forwarding rule: an inbound path prefix, the upstream that owns it,
/// and the prefix to rewrite to on the upstream side.
#[derive(Debug, Clone)]
pub struct Route {
    pub prefix: &'static str,
    pub rewrite: &'static str,
    pub upstream: String,
    pub service: &'static str,
}

/// Static prefix-to-upstream table. Matching is longest-prefix on path
/// segment boundaries; there is exactly one upstream per prefix.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// A matched route with the upstream-side path already rewritten.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub upstream: String,
    pub path: String,
    pub service: &'static str,
}

impl RouteTable {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let assignment = config.assignment_service_url.trim_end_matches('/');
        let content = config.content_service_url.trim_end_matches('/');
        let auth = config.auth_service_url.trim_end_matches('/');

        let entry = |prefix, rewrite, upstream: &str, service| Route {
            prefix,
            rewrite,
            upstream: upstream.to_string(),
            service,
        };

        let mut routes = vec![
            entry("/api/assignments", "/api/assignments", assignment, "assignment_service"),
            entry("/api/progress", "/api/progress", assignment, "assignment_service"),
            entry("/api/sessions", "/api/sessions", assignment, "assignment_service"),
            entry("/api/analytics", "/api/analytics", assignment, "assignment_service"),
            entry("/api/courses", "/api/v1/courses", content, "content_service"),
            entry("/api/decks", "/api/v1/decks", content, "content_service"),
            entry("/api/auth", "/api/v1/auth", auth, "auth_service"),
            entry("/api/users", "/api/v1/users", auth, "auth_service"),
        ];

        // Longest prefix wins, so sort once instead of scanning for the best
        // match per request
        routes.sort_by_key(|r| std::cmp::Reverse(r.prefix.len()));
        Self { routes }
    }

    /// Match a request path against the table and rewrite the prefix.
    /// Prefixes only match on segment boundaries: `/api/coursesextra` does
    /// not match `/api/courses`.
    pub fn resolve(&self, path: &str) -> Option<ResolvedTarget> {
        for route in &self.routes {
            let matched = path == route.prefix
                || path
                    .strip_prefix(route.prefix)
                    .is_some_and(|rest| rest.starts_with('/'));
            if matched {
                let remainder = &path[route.prefix.len()..];
                return Some(ResolvedTarget {
                    upstream: route.upstream.clone(),
                    path: format!("{}{}", route.rewrite, remainder),
                    service: route.service,
                });
            }
        }
        None
    }

    /// The distinct upstreams to probe for the aggregate health check.
    pub fn upstreams(config: &GatewayConfig) -> Vec<(&'static str, String)> {
        vec![
            (
                "assignment_service",
                config.assignment_service_url.trim_end_matches('/').to_string(),
            ),
            (
                "content_service",
                config.content_service_url.trim_end_matches('/').to_string(),
            ),
            (
                "auth_service",
                config.auth_service_url.trim_end_matches('/').to_string(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig {
            assignment_service_url: "http://localhost:8004".to_string(),
            content_service_url: "http://localhost:8002/".to_string(),
            auth_service_url: "http://localhost:8001".to_string(),
            forward_timeout_secs: 30,
            health_timeout_secs: 5,
        }
    }

    #[test]
    fn forwards_assignment_paths_unrewritten() {
        let table = RouteTable::from_config(&config());
        let target = table.resolve("/api/assignments/17").unwrap();
        assert_eq!(target.upstream, "http://localhost:8004");
        assert_eq!(target.path, "/api/assignments/17");
        assert_eq!(target.service, "assignment_service");
    }

    #[test]
    fn rewrites_content_prefixes() {
        let table = RouteTable::from_config(&config());
        let target = table.resolve("/api/courses/abc/lessons").unwrap();
        assert_eq!(target.upstream, "http://localhost:8002");
        assert_eq!(target.path, "/api/v1/courses/abc/lessons");

        let target = table.resolve("/api/decks/").unwrap();
        assert_eq!(target.path, "/api/v1/decks/");
    }

    #[test]
    fn rewrites_auth_prefixes() {
        let table = RouteTable::from_config(&config());
        let target = table.resolve("/api/auth/login").unwrap();
        assert_eq!(target.upstream, "http://localhost:8001");
        assert_eq!(target.path, "/api/v1/auth/login");

        let target = table.resolve("/api/users").unwrap();
        assert_eq!(target.path, "/api/v1/users");
    }

    #[test]
    fn unknown_prefixes_do_not_match() {
        let table = RouteTable::from_config(&config());
        assert!(table.resolve("/api/nonexistent/").is_none());
        assert!(table.resolve("/health").is_none());
        assert!(table.resolve("/").is_none());
    }

    #[test]
    fn matching_respects_segment_boundaries() {
        let table = RouteTable::from_config(&config());
        assert!(table.resolve("/api/coursesextra").is_none());
        assert!(table.resolve("/api/assignmentsx/1").is_none());
    }
}
