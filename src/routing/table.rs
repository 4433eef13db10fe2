//! Route table: ordered (prefix, router) mounts.

use axum::Router;

/// Error building the route table.
#[derive(Debug, thiserror::Error)]
pub enum RouteTableError {
    #[error("prefix '{0}' must start with '/'")]
    NotRooted(String),

    #[error("prefix '{0}' must not end with '/'")]
    TrailingSlash(String),

    #[error("prefix '{0}' is already mounted")]
    Duplicate(String),
}

/// Ordered list of path-prefix mounts, built once at startup.
///
/// Each mount pairs a prefix with an externally-owned handler chain; the
/// table itself never inspects what the feature router does.
#[derive(Default)]
pub struct RouteTable {
    mounts: Vec<(String, Router)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature router under `prefix`.
    pub fn mount(
        &mut self,
        prefix: impl Into<String>,
        router: Router,
    ) -> Result<(), RouteTableError> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') {
            return Err(RouteTableError::NotRooted(prefix));
        }
        if prefix.len() > 1 && prefix.ends_with('/') {
            return Err(RouteTableError::TrailingSlash(prefix));
        }
        if self.mounts.iter().any(|(p, _)| *p == prefix) {
            return Err(RouteTableError::Duplicate(prefix));
        }
        self.mounts.push((prefix, router));
        Ok(())
    }

    /// Registered prefixes, in registration order.
    pub fn prefixes(&self) -> Vec<&str> {
        self.mounts.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// The mount that would receive `path`: longest matching prefix, with
    /// registration order breaking ties. Matches only on segment
    /// boundaries, so `/api/users` does not capture `/api/userscore`.
    pub fn longest_match(&self, path: &str) -> Option<&str> {
        self.mounts
            .iter()
            .filter(|(prefix, _)| {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            // max_by_key keeps the later element on ties, so compare by
            // (len, reverse index) to prefer the earlier registration.
            .enumerate()
            .max_by_key(|(i, (prefix, _))| (prefix.len(), usize::MAX - i))
            .map(|(_, (prefix, _))| prefix.as_str())
    }

    /// Fold the mounts into an axum router.
    pub fn into_router(self) -> Router {
        self.mounts
            .into_iter()
            .fold(Router::new(), |app, (prefix, router)| {
                app.nest(&prefix, router)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_and_duplicate_prefixes() {
        let mut table = RouteTable::new();
        assert!(matches!(
            table.mount("api/auth", Router::new()),
            Err(RouteTableError::NotRooted(_))
        ));
        assert!(matches!(
            table.mount("/api/auth/", Router::new()),
            Err(RouteTableError::TrailingSlash(_))
        ));
        table.mount("/api/auth", Router::new()).unwrap();
        assert!(matches!(
            table.mount("/api/auth", Router::new()),
            Err(RouteTableError::Duplicate(_))
        ));
    }

    #[test]
    fn longest_prefix_wins() {
        let mut table = RouteTable::new();
        table.mount("/api", Router::new()).unwrap();
        table.mount("/api/users", Router::new()).unwrap();

        assert_eq!(table.longest_match("/api/users/42"), Some("/api/users"));
        assert_eq!(table.longest_match("/api/auth/login"), Some("/api"));
        assert_eq!(table.longest_match("/uploads/a.png"), None);
    }

    #[test]
    fn matches_only_on_segment_boundaries() {
        let mut table = RouteTable::new();
        table.mount("/api/users", Router::new()).unwrap();

        assert_eq!(table.longest_match("/api/users"), Some("/api/users"));
        assert_eq!(table.longest_match("/api/userscore"), None);
    }

    #[test]
    fn registration_order_breaks_ties() {
        // Two prefixes can only tie if equal, which mount() forbids; the
        // observable contract is that earlier mounts keep their position.
        let mut table = RouteTable::new();
        table.mount("/api/auth", Router::new()).unwrap();
        table.mount("/api/users", Router::new()).unwrap();
        assert_eq!(table.prefixes(), vec!["/api/auth", "/api/users"]);
    }
}
