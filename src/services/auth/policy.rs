//! Route access table.
//!
//! Every route-level authorization decision lives here instead of on individual handlers.
//!
//! Patterns:
//! - `/a/b`    exact path
//! - `/a/**`   one or more further segments below `/a` (does NOT match `/a` itself)
//!
//! Precedence among matching rules: longest literal prefix, then exact over subtree, then
//! method-specific over any-method. Declaration order never matters; two rules that would tie
//! with different outcomes are rejected when the table is built.
//!
//! Paths matching no rule require authentication (default deny).

use axum::http::Method;
use thiserror::Error;

use super::identity::Role;

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid route pattern: {0}")]
    InvalidPattern(String),
    #[error("conflicting access rules for {pattern}")]
    Conflict { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    // stored with its trailing slash: `/a/**` -> `/a/`
    Subtree(String),
}

impl PathPattern {
    fn parse(raw: &str) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidPattern(raw.to_string());
        if !raw.starts_with('/') {
            return Err(invalid());
        }
        if let Some(prefix) = raw.strip_suffix("/**") {
            if prefix.contains('*') {
                return Err(invalid());
            }
            return Ok(Self::Subtree(format!("{prefix}/")));
        }
        if raw.contains('*') {
            return Err(invalid());
        }
        Ok(Self::Exact(raw.to_string()))
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Subtree(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/')),
        }
    }

    fn literal(&self) -> &str {
        match self {
            Self::Exact(p) | Self::Subtree(p) => p,
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// One entry of the table. Empty `methods` means any method.
#[derive(Debug, Clone)]
pub struct AccessRule {
    pattern: PathPattern,
    methods: Vec<Method>,
    access: Access,
}

impl AccessRule {
    pub fn access(&self) -> Access {
        self.access
    }

    fn applies_to(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    fn specificity(&self) -> (usize, bool, bool) {
        (
            self.pattern.literal().len(),
            self.pattern.is_exact(),
            !self.methods.is_empty(),
        )
    }

    fn conflicts_with(&self, other: &AccessRule) -> bool {
        if self.pattern != other.pattern || self.access == other.access {
            return false;
        }
        match (self.methods.is_empty(), other.methods.is_empty()) {
            (true, true) => true,
            (false, false) => self.methods.iter().any(|m| other.methods.contains(m)),
            // method-specific always wins over any-method
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    rules: Vec<(Vec<Method>, String, Access)>,
}

impl AccessPolicyBuilder {
    pub fn rule(mut self, methods: &[Method], pattern: &str, access: Access) -> Self {
        self.rules.push((methods.to_vec(), pattern.to_string(), access));
        self
    }

    pub fn public(self, methods: &[Method], pattern: &str) -> Self {
        self.rule(methods, pattern, Access::Public)
    }

    pub fn authenticated(self, methods: &[Method], pattern: &str) -> Self {
        self.rule(methods, pattern, Access::Authenticated)
    }

    pub fn role(self, methods: &[Method], pattern: &str, role: Role) -> Self {
        self.rule(methods, pattern, Access::Role(role))
    }

    pub fn build(self) -> Result<AccessPolicy, PolicyError> {
        let mut rules: Vec<AccessRule> = Vec::with_capacity(self.rules.len());
        for (methods, raw, access) in self.rules {
            let rule = AccessRule {
                pattern: PathPattern::parse(&raw)?,
                methods,
                access,
            };
            if rules.iter().any(|r| r.conflicts_with(&rule)) {
                return Err(PolicyError::Conflict { pattern: raw });
            }
            rules.push(rule);
        }
        Ok(AccessPolicy { rules })
    }
}

/// Immutable rule table, built once at startup.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// Most specific rule for the request, if any.
    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&AccessRule> {
        if !is_canonical(path) {
            return None;
        }
        // HEAD is served by GET handlers
        let get = Method::GET;
        let method = if *method == Method::HEAD { &get } else { method };

        self.rules
            .iter()
            .filter(|r| r.applies_to(method) && r.pattern.matches(path))
            .max_by_key(|r| r.specificity())
    }

    pub fn classify(&self, method: &Method, path: &str) -> Access {
        self.matching_rule(method, path)
            .map_or(Access::Authenticated, AccessRule::access)
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

// Non-canonical paths never match a rule.
fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    let inner = path.strip_suffix('/').unwrap_or(path);
    inner
        .split('/')
        .skip(1)
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// ShopEase route table.
pub fn shop_policy() -> Result<AccessPolicy, PolicyError> {
    use Method as M;

    AccessPolicy::builder()
        .public(&[M::GET], "/health")
        // auth + machine callbacks
        .public(&[], "/api/auth/**")
        .public(&[M::POST], "/api/payments/webhook")
        // catalog reads
        .public(&[M::GET], "/api/products")
        .public(&[M::GET], "/api/products/**")
        .public(&[M::POST], "/api/products/search")
        .public(&[M::GET], "/api/categories")
        // catalog writes
        .role(&[M::POST], "/api/products", Role::Admin)
        .role(&[M::PUT, M::DELETE], "/api/products/**", Role::Admin)
        .role(&[M::POST], "/api/categories", Role::Admin)
        .role(&[M::DELETE], "/api/categories/**", Role::Admin)
        .authenticated(&[M::GET], "/api/categories/**")
        .authenticated(&[], "/api/users/**")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> AccessPolicy {
        shop_policy().unwrap()
    }

    #[test]
    fn shop_public_routes() {
        let p = shop();
        for (method, path) in [
            (Method::POST, "/api/auth/login"),
            (Method::POST, "/api/auth/register"),
            (Method::POST, "/api/payments/webhook"),
            (Method::GET, "/api/products"),
            (Method::GET, "/api/products/42"),
            (Method::POST, "/api/products/search"),
            (Method::GET, "/api/categories"),
            (Method::GET, "/health"),
        ] {
            assert_eq!(p.classify(&method, path), Access::Public, "{method} {path}");
        }
    }

    #[test]
    fn shop_admin_routes() {
        let p = shop();
        for (method, path) in [
            (Method::POST, "/api/products"),
            (Method::PUT, "/api/products/42"),
            (Method::DELETE, "/api/products/42"),
            (Method::POST, "/api/categories"),
            (Method::DELETE, "/api/categories/3"),
        ] {
            assert_eq!(
                p.classify(&method, path),
                Access::Role(Role::Admin),
                "{method} {path}"
            );
        }
    }

    #[test]
    fn shop_authenticated_routes() {
        let p = shop();
        assert_eq!(
            p.classify(&Method::GET, "/api/users/profile"),
            Access::Authenticated
        );
        assert_eq!(
            p.classify(&Method::GET, "/api/categories/3"),
            Access::Authenticated
        );
        // search is only public for POST
        assert_eq!(
            p.classify(&Method::PUT, "/api/products/search"),
            Access::Role(Role::Admin)
        );
    }

    #[test]
    fn unknown_routes_default_to_authenticated() {
        let p = shop();
        assert!(p.matching_rule(&Method::GET, "/api/orders").is_none());
        assert_eq!(p.classify(&Method::GET, "/api/orders"), Access::Authenticated);
        assert_eq!(
            p.classify(&Method::PATCH, "/api/products/1"),
            Access::Authenticated
        );
    }

    #[test]
    fn subtree_does_not_cover_its_root() {
        let p = AccessPolicy::builder()
            .public(&[], "/docs/**")
            .build()
            .unwrap();
        assert_eq!(p.classify(&Method::GET, "/docs/a"), Access::Public);
        assert_eq!(p.classify(&Method::GET, "/docs/a/b/c"), Access::Public);
        assert_eq!(p.classify(&Method::GET, "/docs"), Access::Authenticated);
        assert_eq!(p.classify(&Method::GET, "/docs/"), Access::Authenticated);
        assert_eq!(p.classify(&Method::GET, "/docsx/a"), Access::Authenticated);
    }

    #[test]
    fn narrower_admin_subtree_is_not_shadowed_by_broader_public_rule() {
        let declared_broad_first = AccessPolicy::builder()
            .public(&[], "/files/**")
            .role(&[], "/files/private/**", Role::Admin)
            .build()
            .unwrap();
        let declared_narrow_first = AccessPolicy::builder()
            .role(&[], "/files/private/**", Role::Admin)
            .public(&[], "/files/**")
            .build()
            .unwrap();

        for p in [declared_broad_first, declared_narrow_first] {
            assert_eq!(
                p.classify(&Method::GET, "/files/private/report"),
                Access::Role(Role::Admin)
            );
            // siblings stay public
            assert_eq!(p.classify(&Method::GET, "/files/readme"), Access::Public);
            assert_eq!(
                p.classify(&Method::GET, "/files/privateer"),
                Access::Public
            );
        }
    }

    #[test]
    fn exact_literal_beats_subtree() {
        let p = AccessPolicy::builder()
            .role(&[], "/items/**", Role::Admin)
            .public(&[], "/items/search")
            .build()
            .unwrap();
        assert_eq!(p.classify(&Method::POST, "/items/search"), Access::Public);
        assert_eq!(
            p.classify(&Method::POST, "/items/search/x"),
            Access::Role(Role::Admin)
        );
    }

    #[test]
    fn method_specific_rule_beats_any_method_rule() {
        let p = AccessPolicy::builder()
            .public(&[], "/items")
            .role(&[Method::POST], "/items", Role::Admin)
            .build()
            .unwrap();
        assert_eq!(p.classify(&Method::GET, "/items"), Access::Public);
        assert_eq!(
            p.classify(&Method::POST, "/items"),
            Access::Role(Role::Admin)
        );
    }

    #[test]
    fn head_follows_get() {
        let p = shop();
        assert_eq!(p.classify(&Method::HEAD, "/api/products"), Access::Public);
    }

    #[test]
    fn ambiguous_rules_are_rejected() {
        let err = AccessPolicy::builder()
            .public(&[Method::GET, Method::POST], "/x")
            .role(&[Method::POST], "/x", Role::Admin)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PolicyError::Conflict {
                pattern: "/x".into()
            }
        );

        let err = AccessPolicy::builder()
            .public(&[], "/y/**")
            .authenticated(&[], "/y/**")
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::Conflict { .. }));

        // same outcome twice is fine
        assert!(
            AccessPolicy::builder()
                .public(&[], "/z")
                .public(&[], "/z")
                .build()
                .is_ok()
        );
    }

    #[test]
    fn unsupported_patterns_are_rejected() {
        for raw in ["no-slash", "/a/*/b", "/a/*", "/a*/**"] {
            assert!(
                matches!(
                    AccessPolicy::builder().public(&[], raw).build(),
                    Err(PolicyError::InvalidPattern(_))
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn non_canonical_paths_fall_to_default() {
        let p = shop();
        assert_eq!(
            p.classify(&Method::GET, "/api/products/../users/profile"),
            Access::Authenticated
        );
        assert_eq!(
            p.classify(&Method::GET, "/api/products//1"),
            Access::Authenticated
        );
        assert_eq!(
            p.classify(&Method::GET, "/api/products/./1"),
            Access::Authenticated
        );
    }
}
