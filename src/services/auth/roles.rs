/*
 * Responsibility
 * - Role (BUYER / REALTOR / ADMIN) の定義
 * - route (method + matched path) / route group (path prefix) → 許可 role 集合 の登録簿
 * - 起動時に builder で一度だけ組み立て、以降は読み取り専用 (Arc で共有)
 *
 * Lookup order
 * - handler 単位の宣言があればそれを使う (空集合 = 明示的に open)
 * - 無ければ最長一致の group 宣言
 * - どちらも無ければ宣言なし
 */
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Buyer,
    Realtor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "BUYER",
            Role::Realtor => "REALTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUYER" => Ok(Role::Buyer),
            "REALTOR" => Ok(Role::Realtor),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|role| role.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("roles declared twice for {method} {path}")]
    DuplicateHandler { method: Method, path: String },
    #[error("roles declared twice for group {prefix}")]
    DuplicateGroup { prefix: String },
}

/// Read-only after `build()`.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    handlers: HashMap<RouteKey, RoleSet>,
    // Longest prefix first.
    groups: Vec<(String, RoleSet)>,
}

impl RoleRegistry {
    pub fn builder() -> RoleRegistryBuilder {
        RoleRegistryBuilder::default()
    }

    /// Roles declared for `method path`, where `path` is the route pattern
    /// axum matched (e.g. `/api/v1/homes/{home_id}`).
    pub fn required_roles(&self, method: &Method, path: &str) -> Option<&RoleSet> {
        let key = RouteKey {
            method: method.clone(),
            path: path.to_string(),
        };
        if let Some(roles) = self.handlers.get(&key) {
            return Some(roles);
        }

        self.groups
            .iter()
            .find(|(prefix, _)| prefix_matches(prefix, path))
            .map(|(_, roles)| roles)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_end_matches('/').to_string()
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[derive(Debug, Default)]
pub struct RoleRegistryBuilder {
    handlers: Vec<(RouteKey, RoleSet)>,
    groups: Vec<(String, RoleSet)>,
}

impl RoleRegistryBuilder {
    /// Declare roles for every route under `prefix`.
    pub fn group(mut self, prefix: &str, roles: impl Into<RoleSet>) -> Self {
        self.groups.push((normalize_prefix(prefix), roles.into()));
        self
    }

    /// Declare roles for a single handler. An empty set opens the handler
    /// even inside a gated group.
    pub fn handler(mut self, method: Method, path: &str, roles: impl Into<RoleSet>) -> Self {
        let key = RouteKey {
            method,
            path: path.to_string(),
        };
        self.handlers.push((key, roles.into()));
        self
    }

    pub fn build(self) -> Result<RoleRegistry, RegistryError> {
        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (key, roles) in self.handlers {
            if handlers.contains_key(&key) {
                return Err(RegistryError::DuplicateHandler {
                    method: key.method,
                    path: key.path,
                });
            }
            handlers.insert(key, roles);
        }

        let mut groups: Vec<(String, RoleSet)> = Vec::with_capacity(self.groups.len());
        for (prefix, roles) in self.groups {
            if groups.iter().any(|(p, _)| *p == prefix) {
                return Err(RegistryError::DuplicateGroup { prefix });
            }
            groups.push((prefix, roles));
        }
        groups.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        Ok(RoleRegistry { handlers, groups })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoleRegistry {
        RoleRegistry::builder()
            .group("/api/v1/homes", [Role::Realtor, Role::Admin])
            .group("/api/v1/homes/{home_id}/messages", [Role::Admin])
            .handler(Method::GET, "/api/v1/homes", RoleSet::open())
            .handler(Method::POST, "/api/v1/homes/{home_id}/inquire", [Role::Buyer])
            .build()
            .unwrap()
    }

    #[test]
    fn role_set_displays_in_role_order() {
        let roles = RoleSet::from([Role::Admin, Role::Buyer]);
        assert_eq!(roles.to_string(), "[BUYER, ADMIN]");
        assert_eq!(RoleSet::open().to_string(), "[]");
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("realtor".parse::<Role>().unwrap(), Role::Realtor);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("landlord".parse::<Role>().is_err());
    }

    #[test]
    fn handler_declaration_overrides_group() {
        let registry = registry();

        let roles = registry
            .required_roles(&Method::POST, "/api/v1/homes/{home_id}/inquire")
            .unwrap();
        assert_eq!(roles, &RoleSet::from([Role::Buyer]));
    }

    #[test]
    fn empty_handler_declaration_opens_route_in_gated_group() {
        let registry = registry();

        let roles = registry.required_roles(&Method::GET, "/api/v1/homes").unwrap();
        assert!(roles.is_empty());

        // Same path, other method: falls back to the group.
        let roles = registry.required_roles(&Method::POST, "/api/v1/homes").unwrap();
        assert!(roles.contains(Role::Realtor));
    }

    #[test]
    fn longest_group_prefix_wins() {
        let registry = registry();

        let roles = registry
            .required_roles(&Method::GET, "/api/v1/homes/{home_id}/messages")
            .unwrap();
        assert_eq!(roles, &RoleSet::from([Role::Admin]));

        let roles = registry
            .required_roles(&Method::DELETE, "/api/v1/homes/{home_id}")
            .unwrap();
        assert_eq!(roles, &RoleSet::from([Role::Realtor, Role::Admin]));
    }

    #[test]
    fn group_prefix_matches_whole_segments_only() {
        let registry = registry();

        assert!(registry.required_roles(&Method::GET, "/api/v1/homesick").is_none());
        assert!(registry.required_roles(&Method::GET, "/api/v1/auth/me").is_none());
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let err = RoleRegistry::builder()
            .handler(Method::GET, "/a", [Role::Buyer])
            .handler(Method::GET, "/a", [Role::Admin])
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateHandler { .. }));

        let err = RoleRegistry::builder()
            .group("/a/", [Role::Buyer])
            .group("/a", [Role::Admin])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateGroup {
                prefix: "/a".to_string()
            }
        );
    }
}
