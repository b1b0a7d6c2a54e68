//! Current-principal accessor and ability gate.
//!
//! Field visibility checks run against the principal stored here at render
//! time, so changing the acting user between renders changes the output.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An authenticated user as seen by the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Principal {
    /// Create a principal without roles.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            roles: Vec::new(),
            is_admin: false,
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Mark as administrator.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Check if the principal holds a role.
    pub fn is(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

type Ability = Arc<dyn Fn(&Principal) -> bool + Send + Sync>;

/// Authorization gate with the current principal.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone, Default)]
pub struct AccessGate {
    inner: Arc<AccessGateInner>,
}

#[derive(Default)]
struct AccessGateInner {
    /// Currently authenticated principal, if any.
    current: RwLock<Option<Principal>>,

    /// Ability name -> check.
    abilities: DashMap<String, Ability>,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate as the given principal.
    pub fn acting_as(&self, principal: Principal) -> &Self {
        tracing::debug!(principal = %principal.id, "acting as principal");
        *self.inner.current.write() = Some(principal);
        self
    }

    /// Forget the current principal.
    pub fn logout(&self) {
        *self.inner.current.write() = None;
    }

    /// The current principal, if authenticated.
    pub fn user(&self) -> Option<Principal> {
        self.inner.current.read().clone()
    }

    /// Whether someone is authenticated.
    pub fn check(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Whether nobody is authenticated.
    pub fn guest(&self) -> bool {
        !self.check()
    }

    /// Check whether the current principal holds a role. Guests hold none.
    pub fn has_role(&self, role: &str) -> bool {
        self.inner
            .current
            .read()
            .as_ref()
            .is_some_and(|p| p.is(role))
    }

    /// Define an ability. Redefining replaces the previous check.
    pub fn define<F>(&self, ability: impl Into<String>, check: F)
    where
        F: Fn(&Principal) -> bool + Send + Sync + 'static,
    {
        self.inner.abilities.insert(ability.into(), Arc::new(check));
    }

    /// Check an ability for the current principal.
    ///
    /// Undefined abilities and guests are denied.
    pub fn allows(&self, ability: &str) -> bool {
        let Some(principal) = self.user() else {
            return false;
        };
        let Some(check) = self.inner.abilities.get(ability).map(|c| c.value().clone()) else {
            tracing::debug!(ability, "undefined ability denied");
            return false;
        };
        check(&principal)
    }

    pub fn denies(&self, ability: &str) -> bool {
        !self.allows(ability)
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("current", &*self.inner.current.read())
            .field("abilities", &self.inner.abilities.len())
            .finish()
    }
}

/// A visibility condition attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Visibility {
    /// Principal must hold the role.
    Role(String),
    /// Nobody may be authenticated.
    Guest,
    /// Someone must be authenticated.
    Auth,
    /// Principal must be allowed the ability.
    Can(String),
    /// Principal must not be allowed the ability.
    Cannot(String),
}

impl Visibility {
    /// Evaluate against the gate's current state.
    pub fn passes(&self, gate: &AccessGate) -> bool {
        match self {
            Visibility::Role(role) => gate.has_role(role),
            Visibility::Guest => gate.guest(),
            Visibility::Auth => gate.check(),
            Visibility::Can(ability) => gate.allows(ability),
            Visibility::Cannot(ability) => gate.denies(ability),
        }
    }
}
