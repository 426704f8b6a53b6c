// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role requirements for authorization.
//!
//! Roles are free-form strings taken from the token's `role` claim, so a
//! requirement is just the set of role names that grant access.

use super::AuthenticatedUser;

/// Access is granted when the user holds any one of these roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequirement {
    any_of: Vec<String>,
}

impl RoleRequirement {
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            any_of: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::any_of([role])
    }

    /// An empty requirement is never satisfied.
    pub fn is_satisfied_by(&self, user: &AuthenticatedUser) -> bool {
        self.any_of.iter().any(|role| user.has_role(role))
    }
}

impl std::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.any_of.join(" | "))
    }
}
