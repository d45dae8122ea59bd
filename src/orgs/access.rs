//! Role-based access control for organizations.
//!
//! A fixed capability statement (resource, action) is evaluated against a
//! closed role set. Each role's grant set is enumerated independently; there
//! is no structural hierarchy between roles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role of a member within one organization.
///
/// Stored as a string; parsing rejects anything outside the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
    Owner,
}

impl Role {
    /// String form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Parses the storage string form.
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// The grant set for this role.
    pub fn permissions(self) -> PermissionSet {
        match self {
            Self::Member => PermissionSetBuilder::new()
                .grant(Resource::Organization, Action::Read)
                .grant(Resource::Member, Action::Read)
                .grant(Resource::Project, Action::Create)
                .grant(Resource::Project, Action::Read)
                .build(),
            Self::Admin => PermissionSetBuilder::new()
                .grant(Resource::Organization, Action::Read)
                .grant(Resource::Organization, Action::Update)
                .grant(Resource::Organization, Action::InviteMember)
                .grant(Resource::Organization, Action::RemoveMember)
                .grant(Resource::Member, Action::Read)
                .grant(Resource::Member, Action::Invite)
                .grant(Resource::Member, Action::Remove)
                .grant(Resource::Project, Action::Create)
                .grant(Resource::Project, Action::Read)
                .grant(Resource::Project, Action::Update)
                .grant(Resource::Project, Action::Delete)
                .build(),
            Self::Owner => PermissionSetBuilder::new()
                .grant(Resource::Organization, Action::Create)
                .grant(Resource::Organization, Action::Read)
                .grant(Resource::Organization, Action::Update)
                .grant(Resource::Organization, Action::Delete)
                .grant(Resource::Organization, Action::InviteMember)
                .grant(Resource::Organization, Action::RemoveMember)
                .grant(Resource::Member, Action::Read)
                .grant(Resource::Member, Action::Invite)
                .grant(Resource::Member, Action::Remove)
                .grant(Resource::Project, Action::Create)
                .grant(Resource::Project, Action::Read)
                .grant(Resource::Project, Action::Update)
                .grant(Resource::Project, Action::Delete)
                .build(),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

/// A protected resource in the capability statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Organization,
    Member,
    Project,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Member => "member",
            Self::Project => "project",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organization" => Some(Self::Organization),
            "member" => Some(Self::Member),
            "project" => Some(Self::Project),
            _ => None,
        }
    }
}

/// An action on a resource.
///
/// `InviteMember`/`RemoveMember` belong to the organization resource;
/// `Invite`/`Remove` to the member resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    InviteMember,
    RemoveMember,
    Invite,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::InviteMember => "invite_member",
            Self::RemoveMember => "remove_member",
            Self::Invite => "invite",
            Self::Remove => "remove",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "invite_member" => Some(Self::InviteMember),
            "remove_member" => Some(Self::RemoveMember),
            "invite" => Some(Self::Invite),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// A set of granted (resource, action) pairs.
///
/// Stored as a map of resources to their allowed actions for efficient
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    grants: HashMap<Resource, Vec<Action>>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants an action on a resource.
    pub fn grant(&mut self, resource: Resource, action: Action) {
        let actions = self.grants.entry(resource).or_default();
        if !actions.contains(&action) {
            actions.push(action);
        }
    }

    /// Whether the set grants the action on the resource.
    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.grants
            .get(&resource)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Actions granted on a resource.
    pub fn actions_for(&self, resource: Resource) -> Option<&[Action]> {
        self.grants.get(&resource).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Builder for permission sets with a fluent API.
#[must_use]
#[derive(Default)]
pub struct PermissionSetBuilder {
    set: PermissionSet,
}

impl PermissionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, resource: Resource, action: Action) -> Self {
        self.set.grant(resource, action);
        self
    }

    pub fn build(self) -> PermissionSet {
        self.set
    }
}

/// Whether `role` is granted `action` on `resource`.
pub fn evaluate(role: Role, resource: Resource, action: Action) -> bool {
    role.permissions().can(resource, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Member, Role::Admin, Role::Owner] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Owner"), None, "parsing is case-sensitive");
    }

    #[test]
    fn test_member_grants() {
        let role = Role::Member;
        assert!(evaluate(role, Resource::Organization, Action::Read));
        assert!(evaluate(role, Resource::Member, Action::Read));
        assert!(evaluate(role, Resource::Project, Action::Create));
        assert!(evaluate(role, Resource::Project, Action::Read));

        assert!(!evaluate(role, Resource::Organization, Action::Update));
        assert!(!evaluate(role, Resource::Organization, Action::InviteMember));
        assert!(!evaluate(role, Resource::Member, Action::Invite));
        assert!(!evaluate(role, Resource::Project, Action::Update));
        assert!(!evaluate(role, Resource::Project, Action::Delete));
    }

    #[test]
    fn test_admin_grants() {
        let role = Role::Admin;
        assert!(evaluate(role, Resource::Organization, Action::Read));
        assert!(evaluate(role, Resource::Organization, Action::Update));
        assert!(evaluate(role, Resource::Organization, Action::InviteMember));
        assert!(evaluate(role, Resource::Organization, Action::RemoveMember));
        assert!(evaluate(role, Resource::Member, Action::Invite));
        assert!(evaluate(role, Resource::Member, Action::Remove));
        assert!(evaluate(role, Resource::Project, Action::Delete));

        assert!(!evaluate(role, Resource::Organization, Action::Create));
        assert!(!evaluate(role, Resource::Organization, Action::Delete));
    }

    #[test]
    fn test_owner_grants() {
        let role = Role::Owner;
        assert!(evaluate(role, Resource::Organization, Action::Create));
        assert!(evaluate(role, Resource::Organization, Action::Delete));
        assert!(evaluate(role, Resource::Organization, Action::Update));
        assert!(evaluate(role, Resource::Organization, Action::InviteMember));
        assert!(evaluate(role, Resource::Member, Action::Remove));
        assert!(evaluate(role, Resource::Project, Action::Delete));
    }

    #[test]
    fn test_admin_and_owner_differ_only_in_org_create_delete() {
        let pairs = [
            (Resource::Organization, Action::Create),
            (Resource::Organization, Action::Read),
            (Resource::Organization, Action::Update),
            (Resource::Organization, Action::Delete),
            (Resource::Organization, Action::InviteMember),
            (Resource::Organization, Action::RemoveMember),
            (Resource::Member, Action::Read),
            (Resource::Member, Action::Invite),
            (Resource::Member, Action::Remove),
            (Resource::Project, Action::Create),
            (Resource::Project, Action::Read),
            (Resource::Project, Action::Update),
            (Resource::Project, Action::Delete),
        ];

        for (resource, action) in pairs {
            let admin = evaluate(Role::Admin, resource, action);
            let owner = evaluate(Role::Owner, resource, action);
            let differs = resource == Resource::Organization
                && matches!(action, Action::Create | Action::Delete);
            if differs {
                assert!(!admin, "{}.{}", resource.as_str(), action.as_str());
                assert!(owner, "{}.{}", resource.as_str(), action.as_str());
            } else {
                assert_eq!(admin, owner, "{}.{}", resource.as_str(), action.as_str());
            }
        }
    }

    #[test]
    fn test_permission_set_dedup() {
        let mut set = PermissionSet::new();
        set.grant(Resource::Project, Action::Read);
        set.grant(Resource::Project, Action::Read);
        assert_eq!(set.actions_for(Resource::Project), Some(&[Action::Read][..]));
    }

    #[test]
    fn test_empty_set_denies() {
        let set = PermissionSet::new();
        assert!(set.is_empty());
        assert!(!set.can(Resource::Organization, Action::Read));
    }
}
