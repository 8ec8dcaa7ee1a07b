use uuid::Uuid;

use crate::models::AppRole;

use super::CurrentUser;

/// Operation being attempted against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// What the operation targets. Documents carry their creator so the
/// creator-or-privileged rule can be evaluated per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile { owner: Uuid },
    RoleAssignment,
    Warehouse,
    Category,
    Product,
    Document { created_by: Option<Uuid> },
    StockMovement,
}

/// Central authorization predicate. Every handler calls this before its
/// read or write; rules are additive per (resource, action) and a miss is
/// a deny.
///
/// Reaching this function already implies an authenticated caller, so the
/// "any authenticated" rules reduce to `true`.
pub fn is_allowed(user: &CurrentUser, action: Action, resource: Resource) -> bool {
    match resource {
        Resource::Profile { owner } => match action {
            Action::Read => true,
            // Provisioning happens through the identity-creation hook, not
            // through a direct insert by a caller.
            Action::Update => user.id == owner,
            Action::Create | Action::Delete => false,
        },
        Resource::RoleAssignment => user.is_admin(),
        Resource::Warehouse | Resource::Category => match action {
            Action::Read => true,
            _ => user.is_admin(),
        },
        Resource::Product => match action {
            Action::Read => true,
            _ => user.is_admin() || user.has_role(AppRole::Manager),
        },
        Resource::Document { created_by } => match action {
            Action::Read | Action::Create => true,
            Action::Update | Action::Delete => {
                created_by == Some(user.id)
                    || user.is_admin()
                    || user.has_role(AppRole::Manager)
            }
        },
        Resource::StockMovement => match action {
            Action::Read | Action::Create => true,
            // The ledger is append-only.
            Action::Update | Action::Delete => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: Vec<AppRole>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "t@example.com".into(),
            full_name: "Test".into(),
            roles,
        }
    }

    fn staff() -> CurrentUser {
        user_with(vec![AppRole::Staff])
    }

    fn manager() -> CurrentUser {
        user_with(vec![AppRole::Manager])
    }

    fn admin() -> CurrentUser {
        user_with(vec![AppRole::Admin])
    }

    #[test]
    fn role_assignments_are_admin_only() {
        for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
            assert!(is_allowed(&admin(), action, Resource::RoleAssignment));
            assert!(!is_allowed(&manager(), action, Resource::RoleAssignment));
            assert!(!is_allowed(&staff(), action, Resource::RoleAssignment));
        }
    }

    #[test]
    fn master_data_writes_require_admin() {
        for resource in [Resource::Warehouse, Resource::Category] {
            assert!(is_allowed(&staff(), Action::Read, resource));
            assert!(is_allowed(&manager(), Action::Read, resource));
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(is_allowed(&admin(), action, resource));
                assert!(!is_allowed(&manager(), action, resource));
                assert!(!is_allowed(&staff(), action, resource));
            }
        }
    }

    #[test]
    fn products_writable_by_admin_or_manager() {
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(is_allowed(&admin(), action, Resource::Product));
            assert!(is_allowed(&manager(), action, Resource::Product));
            assert!(!is_allowed(&staff(), action, Resource::Product));
        }
        assert!(is_allowed(&staff(), Action::Read, Resource::Product));
    }

    #[test]
    fn documents_creatable_by_anyone_authenticated() {
        let doc = Resource::Document { created_by: None };
        assert!(is_allowed(&staff(), Action::Create, doc));
        assert!(is_allowed(&staff(), Action::Read, doc));
    }

    #[test]
    fn document_update_limited_to_creator_or_privileged() {
        let creator = staff();
        let other = staff();
        let doc = Resource::Document {
            created_by: Some(creator.id),
        };

        assert!(is_allowed(&creator, Action::Update, doc));
        assert!(!is_allowed(&other, Action::Update, doc));
        assert!(is_allowed(&manager(), Action::Update, doc));
        assert!(is_allowed(&admin(), Action::Update, doc));
        assert!(!is_allowed(&other, Action::Delete, doc));
    }

    #[test]
    fn orphaned_document_still_editable_by_privileged_roles() {
        // created_by goes NULL when the creator identity is deleted
        let doc = Resource::Document { created_by: None };
        assert!(!is_allowed(&staff(), Action::Update, doc));
        assert!(is_allowed(&manager(), Action::Update, doc));
        assert!(is_allowed(&admin(), Action::Delete, doc));
    }

    #[test]
    fn ledger_is_append_only_for_everyone() {
        assert!(is_allowed(&staff(), Action::Create, Resource::StockMovement));
        assert!(is_allowed(&staff(), Action::Read, Resource::StockMovement));
        for user in [staff(), manager(), admin()] {
            assert!(!is_allowed(&user, Action::Update, Resource::StockMovement));
            assert!(!is_allowed(&user, Action::Delete, Resource::StockMovement));
        }
    }

    #[test]
    fn profile_updatable_by_owner_only() {
        let owner = staff();
        let resource = Resource::Profile { owner: owner.id };
        assert!(is_allowed(&owner, Action::Update, resource));
        assert!(!is_allowed(&admin(), Action::Update, resource));
        assert!(is_allowed(&admin(), Action::Read, resource));
        assert!(!is_allowed(&owner, Action::Delete, resource));
    }

    #[test]
    fn multiple_roles_are_additive() {
        let user = user_with(vec![AppRole::Staff, AppRole::Manager]);
        assert!(is_allowed(&user, Action::Update, Resource::Product));
        assert!(!is_allowed(&user, Action::Update, Resource::Warehouse));
    }
}
