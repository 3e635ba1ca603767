use std::sync::Arc;

use cascade_sdk::{Actor, CascadeResult, Directory, Subject};

/// Orders the subjects whose settings apply to an actor.
///
/// Organizations come first, ascending by id, and the user's own subject is
/// always last so it takes precedence over every organization.
#[derive(Clone)]
pub struct SubjectResolver {
    directory: Arc<dyn Directory>,
}

impl std::fmt::Debug for SubjectResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectResolver").finish_non_exhaustive()
    }
}

impl SubjectResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, actor: &Actor) -> CascadeResult<Vec<Subject>> {
        let Some(user) = actor.user_id() else {
            return Ok(Vec::new());
        };

        let mut orgs = self.directory.orgs_of(user).await?;
        // Org precedence follows id order, never directory order.
        orgs.sort();

        let mut subjects: Vec<Subject> = orgs.into_iter().map(Subject::Organization).collect();
        subjects.push(Subject::User(user));
        Ok(subjects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryDirectory;
    use async_trait::async_trait;
    use cascade_sdk::{CascadeError, OrgId, UserId};

    struct DownDirectory;

    struct FixedDirectory(Vec<OrgId>);

    #[async_trait]
    impl Directory for FixedDirectory {
        async fn orgs_of(&self, _user: UserId) -> CascadeResult<Vec<OrgId>> {
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl Directory for DownDirectory {
        async fn orgs_of(&self, _user: UserId) -> CascadeResult<Vec<OrgId>> {
            Err(CascadeError::directory_unavailable("ldap timeout"))
        }
    }

    #[tokio::test]
    async fn orgs_sorted_ascending_then_user() {
        let directory = MemoryDirectory::new();
        for org in [5, 2, 9] {
            directory.add_member(UserId(1), OrgId(org)).await;
        }
        let resolver = SubjectResolver::new(Arc::new(directory));

        let subjects = resolver.resolve(&Actor::user(UserId(1))).await.unwrap();
        assert_eq!(
            subjects,
            vec![
                Subject::Organization(OrgId(2)),
                Subject::Organization(OrgId(5)),
                Subject::Organization(OrgId(9)),
                Subject::User(UserId(1)),
            ]
        );
    }

    #[tokio::test]
    async fn directory_order_is_ignored() {
        let resolver =
            SubjectResolver::new(Arc::new(FixedDirectory(vec![OrgId(9), OrgId(-1), OrgId(4)])));
        let subjects = resolver.resolve(&Actor::user(UserId(2))).await.unwrap();
        assert_eq!(
            subjects,
            vec![
                Subject::Organization(OrgId(-1)),
                Subject::Organization(OrgId(4)),
                Subject::Organization(OrgId(9)),
                Subject::User(UserId(2)),
            ]
        );
    }

    #[tokio::test]
    async fn user_is_last_even_with_smaller_id() {
        let directory = MemoryDirectory::new();
        directory.add_member(UserId(100), OrgId(1000)).await;
        let resolver = SubjectResolver::new(Arc::new(directory));

        let subjects = resolver.resolve(&Actor::user(UserId(100))).await.unwrap();
        assert_eq!(subjects.last(), Some(&Subject::User(UserId(100))));
    }

    #[tokio::test]
    async fn user_without_orgs() {
        let resolver = SubjectResolver::new(Arc::new(MemoryDirectory::new()));
        let subjects = resolver.resolve(&Actor::user(UserId(3))).await.unwrap();
        assert_eq!(subjects, vec![Subject::User(UserId(3))]);
    }

    #[tokio::test]
    async fn anonymous_actor_has_no_subjects() {
        let resolver = SubjectResolver::new(Arc::new(DownDirectory));
        let subjects = resolver.resolve(&Actor::anonymous()).await.unwrap();
        assert!(subjects.is_empty());
    }

    #[tokio::test]
    async fn directory_failure_propagates() {
        let resolver = SubjectResolver::new(Arc::new(DownDirectory));
        let err = resolver.resolve(&Actor::user(UserId(1))).await.unwrap_err();
        assert!(matches!(err, CascadeError::DirectoryUnavailable(_)));
    }
}
