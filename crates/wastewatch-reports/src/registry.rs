//! Single-identity registry.
//!
//! The users namespace holds at most one record. The first successful
//! registration fixes the identity allowed to mutate reports for the
//! lifetime of the database.

use rusqlite::Connection;
use tracing::{info, warn};
use wastewatch_db::Repository;
use wastewatch_types::{Identity, User, UserId};

use crate::effects::{Clock, IdGenerator};
use crate::error::{Result, ServiceError};

#[derive(Clone, Copy)]
pub struct IdentityRegistry {
    users: Repository<User>,
}

impl IdentityRegistry {
    pub fn new(max_record_bytes: usize) -> Self {
        Self {
            users: Repository::users(max_record_bytes),
        }
    }

    /// Record `caller` as the sole authorized identity.
    ///
    /// Fails with [`ServiceError::AlreadyRegistered`] once any user exists,
    /// whatever the arguments.
    pub fn register(
        &self,
        conn: &Connection,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
        username: &str,
        email: &str,
        caller: &Identity,
    ) -> Result<UserId> {
        if !self.users.is_empty(conn)? {
            warn!(caller = %caller, "registration rejected, a user already exists");
            return Err(ServiceError::AlreadyRegistered);
        }

        let user = User {
            id: UserId::new(ids.new_id()),
            username: username.to_string(),
            email: email.to_string(),
            identity: caller.clone(),
            created_at: clock.now(),
            updated_at: None,
        };
        self.users.insert(conn, user.id.as_str(), &user)?;

        info!(user_id = %user.id, "registered user");
        Ok(user.id)
    }

    /// True iff a user is registered and its identity equals `caller`.
    pub fn is_authorized(&self, conn: &Connection, caller: &Identity) -> Result<bool> {
        Ok(self
            .registered_user(conn)?
            .is_some_and(|user| &user.identity == caller))
    }

    /// The registered user, if any.
    pub fn registered_user(&self, conn: &Connection) -> Result<Option<User>> {
        Ok(self.users.list_all(conn)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{SystemClock, UuidGenerator};

    fn setup() -> (Connection, IdentityRegistry) {
        let conn = wastewatch_db::open_memory().expect("open test db");
        (conn, IdentityRegistry::new(1024))
    }

    #[test]
    fn test_register_once() {
        let (conn, registry) = setup();
        let owner = Identity::new("uid:1000");

        let id = registry
            .register(&conn, &SystemClock, &UuidGenerator, "alice", "a@x.org", &owner)
            .expect("register");

        let user = registry
            .registered_user(&conn)
            .expect("lookup")
            .expect("present");
        assert_eq!(user.id, id);
        assert_eq!(user.identity, owner);
        assert_eq!(user.updated_at, None);
    }

    #[test]
    fn test_second_registration_rejected() {
        let (conn, registry) = setup();
        registry
            .register(&conn, &SystemClock, &UuidGenerator, "alice", "a@x.org", &Identity::new("uid:1"))
            .expect("register");

        for caller in ["uid:1", "uid:2"] {
            let result = registry.register(
                &conn,
                &SystemClock,
                &UuidGenerator,
                "mallory",
                "m@x.org",
                &Identity::new(caller),
            );
            assert!(matches!(result, Err(ServiceError::AlreadyRegistered)));
        }
        assert_eq!(
            registry
                .registered_user(&conn)
                .expect("lookup")
                .map(|u| u.username),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_authorization_before_registration() {
        let (conn, registry) = setup();
        assert!(!registry
            .is_authorized(&conn, &Identity::new("uid:1000"))
            .expect("check"));
    }

    #[test]
    fn test_authorization_is_identity_exact() {
        let (conn, registry) = setup();
        let owner = Identity::new("uid:1000");
        registry
            .register(&conn, &SystemClock, &UuidGenerator, "alice", "a@x.org", &owner)
            .expect("register");

        assert!(registry.is_authorized(&conn, &owner).expect("owner"));
        assert!(!registry
            .is_authorized(&conn, &Identity::new("uid:1001"))
            .expect("other"));
        assert!(!registry
            .is_authorized(&conn, &Identity::new(""))
            .expect("empty"));
    }
}
