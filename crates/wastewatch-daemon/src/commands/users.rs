//! Identity registration command handlers.

use serde_json::Value;
use tracing::info;
use wastewatch_reports::ReportService;
use wastewatch_types::Identity;

use super::{str_param, Result};

/// Register the calling identity as the sole authorized user.
pub fn register_user(service: &ReportService, caller: &Identity, params: &Value) -> Result {
    let username = str_param(params, "username")?;
    let email = str_param(params, "email")?;

    info!("Registering user {username}");
    let user_id = service.register(username, email, caller)?;

    Ok(serde_json::json!({"id": user_id}))
}

/// The registered user, or `null`.
pub fn get_registered_user(service: &ReportService) -> Result {
    let user = service.registered_user()?;
    Ok(serde_json::json!(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::memory_state;

    #[tokio::test]
    async fn test_register_and_fetch() {
        let state = memory_state();
        let service = state.service.lock().await;
        let caller = Identity::new("uid:42");

        assert_eq!(get_registered_user(&service).expect("empty"), Value::Null);

        register_user(
            &service,
            &caller,
            &serde_json::json!({"username": "carol", "email": "c@x.org"}),
        )
        .expect("register");

        let user = get_registered_user(&service).expect("fetch");
        assert_eq!(user["username"], "carol");
        assert_eq!(user["identity"], "uid:42");
    }

    #[tokio::test]
    async fn test_register_requires_params() {
        let state = memory_state();
        let service = state.service.lock().await;
        let err = register_user(
            &service,
            &Identity::new("uid:42"),
            &serde_json::json!({"username": "carol"}),
        )
        .expect_err("missing email");
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_second_registration() {
        let state = memory_state();
        let service = state.service.lock().await;
        let params = serde_json::json!({"username": "carol", "email": "c@x.org"});
        register_user(&service, &Identity::new("uid:42"), &params).expect("first");

        let err = register_user(&service, &Identity::new("uid:43"), &params)
            .expect_err("second");
        assert_eq!(err.message, "ALREADY_REGISTERED");
    }
}
