use serde::{Deserialize, Serialize};

/// Role claim supplied by the identity collaborator. The engine trusts the
/// claim as given; it never re-verifies credentials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }
}

/// Authenticated caller of a state-machine operation, decoded from the
/// session token and injected into request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Ownership check used by tracking and cancellation paths.
    pub fn owns(&self, requester_id: &str) -> bool {
        self.id == requester_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Driver).unwrap();
        assert_eq!(json, "\"driver\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Driver);
    }

    #[test]
    fn ownership_matches_on_id_only() {
        let p = Principal {
            id: "user-1".into(),
            email: None,
            role: Role::Client,
        };
        assert!(p.owns("user-1"));
        assert!(!p.owns("user-2"));
        assert!(!p.is_admin());
    }
}
