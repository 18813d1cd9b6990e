use serde::{Deserialize, Serialize};

/// Access level sent with every query. The orchestrator uses it to decide
/// how much sensitive policy detail to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Normal,
    Super,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Normal => "normal",
            UserRole::Super => "super",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(UserRole::Normal),
            "super" => Some(UserRole::Super),
            _ => None,
        }
    }

    pub fn all() -> Vec<UserRole> {
        vec![UserRole::Normal, UserRole::Super]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Normal => "Normal",
            UserRole::Super => "Super",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            UserRole::Normal => "sensitive data is filtered",
            UserRole::Super => "full access",
        }
    }

    /// The other role; the selector only ever has two options.
    pub fn toggled(&self) -> Self {
        match self {
            UserRole::Normal => UserRole::Super,
            UserRole::Super => UserRole::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        assert_eq!(UserRole::default(), UserRole::Normal);
    }

    #[test]
    fn test_from_str_accepts_any_case() {
        assert_eq!(UserRole::from_str("SUPER"), Some(UserRole::Super));
        assert_eq!(UserRole::from_str(" normal "), Some(UserRole::Normal));
        assert_eq!(UserRole::from_str("admin"), None);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Super).unwrap(), "\"super\"");
        let role: UserRole = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(role, UserRole::Normal);
    }

    #[test]
    fn test_toggled_flips_between_options() {
        assert_eq!(UserRole::Normal.toggled(), UserRole::Super);
        assert_eq!(UserRole::Super.toggled(), UserRole::Normal);
    }
}
