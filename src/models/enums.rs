use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Account role, fixed at registration. Gates which endpoints a session
/// may call: `lab` mutates records and sends reports, `doctor` reads
/// their inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Lab,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lab => "lab",
            Self::Doctor => "doctor",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab" => Ok(Self::Lab),
            "doctor" => Ok(Self::Doctor),
            _ => Err(DatabaseError::InvalidEnum {
                field: "Role".into(),
                value: s.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Lab, Role::Doctor] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(Role::from_str("admin").is_err());
    }
}
