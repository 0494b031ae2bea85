//! Employee model and the caller identity passed into every operation.
//!
//! This module defines the [`Employee`] record, the [`Role`] enum and the
//! [`Actor`] value object that replaces any ambient "current user" state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The access role of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee; acts on their own records only.
    Employee,
    /// Administrator; approves leave and manages payroll.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Employee => write!(f, "employee"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            other => Err(EngineError::validation(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Represents an employee profile.
///
/// Employees are never hard-deleted; they are deactivated through the
/// `is_active` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The employee's full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Business employee code (e.g. "EMP-0042").
    pub employee_code: String,
    /// Access role.
    pub role: Role,
    /// Department, if assigned.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title, if assigned.
    #[serde(default)]
    pub designation: Option<String>,
    /// Phone number, if provided.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Monthly base salary used as the default payroll basic.
    pub base_salary: Decimal,
    /// Whether the employee is active.
    pub is_active: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Returns true if the employee has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns the identity value for acting as this employee.
    pub fn as_actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// The authenticated identity on whose behalf an operation runs.
///
/// Supplied explicitly by the caller for every operation.
///
/// # Example
///
/// ```
/// use hr_engine::models::{Actor, Role};
/// use uuid::Uuid;
///
/// let admin = Actor { id: Uuid::new_v4(), role: Role::Admin };
/// assert!(admin.require_admin("approve leave").is_ok());
///
/// let employee = Actor { id: Uuid::new_v4(), role: Role::Employee };
/// assert!(employee.require_admin("approve leave").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's employee id.
    pub id: Uuid,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Returns true if the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Forbidden` unless the caller is an administrator.
    pub fn require_admin(&self, action: &str) -> EngineResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                action: action.to_string(),
            })
        }
    }

    /// Fails with `Forbidden` unless the caller is the employee or an administrator.
    pub fn require_self_or_admin(&self, employee_id: Uuid, action: &str) -> EngineResult<()> {
        if self.id == employee_id || self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                action: action.to_string(),
            })
        }
    }

    /// Fails with `Forbidden` unless the caller is the employee.
    pub fn require_self(&self, employee_id: Uuid, action: &str) -> EngineResult<()> {
        if self.id == employee_id {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee(role: Role) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            full_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            employee_code: "EMP-001".to_string(),
            role,
            department: Some("Engineering".to_string()),
            designation: None,
            phone_number: None,
            base_salary: Decimal::new(50000, 0),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_deserialize_employee_defaults_optional_fields() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "full_name": "Ravi Kumar",
            "email": "ravi@example.com",
            "employee_code": "EMP-002",
            "role": "employee",
            "base_salary": "42000.50",
            "is_active": true,
            "created_at": "2024-01-01T09:00:00Z"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.role, Role::Employee);
        assert_eq!(employee.base_salary, Decimal::new(4200050, 2));
        assert!(employee.department.is_none());
        assert!(employee.phone_number.is_none());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::Employee).unwrap(),
            "\"employee\""
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_as_actor_carries_role() {
        let admin = create_test_employee(Role::Admin);
        let actor = admin.as_actor();
        assert_eq!(actor.id, admin.id);
        assert!(actor.is_admin());
        assert!(admin.is_admin());
    }

    #[test]
    fn test_require_self_or_admin() {
        let employee = create_test_employee(Role::Employee);
        let actor = employee.as_actor();
        let someone_else = Uuid::new_v4();

        assert!(actor.require_self_or_admin(employee.id, "view").is_ok());
        assert!(matches!(
            actor.require_self_or_admin(someone_else, "view"),
            Err(EngineError::Forbidden { .. })
        ));

        let admin = create_test_employee(Role::Admin).as_actor();
        assert!(admin.require_self_or_admin(someone_else, "view").is_ok());
        assert!(admin.require_self(someone_else, "check in").is_err());
    }
}
