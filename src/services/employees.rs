//! Employee directory: registration, edits and activation.
//!
//! Employees are never deleted. Deactivation blocks new check-ins but keeps
//! every historical row.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::validate_amount;
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Employee, Role};
use crate::store::RecordStore;

/// Input for registering an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Full name; must not be blank.
    pub full_name: String,
    /// Contact email; must look like `local@domain`.
    pub email: String,
    /// Business code; must not be blank.
    pub employee_code: String,
    /// Access role. Defaults to `employee`.
    #[serde(default = "default_role")]
    pub role: Role,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Monthly base salary. Defaults to zero.
    #[serde(default)]
    pub base_salary: Decimal,
}

fn default_role() -> Role {
    Role::Employee
}

/// Fields an administrator may change. An absent field keeps its current
/// value; a blank string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    /// New department.
    #[serde(default)]
    pub department: Option<String>,
    /// New job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// New base salary.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
}

/// Fields an employee may change on their own profile.
///
/// Optional fields follow [`EmployeeUpdate`]: absent keeps, blank clears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Full name; must not be blank.
    pub full_name: String,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Trims an optional text field, mapping blank to `None`.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(field: &str, value: &str) -> EngineResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(value.to_string())
}

/// Resolves an edit of an optional text field against its stored value.
fn merge(current: Option<String>, update: Option<String>) -> Option<String> {
    match update {
        Some(value) => clean(Some(value)),
        None => current,
    }
}

fn validate_email(email: &str) -> EngineResult<String> {
    let email = required("email", email)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::validation(
            "email",
            format!("'{}' is not a valid email address", email),
        ));
    }
    Ok(email)
}

/// Manages employee profiles.
/// Registers employees and maintains their profiles.
pub struct EmployeeDirectory {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl EmployeeDirectory {
    /// Creates a directory over `store`.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Registers a new, active employee.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is an administrator
    /// - `Validation` for a blank name or code, a malformed email or a
    ///   negative salary
    /// - `Storage(Constraint)` when the email or code is already taken
    pub async fn register(&self, actor: &Actor, new: NewEmployee) -> EngineResult<Employee> {
        actor.require_admin("register employees")?;

        let full_name = required("full_name", &new.full_name)?;
        let email = validate_email(&new.email)?;
        let employee_code = required("employee_code", &new.employee_code)?;
        validate_amount("base_salary", new.base_salary)?;

        let employee = self
            .store
            .insert_employee(Employee {
                id: Uuid::new_v4(),
                full_name,
                email,
                employee_code,
                role: new.role,
                department: clean(new.department),
                designation: clean(new.designation),
                phone_number: clean(new.phone_number),
                base_salary: new.base_salary,
                is_active: true,
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            employee_id = %employee.id,
            employee_code = %employee.employee_code,
            role = %employee.role,
            "Employee registered"
        );
        Ok(employee)
    }

    /// Applies an administrator's edit.
    pub async fn update(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        update: EmployeeUpdate,
    ) -> EngineResult<Employee> {
        actor.require_admin("edit employees")?;
        if let Some(salary) = update.base_salary {
            validate_amount("base_salary", salary)?;
        }

        let current = self.load(employee_id).await?;
        let employee = self
            .store
            .update_employee(Employee {
                department: merge(current.department.clone(), update.department),
                designation: merge(current.designation.clone(), update.designation),
                phone_number: merge(current.phone_number.clone(), update.phone_number),
                base_salary: update.base_salary.unwrap_or(current.base_salary),
                ..current
            })
            .await?;

        info!(employee_id = %employee_id, "Employee updated");
        Ok(employee)
    }

    /// Applies the caller's own profile edit.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        update: ProfileUpdate,
    ) -> EngineResult<Employee> {
        actor.require_self(employee_id, "edit another employee's profile")?;
        let full_name = required("full_name", &update.full_name)?;

        let current = self.load(employee_id).await?;
        let employee = self
            .store
            .update_employee(Employee {
                full_name,
                department: merge(current.department.clone(), update.department),
                designation: merge(current.designation.clone(), update.designation),
                phone_number: merge(current.phone_number.clone(), update.phone_number),
                ..current
            })
            .await?;

        info!(employee_id = %employee_id, "Profile updated");
        Ok(employee)
    }

    /// Activates or deactivates an employee.
    pub async fn set_active(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        active: bool,
    ) -> EngineResult<Employee> {
        actor.require_admin("change employee status")?;

        let current = self.load(employee_id).await?;
        if current.is_active == active {
            return Ok(current);
        }
        let employee = self
            .store
            .update_employee(Employee {
                is_active: active,
                ..current
            })
            .await?;

        info!(employee_id = %employee_id, active, "Employee status changed");
        Ok(employee)
    }

    /// Fetches a profile.
    pub async fn get(&self, actor: &Actor, employee_id: Uuid) -> EngineResult<Employee> {
        actor.require_self_or_admin(employee_id, "view another employee's profile")?;
        self.load(employee_id).await
    }

    /// Lists every employee. Administrators only.
    pub async fn list(&self, actor: &Actor) -> EngineResult<Vec<Employee>> {
        actor.require_admin("list employees")?;
        Ok(self.store.list_employees().await?)
    }

    async fn load(&self, employee_id: Uuid) -> EngineResult<Employee> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or(EngineError::EmployeeNotFound { id: employee_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn admin() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    fn directory() -> EmployeeDirectory {
        EmployeeDirectory::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    fn new_employee(code: &str, email: &str) -> NewEmployee {
        NewEmployee {
            full_name: "  Nisha Rao ".to_string(),
            email: email.to_string(),
            employee_code: code.to_string(),
            role: Role::Employee,
            department: Some("  ".to_string()),
            designation: Some(" Analyst ".to_string()),
            phone_number: None,
            base_salary: dec("38000"),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("nisha@example.com").is_ok());
        assert!(validate_email("nisha@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("nisha@@example.com").is_err());
        assert!(validate_email("   ").is_err());
    }

    #[tokio::test]
    async fn test_register_trims_and_activates() {
        let directory = directory();
        let employee = directory
            .register(&admin(), new_employee("EMP-100", "nisha@example.com"))
            .await
            .unwrap();

        assert_eq!(employee.full_name, "Nisha Rao");
        assert_eq!(employee.department, None);
        assert_eq!(employee.designation.as_deref(), Some("Analyst"));
        assert!(employee.is_active);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_as_conflict() {
        let directory = directory();
        directory
            .register(&admin(), new_employee("EMP-100", "nisha@example.com"))
            .await
            .unwrap();

        let result = directory
            .register(&admin(), new_employee("EMP-101", "NISHA@example.com"))
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_register_requires_admin() {
        let directory = directory();
        let employee = Actor {
            id: Uuid::new_v4(),
            role: Role::Employee,
        };
        let result = directory
            .register(&employee, new_employee("EMP-100", "nisha@example.com"))
            .await;
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_register_rejects_negative_salary() {
        let directory = directory();
        let mut input = new_employee("EMP-100", "nisha@example.com");
        input.base_salary = dec("-1");
        let result = directory.register(&admin(), input).await;
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_admin_update_keeps_salary_when_absent() {
        let directory = directory();
        let admin = admin();
        let employee = directory
            .register(&admin, new_employee("EMP-100", "nisha@example.com"))
            .await
            .unwrap();

        let updated = directory
            .update(
                &admin,
                employee.id,
                EmployeeUpdate {
                    department: Some("Finance".to_string()),
                    designation: Some("  ".to_string()),
                    phone_number: Some(" 555-0101 ".to_string()),
                    base_salary: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.department.as_deref(), Some("Finance"));
        assert_eq!(updated.designation, None);
        assert_eq!(updated.phone_number.as_deref(), Some("555-0101"));
        assert_eq!(updated.base_salary, dec("38000"));
    }

    #[tokio::test]
    async fn test_admin_salary_update_keeps_other_fields() {
        let directory = directory();
        let admin = admin();
        let mut input = new_employee("EMP-100", "nisha@example.com");
        input.department = Some("Finance".to_string());
        input.phone_number = Some("555-0101".to_string());
        let employee = directory.register(&admin, input).await.unwrap();

        let update: EmployeeUpdate = serde_json::from_str(r#"{"base_salary": "40000"}"#).unwrap();
        let updated = directory.update(&admin, employee.id, update).await.unwrap();

        assert_eq!(updated.base_salary, dec("40000"));
        assert_eq!(updated.department.as_deref(), Some("Finance"));
        assert_eq!(updated.designation.as_deref(), Some("Analyst"));
        assert_eq!(updated.phone_number.as_deref(), Some("555-0101"));
    }

    #[tokio::test]
    async fn test_profile_update_is_self_only_and_requires_name() {
        let directory = directory();
        let employee = directory
            .register(&admin(), new_employee("EMP-100", "nisha@example.com"))
            .await
            .unwrap();
        let actor = employee.as_actor();

        let blank = directory
            .update_profile(
                &actor,
                employee.id,
                ProfileUpdate {
                    full_name: " ".to_string(),
                    department: None,
                    designation: None,
                    phone_number: None,
                },
            )
            .await;
        assert!(matches!(blank, Err(EngineError::Validation { .. })));

        let updated = directory
            .update_profile(
                &actor,
                employee.id,
                ProfileUpdate {
                    full_name: "Nisha R. Rao".to_string(),
                    department: Some("Research".to_string()),
                    designation: None,
                    phone_number: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Nisha R. Rao");
        assert_eq!(updated.department.as_deref(), Some("Research"));
        assert_eq!(updated.designation.as_deref(), Some("Analyst"));
        assert_eq!(updated.base_salary, dec("38000"));

        let other = directory
            .update_profile(
                &admin(),
                employee.id,
                ProfileUpdate {
                    full_name: "Someone".to_string(),
                    department: None,
                    designation: None,
                    phone_number: None,
                },
            )
            .await;
        assert!(matches!(other, Err(EngineError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_set_active_toggles() {
        let directory = directory();
        let admin = admin();
        let employee = directory
            .register(&admin, new_employee("EMP-100", "nisha@example.com"))
            .await
            .unwrap();

        let inactive = directory.set_active(&admin, employee.id, false).await.unwrap();
        assert!(!inactive.is_active);
        let active = directory.set_active(&admin, employee.id, true).await.unwrap();
        assert!(active.is_active);
    }

    #[tokio::test]
    async fn test_get_unknown_employee_is_not_found() {
        let result = directory().get(&admin(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(EngineError::EmployeeNotFound { .. })));
    }
}
