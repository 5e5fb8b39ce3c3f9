//! Employee model and roster.
//!
//! This module defines the [`Employee`] reference record and the [`Roster`]
//! that the builder uses to resolve employee identifiers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents an employee on the cross-border payroll.
///
/// Employees are immutable reference data: created once by the roster
/// provider and looked up by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Personal number in `DDMMYYYY-NNNC` form (e.g. "01012020-123X").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Bank account details (IBAN and BIC).
    pub bank_details: String,
}

impl Employee {
    /// Returns the first and last word of the display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    ///
    /// let employee = Employee {
    ///     id: "01012020-123X".to_string(),
    ///     name: "Sam Q. Sample".to_string(),
    ///     address: "Mechelininkatu 10, 00100 Helsinki".to_string(),
    ///     bank_details: "IBAN: FI12 3456 7890 1234 56".to_string(),
    /// };
    /// assert_eq!(employee.short_name(), "Sam Sample");
    /// ```
    pub fn short_name(&self) -> String {
        let mut parts = self.name.split_whitespace();
        match (parts.next(), parts.next_back()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => self.name.trim().to_string(),
        }
    }
}

/// Checks that an identifier has the `DDMMYYYY-NNNC` personal-number shape.
///
/// Eight digits, a hyphen, three digits and one alphanumeric check
/// character. The check character itself is not verified.
///
/// # Examples
///
/// ```
/// use payroll_engine::models::validate_personal_number;
///
/// assert!(validate_personal_number("15031985-456Y").is_ok());
/// assert!(validate_personal_number("1503198-456Y").is_err());
/// ```
pub fn validate_personal_number(id: &str) -> EngineResult<()> {
    let bytes = id.as_bytes();
    let well_formed = bytes.len() == 13
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'-'
        && bytes[9..12].iter().all(u8::is_ascii_digit)
        && bytes[12].is_ascii_alphanumeric();

    if well_formed {
        Ok(())
    } else {
        Err(EngineError::invalid_input(
            "employee.id",
            format!("'{}' is not a personal number of the form DDMMYYYY-NNNC", id),
        ))
    }
}

/// The set of employees known to the engine, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: HashMap<String, Employee>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from a list of employees, validating every identifier.
    ///
    /// Duplicate identifiers are rejected.
    pub fn from_employees(employees: impl IntoIterator<Item = Employee>) -> EngineResult<Self> {
        let mut roster = Self::new();
        for employee in employees {
            roster.insert(employee)?;
        }
        Ok(roster)
    }

    /// Adds an employee to the roster.
    pub fn insert(&mut self, employee: Employee) -> EngineResult<()> {
        validate_personal_number(&employee.id)?;
        if self.employees.contains_key(&employee.id) {
            return Err(EngineError::invalid_input(
                "employee.id",
                format!("duplicate employee identifier '{}'", employee.id),
            ));
        }
        self.employees.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Looks up an employee by identifier.
    pub fn get(&self, employee_id: &str) -> EngineResult<&Employee> {
        self.employees
            .get(employee_id)
            .ok_or_else(|| EngineError::UnknownEmployee {
                employee_id: employee_id.to_string(),
            })
    }

    /// Number of employees on the roster.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if the roster has no employees.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Iterates over the employees in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }
}
