use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::SchedulingError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    /// Normalized, digits only. Unique across customers.
    pub phone: String,
    pub email: Option<String>,
    pub total_appointments: u32,
    pub created_at: DateTime<Utc>,
}

/// A customer to create when none exists for `phone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, id: Uuid, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            total_appointments: 0,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveCustomerRequest {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
}

/// Canonical phone form: ASCII digits only, so "+1 (555) 010-2030" and
/// "15550102030" name the same customer.
pub fn normalize_phone(raw: &str) -> Result<String, SchedulingError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(SchedulingError::validation(format!("Phone number '{}' has no digits", raw)));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_from_phone_numbers() {
        assert_eq!(normalize_phone("+1 (555) 010-2030").unwrap(), "15550102030");
        assert_eq!(normalize_phone("555.010.2030").unwrap(), "5550102030");
        assert_eq!(normalize_phone("5550102030").unwrap(), "5550102030");
    }

    #[test]
    fn phone_without_digits_is_invalid() {
        assert!(matches!(normalize_phone(" - "), Err(SchedulingError::ValidationError(_))));
        assert!(matches!(normalize_phone(""), Err(SchedulingError::ValidationError(_))));
    }
}
