//! Delivery form and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum number of digits in a phone number.
pub const DEFAULT_PHONE_MIN_LENGTH: usize = 10;

/// Tunable validation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub phone_min_length: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            phone_min_length: DEFAULT_PHONE_MIN_LENGTH,
        }
    }
}

/// Which part of the form a validation error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    Name,
    Phone,
    Address,
    District,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Name => "name",
            FieldCategory::Phone => "phone",
            FieldCategory::Address => "address",
            FieldCategory::District => "district",
        }
    }
}

/// The first problem found in a delivery form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your full name")]
    MissingName,

    #[error("Please enter your phone number")]
    MissingPhone,

    #[error("Phone number must have at least {min} digits")]
    PhoneTooShort { min: usize },

    #[error("Please enter your delivery address")]
    MissingAddress,

    #[error("Please select a district")]
    MissingDistrict,
}

impl ValidationError {
    pub fn field(&self) -> FieldCategory {
        match self {
            ValidationError::MissingName => FieldCategory::Name,
            ValidationError::MissingPhone | ValidationError::PhoneTooShort { .. } => {
                FieldCategory::Phone
            }
            ValidationError::MissingAddress => FieldCategory::Address,
            ValidationError::MissingDistrict => FieldCategory::District,
        }
    }
}

/// Delivery details as typed by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    pub district: String,
    #[serde(default)]
    pub notes: String,
}

impl OrderForm {
    /// Check the form field by field (name, phone, address, district)
    /// and return the cleaned delivery details, or the first error.
    pub fn validate(&self, rules: &ValidationRules) -> Result<DeliveryInfo, ValidationError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        if phone_digits(phone) < rules.phone_min_length {
            return Err(ValidationError::PhoneTooShort {
                min: rules.phone_min_length,
            });
        }

        let address = self.address.trim();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }

        let district = self.district.trim();
        if district.is_empty() {
            return Err(ValidationError::MissingDistrict);
        }

        Ok(DeliveryInfo {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            city: non_empty(&self.city),
            district: district.to_string(),
            notes: non_empty(&self.notes),
        })
    }
}

/// Validated delivery details, ready to go into an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeliveryInfo {
    /// Address, district and city on one line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address.as_str(), self.district.as_str()];
        if let Some(ref city) = self.city {
            parts.push(city);
        }
        parts.join(", ")
    }
}

fn phone_digits(phone: &str) -> usize {
    phone.chars().filter(char::is_ascii_digit).count()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> OrderForm {
        OrderForm {
            full_name: "Nguyen Van A".to_string(),
            phone: "0901 234 567".to_string(),
            address: "12 Ly Thuong Kiet".to_string(),
            city: "Ha Noi".to_string(),
            district: "Hoan Kiem".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let info = valid_form().validate(&ValidationRules::default()).unwrap();
        assert_eq!(info.full_name, "Nguyen Van A");
        assert_eq!(info.city.as_deref(), Some("Ha Noi"));
        assert!(info.notes.is_none());
        assert_eq!(info.one_line(), "12 Ly Thuong Kiet, Hoan Kiem, Ha Noi");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let form = OrderForm {
            full_name: "  Tran B  ".to_string(),
            notes: "  leave at door ".to_string(),
            ..valid_form()
        };
        let info = form.validate(&ValidationRules::default()).unwrap();
        assert_eq!(info.full_name, "Tran B");
        assert_eq!(info.notes.as_deref(), Some("leave at door"));
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let form = OrderForm {
            full_name: "   ".to_string(),
            ..valid_form()
        };
        let err = form.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingName);
        assert_eq!(err.field(), FieldCategory::Name);
    }

    #[test]
    fn test_short_phone() {
        let form = OrderForm {
            phone: "123".to_string(),
            ..valid_form()
        };
        let err = form.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(err, ValidationError::PhoneTooShort { min: 10 });
        assert_eq!(err.field(), FieldCategory::Phone);
    }

    #[test]
    fn test_phone_threshold_is_configurable() {
        let form = OrderForm {
            phone: "12345".to_string(),
            ..valid_form()
        };
        assert!(form
            .validate(&ValidationRules {
                phone_min_length: 5
            })
            .is_ok());
    }

    #[test]
    fn test_first_failing_field_wins() {
        let form = OrderForm {
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
            district: String::new(),
            ..valid_form()
        };
        let err = form.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(err.field(), FieldCategory::Name);

        let form = OrderForm {
            address: String::new(),
            district: String::new(),
            ..valid_form()
        };
        let err = form.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(err.field(), FieldCategory::Address);
    }

    #[test]
    fn test_missing_district() {
        let form = OrderForm {
            district: " ".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate(&ValidationRules::default()),
            Err(ValidationError::MissingDistrict)
        );
    }
}
