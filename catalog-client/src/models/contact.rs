use serde::{Deserialize, Serialize};

/// A visitor asking to be called back about a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub customer_name: String,
    pub product_name: String,
    pub mobile_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ContactRequest {
    pub fn new(
        customer_name: impl Into<String>,
        product_name: impl Into<String>,
        mobile_number: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            product_name: product_name.into(),
            mobile_number: mobile_number.into(),
            ..Self::default()
        }
    }

    /// Same checks the server applies: name, product and mobile are required and the
    /// mobile number must hold exactly ten digits once separators are stripped.
    pub fn validate(&self) -> Result<(), String> {
        if self.customer_name.trim().is_empty()
            || self.product_name.trim().is_empty()
            || self.mobile_number.trim().is_empty()
        {
            return Err("Name, product name and mobile number are required".to_string());
        }

        let digits = self
            .mobile_number
            .chars()
            .filter(char::is_ascii_digit)
            .count();
        if digits != 10 {
            return Err("Invalid mobile number format".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number_validation() {
        assert!(ContactRequest::new("Asha", "Ergo Chair", "98765 43210")
            .validate()
            .is_ok());
        assert!(ContactRequest::new("Asha", "Ergo Chair", "+91-98765-4321")
            .validate()
            .is_ok());
        assert_eq!(
            ContactRequest::new("Asha", "Ergo Chair", "12345").validate(),
            Err("Invalid mobile number format".to_string())
        );
        assert_eq!(
            ContactRequest::new("", "Ergo Chair", "9876543210").validate(),
            Err("Name, product name and mobile number are required".to_string())
        );
    }

    #[test]
    fn test_serializes_camel_case_without_empty_optionals() {
        let request = ContactRequest::new("Asha", "Ergo Chair", "9876543210");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["customerName"], "Asha");
        assert_eq!(json["mobileNumber"], "9876543210");
        assert!(json.get("price").is_none());
    }
}
