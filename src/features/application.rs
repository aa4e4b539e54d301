use serde::{Deserialize, Serialize};

use super::{Feature, FieldError, N_FEATURES};

/// An encoded, model-ready row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    /// Wraps already encoded values.
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the value of a single feature.
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }
}

/// A loan application as submitted to the inference service.
///
/// Field names follow the historical CSV header so the same schema is used on
/// both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Married")]
    pub married: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Self_Employed")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    /// Any JSON number; the encoder restricts it to 0 or 1.
    #[serde(rename = "Credit_History")]
    pub credit_history: f64,
    #[serde(rename = "Property_Area")]
    pub property_area: String,
}

impl LoanApplication {
    /// Validates every field and encodes the application into a feature vector.
    ///
    /// # Returns
    /// The encoded vector or the first `FieldError`, in column order.
    pub fn encode(&self) -> Result<FeatureVector, FieldError> {
        Ok(FeatureVector([
            Feature::Gender.encode(&self.gender)?,
            Feature::Married.encode(&self.married)?,
            Feature::Dependents.encode(&self.dependents)?,
            Feature::Education.encode(&self.education)?,
            Feature::SelfEmployed.encode(&self.self_employed)?,
            Feature::ApplicantIncome.encode_number(self.applicant_income)?,
            Feature::CoapplicantIncome.encode_number(self.coapplicant_income)?,
            Feature::LoanAmount.encode_number(self.loan_amount)?,
            Feature::LoanAmountTerm.encode_number(self.loan_amount_term)?,
            Feature::CreditHistory.encode_number(self.credit_history)?,
            Feature::PropertyArea.encode(&self.property_area)?,
        ]))
    }
}
