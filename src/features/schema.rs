use super::FieldError;

/// Number of columns in an encoded feature vector.
pub const N_FEATURES: usize = 11;

/// Ordered column names of the feature vector, as they appear in the historical CSV.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "Gender",
    "Married",
    "Dependents",
    "Education",
    "Self_Employed",
    "ApplicantIncome",
    "CoapplicantIncome",
    "LoanAmount",
    "Loan_Amount_Term",
    "Credit_History",
    "Property_Area",
];

/// One column of the feature vector.
///
/// Every raw value, whether it comes from a CSV cell at training time or from a
/// request body at serving time, is encoded through this type so both sides
/// produce the same numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditHistory,
    PropertyArea,
}

impl Feature {
    /// All features in vector order.
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::Gender,
        Feature::Married,
        Feature::Dependents,
        Feature::Education,
        Feature::SelfEmployed,
        Feature::ApplicantIncome,
        Feature::CoapplicantIncome,
        Feature::LoanAmount,
        Feature::LoanAmountTerm,
        Feature::CreditHistory,
        Feature::PropertyArea,
    ];

    /// Position of this feature in the encoded vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name, shared by the CSV header and the request body.
    pub fn column(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Whether the column holds free numeric values rather than a closed set of codes.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Feature::ApplicantIncome
                | Feature::CoapplicantIncome
                | Feature::LoanAmount
                | Feature::LoanAmountTerm
        )
    }

    /// Encodes a raw textual value of this column.
    ///
    /// # Arguments
    /// * `raw` - The untrimmed value, as found in a CSV cell or a JSON string.
    ///
    /// # Returns
    /// The numeric code of the value or a `FieldError` describing what's accepted.
    pub fn encode(self, raw: &str) -> Result<f64, FieldError> {
        let field = self.column();
        let key = raw.trim().to_lowercase();

        let code = match self {
            Feature::Gender => match key.as_str() {
                "male" => 1.0,
                "female" => 0.0,
                _ => return Err(self.invalid()),
            },
            Feature::Married | Feature::SelfEmployed => yes_no(&key).ok_or_else(|| self.invalid())?,
            Feature::Dependents => match key.as_str() {
                "0" => 0.0,
                "1" => 1.0,
                "2" => 2.0,
                "3+" => 3.0,
                _ => return Err(self.invalid()),
            },
            Feature::Education => match key.replace(['-', '_'], " ").as_str() {
                "graduate" => 1.0,
                "not graduate" => 0.0,
                _ => return Err(self.invalid()),
            },
            Feature::PropertyArea => match key.replace(['-', '_'], "").as_str() {
                "urban" => 1.0,
                "semiurban" => 2.0,
                "rural" => 3.0,
                _ => return Err(self.invalid()),
            },
            Feature::CreditHistory
            | Feature::ApplicantIncome
            | Feature::CoapplicantIncome
            | Feature::LoanAmount
            | Feature::LoanAmountTerm => {
                let value = key.parse::<f64>().map_err(|_| FieldError::NotANumber {
                    field,
                    value: raw.trim().to_string(),
                })?;
                return self.encode_number(value);
            }
        };

        Ok(code)
    }

    /// Validates a value that already arrived as a number.
    ///
    /// Only numeric columns and `Credit_History` accept numbers; categorical columns
    /// always report their accepted values.
    pub fn encode_number(self, value: f64) -> Result<f64, FieldError> {
        match self {
            Feature::CreditHistory if value == 0.0 || value == 1.0 => Ok(value),
            Feature::CreditHistory => Err(self.invalid()),
            f if f.is_numeric() => {
                if value.is_finite() && value >= 0.0 {
                    Ok(value)
                } else {
                    Err(FieldError::OutOfRange {
                        field: self.column(),
                        value,
                    })
                }
            }
            _ => Err(self.invalid()),
        }
    }

    fn invalid(self) -> FieldError {
        let expected = match self {
            Feature::Gender => "'Male' or 'Female'",
            Feature::Married | Feature::SelfEmployed => "'Yes' or 'No'",
            Feature::Dependents => "0, 1, 2, or 3+",
            Feature::Education => "'Graduate' or 'Not Graduate'",
            Feature::PropertyArea => "Urban, Semiurban, or Rural",
            Feature::CreditHistory => "0 or 1",
            _ => "a finite non-negative number",
        };

        FieldError::Invalid {
            field: self.column(),
            expected,
        }
    }
}

fn yes_no(key: &str) -> Option<f64> {
    match key {
        "yes" => Some(1.0),
        "no" => Some(0.0),
        _ => None,
    }
}

/// Outcome of a loan application, the training target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    Rejected = 0,
    Approved = 1,
}

impl LoanStatus {
    /// Name of the target column in the historical CSV.
    pub const COLUMN: &'static str = "Loan_Status";

    /// Parses the `Y`/`N` flag used by the historical CSV.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "y" => Some(Self::Approved),
            "n" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Maps a predicted class index back to a status.
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    /// Class index used by the classifier.
    pub fn class(self) -> usize {
        self as usize
    }

    /// Human readable label returned by the service.
    pub fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}
