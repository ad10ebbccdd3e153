use serde::Serialize;
use serde_json::Value;

use super::error::LookupError;
use super::measure::Measure;

/// Raw `county_data` request fields, trimmed but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub zip: String,
    pub measure_name: String,
}

/// A request that passed every client-side check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLookup {
    pub zip: String,
    pub measure: Measure,
}

impl LookupRequest {
    pub fn new(zip: impl Into<String>, measure_name: impl Into<String>) -> Self {
        Self {
            zip: zip.into().trim().to_string(),
            measure_name: measure_name.into().trim().to_string(),
        }
    }

    /// Pulls the request out of a decoded JSON body. Only objects are
    /// accepted. An absent field is empty; any present value is taken in its
    /// text form, so `null` or `true` reach validation as non-empty text.
    pub fn from_json(body: &Value) -> Result<Self, LookupError> {
        let object = body.as_object().ok_or(LookupError::InvalidBody)?;
        Ok(Self::new(
            scalar_text(object.get("zip")),
            scalar_text(object.get("measure_name")),
        ))
    }

    /// Checks run in order and the first failure wins.
    pub fn validate(&self) -> Result<ValidLookup, LookupError> {
        if self.zip.is_empty() || self.measure_name.is_empty() {
            return Err(LookupError::MissingField);
        }
        if !is_five_digit_zip(&self.zip) {
            return Err(LookupError::InvalidZip);
        }
        let measure = self
            .measure_name
            .parse::<Measure>()
            .map_err(|_| LookupError::UnknownMeasure)?;
        Ok(ValidLookup {
            zip: self.zip.clone(),
            measure,
        })
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::Null) => "None".to_string(),
        Some(other) => other.to_string(),
    }
}

fn is_five_digit_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// One county health rankings record as handed to callers. Every field is
/// text; a database NULL is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactRow {
    pub state: String,
    pub county: String,
    pub state_code: String,
    pub county_code: String,
    pub year_span: String,
    pub measure_name: String,
    pub measure_id: String,
    pub numerator: String,
    pub denominator: String,
    pub raw_value: String,
    pub confidence_interval_lower_bound: String,
    pub confidence_interval_upper_bound: String,
    pub data_release_year: String,
    pub fipscode: String,
}

impl FactRow {
    /// Column order of the projection the storage layer selects.
    pub const COLUMNS: [&'static str; 14] = [
        "state",
        "county",
        "state_code",
        "county_code",
        "year_span",
        "measure_name",
        "measure_id",
        "numerator",
        "denominator",
        "raw_value",
        "confidence_interval_lower_bound",
        "confidence_interval_upper_bound",
        "data_release_year",
        "fipscode",
    ];

    /// Builds a row from values in [`FactRow::COLUMNS`] order. `None` becomes `""`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut values = values.into_iter().map(Option::unwrap_or_default);
        let mut next = || values.next().unwrap_or_default();
        Self {
            state: next(),
            county: next(),
            state_code: next(),
            county_code: next(),
            year_span: next(),
            measure_name: next(),
            measure_id: next(),
            numerator: next(),
            denominator: next(),
            raw_value: next(),
            confidence_interval_lower_bound: next(),
            confidence_interval_upper_bound: next(),
            data_release_year: next(),
            fipscode: next(),
        }
    }
}
