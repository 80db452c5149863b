use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Projection horizon of {months} months exceeds the {max}-month maximum")]
    HorizonTooLarge { months: i32, max: i32 },

    #[error("Query failed for {domain}: {details}")]
    Query { domain: String, details: String },

    #[error("Invalid month key '{0}': expected YYYY-MM")]
    InvalidMonthKey(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProjectionError {
    pub fn query(domain: &str, details: impl ToString) -> Self {
        ProjectionError::Query {
            domain: domain.to_string(),
            details: details.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
