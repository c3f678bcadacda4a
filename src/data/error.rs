use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Semantic fields of the report
// ---------------------------------------------------------------------------

/// The columns the loader needs, each known under an English and a
/// Portuguese header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    ConsumedKwh,
    GeneratedKwh,
    CostWithSystem,
    CostWithoutSystem,
    Savings,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Year,
        Field::Month,
        Field::ConsumedKwh,
        Field::GeneratedKwh,
        Field::CostWithSystem,
        Field::CostWithoutSystem,
        Field::Savings,
    ];

    /// Header names accepted for this field, canonical name first.
    pub fn header_names(self) -> &'static [&'static str] {
        match self {
            Field::Year => &["Year", "Ano"],
            Field::Month => &["Month", "Mês"],
            Field::ConsumedKwh => &["Consumption (kWh)", "Consumo faturado (kWh)"],
            Field::GeneratedKwh => &["Generated Energy (kWh)", "Energia gerada (kWh)"],
            Field::CostWithSystem => &["Will Pay", "Vai pagar"],
            Field::CostWithoutSystem => &["Used To Pay", "Você pagava"],
            Field::Savings => &["Savings", "Economia"],
        }
    }

    pub fn canonical_name(self) -> &'static str {
        self.header_names()[0]
    }

    /// Whether negative values are rejected for this field.
    pub fn non_negative(self) -> bool {
        !matches!(self, Field::Savings | Field::Year | Field::Month)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The source opened but does not have the shape of a sizing report.
/// Rows are 1-based sheet rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("no header row found after skipping {skipped} rows")]
    MissingHeader { skipped: usize },

    #[error("required column {field} not found")]
    MissingColumn { field: Field },

    #[error("row {row}: {field} is empty")]
    MissingValue { field: Field, row: usize },

    #[error("row {row}: {field} value '{value}' is not a number")]
    NonNumeric {
        field: Field,
        row: usize,
        value: String,
    },

    #[error("row {row}: {field} value {value} is negative")]
    Negative { field: Field, row: usize, value: f64 },

    #[error("row {row}: month '{month}' already appeared in row {first_row}")]
    DuplicateMonth {
        month: String,
        row: usize,
        first_row: usize,
    },
}

/// Everything that can stop a report from loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be opened or read at all.
    #[error("cannot read {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The source was read but its content does not match the report layout.
    #[error("{source_name}: {error}")]
    Schema {
        source_name: String,
        #[source]
        error: SchemaError,
    },
}

impl LoadError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        LoadError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(source_name: impl Into<String>, error: SchemaError) -> Self {
        LoadError::Schema {
            source_name: source_name.into(),
            error,
        }
    }

    /// The schema problem, if that is what this error is.
    #[cfg(test)]
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            LoadError::Schema { error, .. } => Some(error),
            LoadError::SourceUnavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, LoadError::SourceUnavailable { .. })
    }
}
