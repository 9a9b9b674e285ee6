use chrono::NaiveDate;
use expense_repo::transaction_repo::{Filter, TransactionType, ALL_CATEGORIES};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter field '{0}'")]
    UnknownField(String),
    #[error("Invalid date '{value}' for {field}")]
    InvalidDate { field: &'static str, value: String },
    #[error("Invalid transaction type '{0}'")]
    InvalidType(String),
}

/// The filters the dashboard's list and chart share. Starts out empty and lives only as long as
/// its owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    filter: Filter,
}

impl FilterState {
    pub fn new() -> FilterState {
        FilterState::default()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Replaces all four fields.
    pub fn set(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn reset(&mut self) {
        self.filter = Filter::NONE;
    }

    /// Updates one field from a form value. An empty value clears the field, as does `All` for
    /// the category. On error the state is left untouched.
    pub fn update_field(&mut self, name: &str, value: &str) -> Result<(), FilterError> {
        let value = value.trim();
        match name {
            "startDate" => self.filter.start_date = parse_date("startDate", value)?,
            "endDate" => self.filter.end_date = parse_date("endDate", value)?,
            "type" => {
                self.filter.transaction_type = if value.is_empty() {
                    None
                } else {
                    let transaction_type = value
                        .parse::<TransactionType>()
                        .map_err(|_| FilterError::InvalidType(value.to_owned()))?;
                    Some(transaction_type)
                }
            }
            "category" => {
                self.filter.category = match value {
                    "" | ALL_CATEGORIES => None,
                    category => Some(category.to_owned()),
                }
            }
            _ => return Err(FilterError::UnknownField(name.to_owned())),
        }
        Ok(())
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FilterError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<NaiveDate>()
        .map(Some)
        .map_err(|_| FilterError::InvalidDate {
            field,
            value: value.to_owned(),
        })
}
