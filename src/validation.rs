use serde::Serialize;
use std::collections::BTreeMap;

use crate::criteria::{Field, SearchCriteria};

pub const AIRPORT_CODE_LENGTH: usize = 3;
pub const MAX_PASSENGERS: i64 = 5;

pub const PASSENGERS_MESSAGE: &str =
    "Number of Passengers must be a positive number, not exceeding 5";

/// Field-level messages from one validation pass. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn validate(criteria: &SearchCriteria) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if criteria.departure_airport.chars().count() != AIRPORT_CODE_LENGTH {
        errors.insert(
            Field::DepartureAirport,
            "Departure Airport must be 3 characters long",
        );
    }
    if criteria.destination_airport.chars().count() != AIRPORT_CODE_LENGTH {
        errors.insert(
            Field::DestinationAirport,
            "Destination Airport must be 3 characters long",
        );
    }
    if criteria.departure_date.is_empty() {
        errors.insert(Field::DepartureDate, "Departure Date is required");
    }
    if criteria.return_date.is_empty() {
        errors.insert(Field::ReturnDate, "Return Date is required");
    }
    match criteria.passenger_count() {
        Some(count) if count > 0 && count <= MAX_PASSENGERS => {}
        _ => errors.insert(Field::NumberOfPassengers, PASSENGERS_MESSAGE),
    }
    if criteria.currency.is_empty() {
        errors.insert(Field::Currency, "Currency is required");
    }

    errors
}
