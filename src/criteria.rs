use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::{self, ValidationErrors};

/// Currencies offered by the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Usd,
    Hrk,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Hrk];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Hrk => "HRK",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Hrk => "kn",
        }
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "HRK" => Ok(Currency::Hrk),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Form fields, in the order they appear on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    DepartureAirport,
    DestinationAirport,
    DepartureDate,
    ReturnDate,
    NumberOfPassengers,
    Currency,
}

impl Field {
    /// Name of the HTML input, identical to the upstream JSON key.
    pub fn name(&self) -> &'static str {
        match self {
            Field::DepartureAirport => "departureAirport",
            Field::DestinationAirport => "destinationAirport",
            Field::DepartureDate => "departureDate",
            Field::ReturnDate => "returnDate",
            Field::NumberOfPassengers => "numberOfPassengers",
            Field::Currency => "currency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::DepartureAirport => "Departure Airport",
            Field::DestinationAirport => "Destination Airport",
            Field::DepartureDate => "Departure Date",
            Field::ReturnDate => "Return Date",
            Field::NumberOfPassengers => "Number of Passengers",
            Field::Currency => "Currency",
        }
    }
}

/// Raw form input. Values stay as entered so invalid input can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_date: String,
    pub return_date: String,
    pub number_of_passengers: String,
    pub currency: String,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            departure_airport: String::new(),
            destination_airport: String::new(),
            departure_date: String::new(),
            return_date: String::new(),
            number_of_passengers: String::new(),
            currency: Currency::Eur.code().to_string(),
        }
    }
}

impl SearchCriteria {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::DepartureAirport => &self.departure_airport,
            Field::DestinationAirport => &self.destination_airport,
            Field::DepartureDate => &self.departure_date,
            Field::ReturnDate => &self.return_date,
            Field::NumberOfPassengers => &self.number_of_passengers,
            Field::Currency => &self.currency,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::DepartureAirport => self.departure_airport = value,
            Field::DestinationAirport => self.destination_airport = value,
            Field::DepartureDate => self.departure_date = value,
            Field::ReturnDate => self.return_date = value,
            Field::NumberOfPassengers => self.number_of_passengers = value,
            Field::Currency => self.currency = value,
        }
    }

    /// Passenger count when the raw input is an integer.
    pub fn passenger_count(&self) -> Option<i64> {
        self.number_of_passengers.trim().parse().ok()
    }
}

/// Body posted to the flight-offers endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffersRequest {
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_date: String,
    pub return_date: String,
    pub number_of_passengers: u8,
    pub max: u32,
    pub currency: String,
}

impl FlightOffersRequest {
    pub fn from_criteria(criteria: &SearchCriteria, max: u32) -> Result<Self, ValidationErrors> {
        let errors = validation::validate(criteria);
        if !errors.is_empty() {
            return Err(errors);
        }

        let number_of_passengers = criteria
            .passenger_count()
            .and_then(|count| u8::try_from(count).ok())
            .ok_or_else(|| {
                ValidationErrors::single(
                    Field::NumberOfPassengers,
                    validation::PASSENGERS_MESSAGE,
                )
            })?;

        Ok(Self {
            departure_airport: criteria.departure_airport.clone(),
            destination_airport: criteria.destination_airport.clone(),
            departure_date: criteria.departure_date.clone(),
            return_date: criteria.return_date.clone(),
            number_of_passengers,
            max,
            currency: criteria.currency.clone(),
        })
    }
}
