use serde::Serialize;
use std::fmt;

use crate::criteria::Currency;
use crate::flight_offer::{FlightOffer, Itinerary, SegmentEndpoint};

/// Placeholder for values an offer does not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Appends the currency symbol, or the raw code when it has no symbol.
pub fn format_currency(currency_code: &str, amount: impl fmt::Display) -> String {
    let symbol = match currency_code.parse::<Currency>() {
        Ok(currency) => currency.symbol(),
        Err(()) => currency_code,
    };
    format!("{}{}", amount, symbol)
}

/// Date part of an ISO-8601 timestamp: everything before the first `T`.
pub fn format_date(timestamp: &str) -> &str {
    timestamp
        .split_once('T')
        .map_or(timestamp, |(date, _)| date)
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRow {
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_date: String,
    pub return_airport: String,
    pub return_date: String,
    pub outbound_stops: String,
    pub inbound_stops: String,
    pub bookable_seats: String,
    pub currency: String,
    pub total_price: String,
}

impl OfferRow {
    pub fn from_offer(offer: &FlightOffer) -> Self {
        let outbound = offer.outbound();
        let outbound_departure = outbound
            .and_then(Itinerary::first_segment)
            .map(|segment| &segment.departure);
        let outbound_arrival = outbound
            .and_then(Itinerary::last_segment)
            .map(|segment| &segment.arrival);
        let inbound_arrival = offer
            .inbound()
            .and_then(Itinerary::last_segment)
            .map(|segment| &segment.arrival);

        let total_price = if offer.price.total.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            format_currency(&offer.price.currency, &offer.price.total)
        };

        Self {
            departure_airport: airport_or_placeholder(outbound_departure),
            destination_airport: airport_or_placeholder(outbound_arrival),
            departure_date: date_or_placeholder(outbound_departure),
            return_airport: airport_or_placeholder(inbound_arrival),
            return_date: date_or_placeholder(inbound_arrival),
            outbound_stops: stops_or_placeholder(outbound),
            inbound_stops: stops_or_placeholder(offer.inbound()),
            bookable_seats: offer
                .number_of_bookable_seats
                .map_or_else(|| NOT_AVAILABLE.to_string(), |seats| seats.to_string()),
            currency: non_empty_or_placeholder(&offer.price.currency),
            total_price,
        }
    }
}

fn airport_or_placeholder(endpoint: Option<&SegmentEndpoint>) -> String {
    non_empty_or_placeholder(endpoint.map_or("", |endpoint| endpoint.iata_code.as_str()))
}

fn date_or_placeholder(endpoint: Option<&SegmentEndpoint>) -> String {
    non_empty_or_placeholder(endpoint.map_or("", |endpoint| format_date(&endpoint.at)))
}

fn stops_or_placeholder(itinerary: Option<&Itinerary>) -> String {
    itinerary
        .and_then(Itinerary::stop_count)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |stops| stops.to_string())
}

fn non_empty_or_placeholder(value: &str) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}
