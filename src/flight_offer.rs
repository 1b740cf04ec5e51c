use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reads an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope returned by the flight-offers endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightOffersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<FlightOffer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itineraries: Vec<Itinerary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(default)]
    pub number_of_bookable_seats: Option<u32>,
}

impl FlightOffer {
    pub fn outbound(&self) -> Option<&Itinerary> {
        self.itineraries.first()
    }

    pub fn inbound(&self) -> Option<&Itinerary> {
        self.itineraries.get(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Itinerary {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
}

impl Itinerary {
    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Segments minus one, `None` for an itinerary without segments.
    pub fn stop_count(&self) -> Option<usize> {
        self.segments.len().checked_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Segment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub departure: SegmentEndpoint,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival: SegmentEndpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub iata_code: String,
    /// ISO-8601 local timestamp, e.g. `2024-05-01T10:00:00`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Price {
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: Amount,
}

/// Price total as sent upstream, either a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(serde_json::Number),
}

impl Amount {
    pub fn is_empty(&self) -> bool {
        matches!(self, Amount::Text(text) if text.is_empty())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text(String::new())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Text(text) => write!(f, "{}", text),
            Amount::Number(number) => write!(f, "{}", number),
        }
    }
}
