use chrono::{DateTime, Utc};

use crate::criteria::{FlightOffersRequest, SearchCriteria};
use crate::flight_client::FlightClientResult;
use crate::flight_offer::FlightOffer;
use crate::formatting::OfferRow;
use crate::pagination::Pagination;
use crate::validation::ValidationErrors;

/// Shown instead of the raw transport error.
pub const SEARCH_FAILED_MESSAGE: &str =
    "Flight offers could not be loaded. Please try again in a moment.";

/// Identifies the search a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are on the page.
    Invalid,
    /// A search is already running for this page.
    AlreadyLoading,
    Started {
        ticket: SearchTicket,
        request: FlightOffersRequest,
    },
}

/// Everything one browser sees: the form, its errors and the result table.
#[derive(Debug, Default)]
pub struct SearchPage {
    criteria: SearchCriteria,
    errors: ValidationErrors,
    loading: bool,
    flights: Vec<FlightOffer>,
    pagination: Pagination,
    last_failure: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl SearchPage {
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn flights(&self) -> &[FlightOffer] {
        &self.flights
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.flights.len())
    }

    pub fn visible_flights(&self) -> &[FlightOffer] {
        self.pagination.page_slice(&self.flights)
    }

    pub fn visible_rows(&self) -> Vec<OfferRow> {
        self.visible_flights()
            .iter()
            .map(OfferRow::from_offer)
            .collect()
    }

    pub fn jump_to_page(&mut self, page: usize) -> bool {
        self.pagination.jump_to(page, self.flights.len())
    }

    /// Stores the submitted form, validates it and starts a search when allowed.
    pub fn submit(&mut self, criteria: SearchCriteria, max_offers: u32) -> SubmitOutcome {
        self.criteria = criteria;

        let request = match FlightOffersRequest::from_criteria(&self.criteria, max_offers) {
            Ok(request) => request,
            Err(errors) => {
                self.errors = errors;
                return SubmitOutcome::Invalid;
            }
        };
        self.errors = ValidationErrors::default();

        if self.loading {
            return SubmitOutcome::AlreadyLoading;
        }

        self.loading = true;
        self.last_failure = None;
        self.generation += 1;

        SubmitOutcome::Started {
            ticket: SearchTicket(self.generation),
            request,
        }
    }

    /// Applies a finished search. Returns `false` for a stale ticket.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: FlightClientResult<Vec<FlightOffer>>,
    ) -> bool {
        if ticket != SearchTicket(self.generation) {
            return false;
        }

        match result {
            Ok(flights) => {
                self.flights = flights;
                self.pagination.reset();
                self.criteria = SearchCriteria::default();
                self.fetched_at = Some(Utc::now());
            }
            Err(_) => {
                self.last_failure = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
        self.loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Field;
    use crate::flight_client::FlightClientError;

    fn valid_criteria() -> SearchCriteria {
        SearchCriteria {
            departure_airport: "ZAG".to_string(),
            destination_airport: "AMS".to_string(),
            departure_date: "2024-07-01".to_string(),
            return_date: "2024-07-14".to_string(),
            number_of_passengers: "2".to_string(),
            currency: "EUR".to_string(),
        }
    }

    fn offers(count: usize) -> Vec<FlightOffer> {
        (0..count)
            .map(|i| FlightOffer {
                id: Some(i.to_string()),
                ..FlightOffer::default()
            })
            .collect()
    }

    fn start(page: &mut SearchPage) -> SearchTicket {
        match page.submit(valid_criteria(), 3) {
            SubmitOutcome::Started { ticket, .. } => ticket,
            other => panic!("expected a started search, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_submit_records_errors_and_keeps_input() {
        let mut page = SearchPage::default();
        let mut criteria = valid_criteria();
        criteria.departure_airport = "ZAGREB".to_string();

        assert_eq!(page.submit(criteria, 3), SubmitOutcome::Invalid);
        assert!(!page.is_loading());
        assert_eq!(page.criteria().departure_airport, "ZAGREB");
        assert!(page.errors().get(Field::DepartureAirport).is_some());
    }

    #[test]
    fn test_valid_submit_starts_loading() {
        let mut page = SearchPage::default();

        match page.submit(valid_criteria(), 3) {
            SubmitOutcome::Started { request, .. } => {
                assert_eq!(request.departure_airport, "ZAG");
                assert_eq!(request.number_of_passengers, 2);
                assert_eq!(request.max, 3);
            }
            other => panic!("expected a started search, got {:?}", other),
        }
        assert!(page.is_loading());
        assert!(page.errors().is_empty());
    }

    #[test]
    fn test_submit_while_loading_is_refused() {
        let mut page = SearchPage::default();
        start(&mut page);

        assert_eq!(page.submit(valid_criteria(), 3), SubmitOutcome::AlreadyLoading);
        assert!(page.is_loading());
    }

    #[test]
    fn test_successful_search_resets_form_and_page() {
        let mut page = SearchPage::default();
        let ticket = start(&mut page);
        assert!(page.complete(ticket, Ok(offers(25))));
        assert!(page.jump_to_page(3));

        let ticket = start(&mut page);
        assert!(page.complete(ticket, Ok(offers(12))));

        assert!(!page.is_loading());
        assert_eq!(page.pagination().current_page(), 1);
        assert_eq!(page.criteria(), &SearchCriteria::default());
        assert_eq!(page.flights().len(), 12);
        assert_eq!(page.page_count(), 2);
        assert!(page.fetched_at().is_some());
    }

    #[test]
    fn test_failed_search_keeps_results_and_surfaces_failure() {
        let mut page = SearchPage::default();
        let ticket = start(&mut page);
        page.complete(ticket, Ok(offers(3)));

        let ticket = start(&mut page);
        assert!(page.complete(ticket, Err(FlightClientError::Status(500))));

        assert!(!page.is_loading());
        assert_eq!(page.flights().len(), 3);
        assert_eq!(page.last_failure(), Some(SEARCH_FAILED_MESSAGE));
        assert_eq!(page.criteria(), &valid_criteria());

        start(&mut page);
        assert!(page.last_failure().is_none());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut page = SearchPage::default();
        let stale = start(&mut page);
        page.complete(stale, Err(FlightClientError::Transport("reset".to_string())));

        let current = start(&mut page);
        assert!(!page.complete(stale, Ok(offers(5))));
        assert!(page.is_loading());
        assert!(page.flights().is_empty());

        assert!(page.complete(current, Ok(offers(5))));
        assert_eq!(page.flights().len(), 5);
    }

    #[test]
    fn test_visible_rows_follow_current_page() {
        let mut page = SearchPage::default();
        let ticket = start(&mut page);
        page.complete(ticket, Ok(offers(25)));

        assert_eq!(page.visible_rows().len(), 10);
        assert!(page.jump_to_page(3));
        assert_eq!(page.visible_flights().len(), 5);
        assert_eq!(page.visible_flights()[0].id.as_deref(), Some("20"));
        assert!(!page.jump_to_page(4));
        assert_eq!(page.pagination().current_page(), 3);
    }
}
