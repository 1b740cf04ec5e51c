use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::Uri;
use warp::{Filter, Rejection, Reply};

use crate::criteria::{FlightOffersRequest, SearchCriteria};
use crate::flight_client::FlightOffersApi;
use crate::formatting::OfferRow;
use crate::render;
use crate::search_page::{SearchPage, SearchTicket, SubmitOutcome};
use crate::session::{lock_page, SharedPage};
use crate::validation::ValidationErrors;
use crate::warp_helpers::{
    session_rejection, with_session_cookie, with_session_id, with_state, AppState,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

/// JSON view of the current results page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersPageResponse {
    pub rows: Vec<OfferRow>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub errors: ValidationErrors,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl OffersPageResponse {
    fn from_page(page: &SearchPage) -> Self {
        Self {
            rows: page.visible_rows(),
            page: page.pagination().current_page(),
            page_count: page.page_count(),
            page_size: page.pagination().page_size(),
            total: page.flights().len(),
            loading: page.is_loading(),
            error: page.last_failure().map(str::to_string),
            errors: page.errors().clone(),
            fetched_at: page.fetched_at(),
        }
    }
}

fn apply_page_query(page: &mut SearchPage, query: &PageQuery) {
    if let Some(number) = query.page {
        if !page.jump_to_page(number) {
            debug!(
                "Ignoring page {} outside 1..={}",
                number,
                page.page_count()
            );
        }
    }
}

pub async fn show_search_page(
    query: PageQuery,
    session_id: Option<String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let (session_id, page) = state
        .sessions
        .resolve(session_id.as_deref())
        .map_err(session_rejection)?;

    let html = {
        let mut page = lock_page(&page).map_err(session_rejection)?;
        apply_page_query(&mut page, &query);
        render::render_page(&page)
    };

    Ok(with_session_cookie(warp::reply::html(html), &session_id, state.secure_cookie))
}

pub async fn get_offers_page(
    query: PageQuery,
    session_id: Option<String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let (session_id, page) = state
        .sessions
        .resolve(session_id.as_deref())
        .map_err(session_rejection)?;

    let response = {
        let mut page = lock_page(&page).map_err(session_rejection)?;
        apply_page_query(&mut page, &query);
        OffersPageResponse::from_page(&page)
    };

    Ok(with_session_cookie(warp::reply::json(&response), &session_id, state.secure_cookie))
}

pub async fn submit_search(
    criteria: SearchCriteria,
    session_id: Option<String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let (session_id, page) = state
        .sessions
        .resolve(session_id.as_deref())
        .map_err(session_rejection)?;

    let (outcome, error_count) = {
        let mut page = lock_page(&page).map_err(session_rejection)?;
        let outcome = page.submit(criteria, state.max_offers);
        (outcome, page.errors().len())
    };

    match outcome {
        SubmitOutcome::Invalid => {
            debug!("Search form rejected with {} validation error(s)", error_count);
        }
        SubmitOutcome::AlreadyLoading => {
            warn!("Search submitted while another search is running, ignoring");
        }
        SubmitOutcome::Started { ticket, request } => {
            info!(
                "Searching flight offers {} -> {} ({} - {}, {} passenger(s), {})",
                request.departure_airport,
                request.destination_airport,
                request.departure_date,
                request.return_date,
                request.number_of_passengers,
                request.currency
            );
            tokio::spawn(run_search(
                page.clone(),
                state.flight_client.clone(),
                ticket,
                request,
            ));
        }
    }

    Ok(with_session_cookie(
        warp::redirect::see_other(Uri::from_static("/")),
        &session_id,
        state.secure_cookie,
    ))
}

/// Calls upstream and hands the result back to the page that asked for it.
pub async fn run_search(
    page: SharedPage,
    flight_client: Arc<dyn FlightOffersApi>,
    ticket: SearchTicket,
    request: FlightOffersRequest,
) {
    let result = flight_client.search(&request).await;
    match &result {
        Ok(offers) => info!("Received {} flight offer(s)", offers.len()),
        Err(e) => error!("Flight offer search failed: {}", e),
    }

    match lock_page(&page) {
        Ok(mut page) => {
            if !page.complete(ticket, result) {
                debug!("Discarded stale flight offer response");
            }
        }
        Err(e) => error!("Could not store flight offers: {}", e),
    }
}

pub fn build_search_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_session_id())
        .and(with_state(state.clone()))
        .and_then(show_search_page);

    let submit = warp::path("search")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::form::<SearchCriteria>())
        .and(with_session_id())
        .and(with_state(state.clone()))
        .and_then(submit_search);

    let api_offers = warp::path("api")
        .and(warp::path("offers"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_session_id())
        .and(with_state(state))
        .and_then(get_offers_page);

    index.or(submit).or(api_offers)
}
