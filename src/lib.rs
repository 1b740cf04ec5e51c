pub mod config;
pub mod criteria;
pub mod flight_client;
pub mod flight_offer;
pub mod formatting;
pub mod handlers_health;
pub mod handlers_search;
pub mod handlers_static;
pub mod pagination;
pub mod render;
pub mod routes;
pub mod scheduler;
pub mod search_page;
pub mod session;
pub mod validation;
pub mod warp_helpers;
