//! Server-side HTML for the search page.

use std::fmt::{self, Display, Formatter};

use crate::criteria::{Currency, Field};
use crate::formatting::OfferRow;
use crate::search_page::SearchPage;

const BRAND: &str = "King Airlines";
const NO_FLIGHTS_MESSAGE: &str = "No direct flights found";
/// Seconds between automatic reloads while a search is running.
const LOADING_REFRESH_SECS: u32 = 1;

const TABLE_HEADERS: [&str; 10] = [
    "Departure Airport",
    "Destination Airport",
    "Departure Date",
    "Return Airport",
    "Return Date",
    "Number of Stops (Outbound)",
    "Number of Stops (Inbound)",
    "Bookable Seats",
    "Currency",
    "Total Price",
];

pub fn render_page(page: &SearchPage) -> String {
    PageView(page).to_string()
}

/// HTML-escapes text for element content and quoted attributes.
pub struct Escaped<'a>(pub &'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                _ => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

struct PageView<'a>(&'a SearchPage);

impl Display for PageView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let page = self.0;

        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html lang=\"en\">")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"utf-8\">")?;
        writeln!(
            f,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
        )?;
        if page.is_loading() {
            writeln!(
                f,
                "<meta http-equiv=\"refresh\" content=\"{}\">",
                LOADING_REFRESH_SECS
            )?;
        }
        writeln!(f, "<title>{}</title>", BRAND)?;
        writeln!(f, "<link rel=\"stylesheet\" href=\"/css/main.css\">")?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;

        write_navigation_bar(f)?;

        writeln!(f, "<main class=\"container\">")?;
        write_form(f, page)?;
        write_results(f, page)?;
        writeln!(f, "</main>")?;

        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

fn write_navigation_bar(f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "<nav class=\"navbar\">")?;
    writeln!(f, "<div class=\"container\">")?;
    writeln!(f, "<a class=\"navbar-brand\" href=\"/\">{}</a>", BRAND)?;
    writeln!(f, "<a class=\"nav-link\" href=\"/\">Home</a>")?;
    writeln!(f, "</div>")?;
    writeln!(f, "</nav>")
}

fn write_form(f: &mut Formatter<'_>, page: &SearchPage) -> fmt::Result {
    writeln!(f, "<form class=\"search-form\" method=\"post\" action=\"/search\">")?;

    write_input(f, page, Field::DepartureAirport, "text", true)?;
    write_input(f, page, Field::DestinationAirport, "text", true)?;
    write_input(f, page, Field::DepartureDate, "date", false)?;
    write_input(f, page, Field::ReturnDate, "date", false)?;
    write_input(f, page, Field::NumberOfPassengers, "number", true)?;
    write_currency_select(f, page)?;

    if page.is_loading() {
        writeln!(
            f,
            "<button type=\"submit\" class=\"btn btn-danger\" disabled>Search</button>"
        )?;
    } else {
        writeln!(f, "<button type=\"submit\" class=\"btn btn-danger\">Search</button>")?;
    }

    writeln!(f, "</form>")
}

fn write_input(
    f: &mut Formatter<'_>,
    page: &SearchPage,
    field: Field,
    input_type: &str,
    with_placeholder: bool,
) -> fmt::Result {
    let error = page.errors().get(field);

    writeln!(f, "<div class=\"input-group\">")?;
    writeln!(
        f,
        "<label class=\"input-group-text\" for=\"{}\">{}:</label>",
        field.name(),
        field.label()
    )?;
    write!(
        f,
        "<input type=\"{}\" id=\"{}\" name=\"{}\" value=\"{}\" aria-label=\"{}\"",
        input_type,
        field.name(),
        field.name(),
        Escaped(page.criteria().value(field)),
        field.label()
    )?;
    if with_placeholder {
        write!(f, " placeholder=\"{}\"", field.label())?;
    }
    writeln!(f, " class=\"{}\">", control_class(error))?;
    write_feedback(f, error)?;
    writeln!(f, "</div>")
}

fn write_currency_select(f: &mut Formatter<'_>, page: &SearchPage) -> fmt::Result {
    let field = Field::Currency;
    let error = page.errors().get(field);
    let selected = page.criteria().value(field);

    writeln!(f, "<div class=\"input-group\">")?;
    writeln!(
        f,
        "<label class=\"input-group-text\" for=\"{}\">{}:</label>",
        field.name(),
        field.label()
    )?;
    writeln!(
        f,
        "<select id=\"{}\" name=\"{}\" aria-label=\"{}\" class=\"{}\">",
        field.name(),
        field.name(),
        field.label(),
        control_class(error)
    )?;
    for currency in Currency::ALL {
        let marker = if currency.code() == selected {
            " selected"
        } else {
            ""
        };
        writeln!(
            f,
            "<option value=\"{code}\"{marker}>{code}</option>",
            code = currency.code(),
            marker = marker
        )?;
    }
    writeln!(f, "</select>")?;
    write_feedback(f, error)?;
    writeln!(f, "</div>")
}

fn control_class(error: Option<&str>) -> &'static str {
    if error.is_some() {
        "form-control is-invalid"
    } else {
        "form-control"
    }
}

fn write_feedback(f: &mut Formatter<'_>, error: Option<&str>) -> fmt::Result {
    match error {
        Some(message) => writeln!(
            f,
            "<div class=\"invalid-feedback\">{}</div>",
            Escaped(message)
        ),
        None => Ok(()),
    }
}

fn write_results(f: &mut Formatter<'_>, page: &SearchPage) -> fmt::Result {
    writeln!(f, "<section class=\"table-container\">")?;

    if let Some(failure) = page.last_failure() {
        writeln!(
            f,
            "<div class=\"alert alert-danger\" role=\"alert\">{}</div>",
            Escaped(failure)
        )?;
    }

    if page.is_loading() {
        writeln!(f, "<div class=\"text-center\">")?;
        writeln!(f, "<div class=\"spinner\" role=\"status\">")?;
        writeln!(f, "<span class=\"visually-hidden\">Loading...</span>")?;
        writeln!(f, "</div>")?;
        writeln!(f, "</div>")?;
    } else if page.flights().is_empty() {
        writeln!(f, "<div class=\"text-center\">")?;
        writeln!(f, "<p>{}</p>", NO_FLIGHTS_MESSAGE)?;
        writeln!(f, "</div>")?;
    } else {
        write_table(f, &page.visible_rows())?;
        write_pagination(f, page)?;
        if let Some(fetched_at) = page.fetched_at() {
            writeln!(
                f,
                "<p class=\"fetched-at\">Results fetched at {}</p>",
                fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?;
        }
    }

    writeln!(f, "</section>")
}

fn write_table(f: &mut Formatter<'_>, rows: &[OfferRow]) -> fmt::Result {
    writeln!(f, "<table class=\"table table-striped\">")?;
    writeln!(f, "<thead>")?;
    writeln!(f, "<tr>")?;
    for header in TABLE_HEADERS {
        writeln!(f, "<th>{}</th>", header)?;
    }
    writeln!(f, "</tr>")?;
    writeln!(f, "</thead>")?;
    writeln!(f, "<tbody>")?;
    for row in rows {
        writeln!(f, "<tr>")?;
        for cell in [
            &row.departure_airport,
            &row.destination_airport,
            &row.departure_date,
            &row.return_airport,
            &row.return_date,
            &row.outbound_stops,
            &row.inbound_stops,
            &row.bookable_seats,
            &row.currency,
            &row.total_price,
        ] {
            writeln!(f, "<td>{}</td>", Escaped(cell))?;
        }
        writeln!(f, "</tr>")?;
    }
    writeln!(f, "</tbody>")?;
    writeln!(f, "</table>")
}

fn write_pagination(f: &mut Formatter<'_>, page: &SearchPage) -> fmt::Result {
    let pagination = page.pagination();

    writeln!(f, "<ul class=\"pagination\">")?;
    for number in pagination.page_numbers(page.flights().len()) {
        let class = if number == pagination.current_page() {
            "page-item active"
        } else {
            "page-item"
        };
        writeln!(
            f,
            "<li class=\"{}\"><a class=\"page-link\" href=\"/?page={}\">{}</a></li>",
            class, number, number
        )?;
    }
    writeln!(f, "</ul>")
}
