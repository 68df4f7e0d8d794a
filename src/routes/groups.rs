use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    invalid_fields, ErrorResponse, FilterOptions, GroupCard, GroupRecord,
    HealthResponse, NotifyRequest, NotifyResponse, OptionsResponse, SearchRequest, SearchResponse,
};
use crate::services::{DispatchError, NominatimClient, Notifier, RosterService, Visitor};
use crate::core::GroupFinder;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RosterService>,
    pub geocoder: Arc<NominatimClient>,
    pub notifier: Arc<Notifier>,
    pub finder: GroupFinder,
}

/// Configure all group-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/groups/options", web::get().to(filter_options))
        .route("/groups/search", web::post().to(search_groups))
        .route("/groups/notify", web::post().to(notify_leader));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

fn validation_error(fields: Vec<String>) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Validation failed",
        format!("Please fill in: {}", fields.join(", ")),
    )
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let (roster, roster_error) = state.roster.current_or_empty().await;

    let status = if roster_error.is_none() { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        roster_size: roster.groups.len(),
    })
}

/// Filter options endpoint
///
/// GET /api/v1/groups/options
///
/// Lists the categories, days and modes present in the roster. A roster
/// that failed to load yields empty lists and a `rosterError`.
async fn filter_options(state: web::Data<AppState>) -> impl Responder {
    let (roster, roster_error) = state.roster.current_or_empty().await;

    HttpResponse::Ok().json(OptionsResponse {
        options: FilterOptions::from_groups(&roster.groups),
        total_groups: roster.groups.len(),
        roster_error,
    })
}

/// Card for a group, with the leader link prepared for this visitor
fn card(state: &AppState, group: &GroupRecord, distance_km: Option<f64>, visitor_name: &str) -> GroupCard {
    let mut card = GroupCard::from_group(group, distance_km);
    card.leader_contact = state.notifier.leader_contact(group);
    card.messaging_link = state.notifier.leader_link(group, visitor_name);
    card
}

/// Search endpoint
///
/// POST /api/v1/groups/search
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "contact": "string",
///   "address": "string",
///   "categories": ["string"],
///   "days": ["string"],
///   "modes": ["string"]
/// }
/// ```
async fn search_groups(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: field_errors={:?}", errors);
        return validation_error(invalid_fields(&errors));
    }

    let req = req.into_inner();

    let (roster, roster_error) = state.roster.current_or_empty().await;
    if roster.is_empty() {
        let message = roster_error.unwrap_or_else(|| "The group roster is empty".to_string());
        return error_response(
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
            "Roster unavailable",
            message,
        );
    }

    let query = req.into_query(&roster.groups);
    let (online, in_person) = state.finder.select(&roster.groups, &query.selection);

    let test_mode = state.notifier.test_mode();

    if online.is_empty() && in_person.is_empty() {
        tracing::info!("No groups match the selected filters");
        return HttpResponse::Ok().json(SearchResponse {
            reference: None,
            nearby: vec![],
            more: vec![],
            more_label: None,
            online: vec![],
            message: Some("No groups found for the selected filters".to_string()),
            test_mode,
        });
    }

    let origin = match state.geocoder.resolve_visitor_address(&query.address).await {
        Ok(Some(location)) => location,
        Ok(None) => {
            tracing::info!("Visitor address not found: {}", query.address);
            return error_response(
                actix_web::http::StatusCode::NOT_FOUND,
                "Address not found",
                format!("Could not locate \"{}\"", query.address),
            );
        }
        Err(e) => {
            tracing::error!("Geocoding failed for visitor address: {}", e);
            return error_response(
                actix_web::http::StatusCode::BAD_GATEWAY,
                "Address not found",
                e.to_string(),
            );
        }
    };

    let outcome = state.finder.rank(online, in_person, &origin);

    tracing::info!(
        "Returning {} nearby, {} more and {} online groups for {:?}",
        outcome.nearby.len(),
        outcome.more.len(),
        outcome.online.len(),
        origin.label
    );

    let response = SearchResponse {
        more_label: outcome.more_label(),
        nearby: outcome
            .nearby
            .iter()
            .map(|r| card(&state, &r.group, Some(r.distance_km), &query.name))
            .collect(),
        more: outcome
            .more
            .iter()
            .map(|r| card(&state, &r.group, Some(r.distance_km), &query.name))
            .collect(),
        online: outcome
            .online
            .iter()
            .map(|g| card(&state, g, None, &query.name))
            .collect(),
        reference: Some(origin.label),
        message: None,
        test_mode,
    };

    HttpResponse::Ok().json(response)
}

/// Notify endpoint
///
/// POST /api/v1/groups/notify
///
/// Request body:
/// ```json
/// {
///   "visitor_name": "string",
///   "visitor_contact": "string",
///   "group_row": 0,
///   "group_name": "string"
/// }
/// ```
async fn notify_leader(
    state: web::Data<AppState>,
    req: web::Json<NotifyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(invalid_fields(&errors));
    }

    let (roster, roster_error) = state.roster.current_or_empty().await;
    if let Some(message) = roster_error {
        return error_response(
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
            "Roster unavailable",
            message,
        );
    }

    let Some(group) = roster.find(req.group_row, &req.group_name) else {
        return error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Group not found",
            format!("No group named \"{}\" at row {}", req.group_name, req.group_row),
        );
    };

    let visitor = Visitor {
        name: req.visitor_name.clone(),
        contact: req.visitor_contact.clone(),
    };
    let messaging_link = state.notifier.leader_link(group, &visitor.name);
    let test_mode = state.notifier.test_mode();
    let request_id = uuid::Uuid::new_v4().to_string();

    match state.notifier.dispatch(&visitor, group).await {
        Ok(_) => HttpResponse::Ok().json(NotifyResponse {
            delivered: true,
            message: "Request sent, the leader has been notified".to_string(),
            messaging_link,
            test_mode,
            request_id,
        }),
        Err(DispatchError::MissingFields(fields)) => {
            validation_error(fields.into_iter().map(str::to_string).collect())
        }
        Err(e) => {
            tracing::warn!("Dispatch for group {:?} failed: {}", group.name, e);
            HttpResponse::BadGateway().json(NotifyResponse {
                delivered: false,
                message: format!("Could not notify the leader ({}). Use the messaging link instead.", e),
                messaging_link,
                test_mode,
                request_id,
            })
        }
    }
}
