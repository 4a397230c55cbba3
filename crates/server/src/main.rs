// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use agenda_api::{
    ApiError, AuditTrailResponse, AvailabilityRequest, AvailabilityResponse, BookingInfo,
    BookingItemRequest, BookingResponse, CancelSeriesRequest, CancelSeriesResponse,
    ClassBookRequest, ClassBookingResponse, ClassCancelRequest, ClassCancelResponse,
    ConflictingItemInfo, CreateBookingRequest, CreateBookingResponse,
    CreateRecurringBookingRequest,
    CreateRecurringBookingResponse, NotificationEvent, NotificationQueue,
    PreviewRecurringBookingResponse, RecurrenceRuleRequest, RescheduleBookingRequest,
    TransitionBookingRequest, booking_audit_trail, cancel_booking, cancel_series, class_book,
    class_cancel, create_booking, create_recurring_booking, get_availability, get_booking,
    preview_recurring_booking, reschedule_booking, transition_booking,
};
use agenda_audit::{Actor, Cause};
use agenda_persistence::Persistence;

/// Agenda Server - HTTP server for the Agenda booking engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for catalog, bookings, and audit events.
    persistence: Arc<Mutex<Persistence>>,
}

/// Notification queue that records dispatches in the server log.
///
/// Stands in for the outbound delivery pipeline; the booking flow only
/// needs the enqueue to be observable and non-blocking.
#[derive(Debug, Clone, Copy)]
struct LogNotifier;

impl NotificationQueue for LogNotifier {
    fn enqueue(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::BookingCreated { booking_id } => {
                info!(booking_id, "Notification queued: booking created");
            }
            NotificationEvent::BookingCancelled { booking_id } => {
                info!(booking_id, "Notification queued: booking cancelled");
            }
            NotificationEvent::BookingRescheduled { booking_id } => {
                info!(booking_id, "Notification queued: booking rescheduled");
            }
        }
    }
}

/// Actor and cause attribution carried by every write request.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct Attribution {
    /// The actor ID performing this action.
    actor_id: String,
    /// The type of actor (e.g., "customer", "operator", "system").
    actor_type: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
}

impl Attribution {
    fn actor(&self) -> Actor {
        Actor::new(self.actor_id.clone(), self.actor_type.clone())
    }

    fn cause(&self) -> Cause {
        Cause::new(self.cause_id.clone(), self.cause_description.clone())
    }
}

/// Query parameters for the availability endpoint.
#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    /// The location to search.
    location_id: i64,
    /// Comma-separated service IDs booked back to back.
    service_ids: String,
    /// First date of the range (YYYY-MM-DD, inclusive).
    date_from: String,
    /// Last date of the range (YYYY-MM-DD, inclusive).
    date_to: String,
    /// Restrict the search to one staff member.
    staff_id: Option<i64>,
}

/// API request for creating a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateBookingApiRequest {
    /// Who and why.
    #[serde(flatten)]
    attribution: Attribution,
    /// The business scope.
    business_id: i64,
    /// The location of the appointment.
    location_id: i64,
    /// The customer, when known.
    client_id: Option<i64>,
    /// The requested segments.
    items: Vec<BookingItemRequest>,
    /// Free-form operator notes.
    notes: Option<String>,
    /// Token making creation safe to retry.
    idempotency_key: Option<String>,
}

/// API request for cancel and status endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct BookingActionApiRequest {
    /// Who and why.
    #[serde(flatten)]
    attribution: Attribution,
    /// The target lifecycle status (status endpoint only).
    status: Option<String>,
}

/// API request for rescheduling a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RescheduleApiRequest {
    /// Who and why.
    #[serde(flatten)]
    attribution: Attribution,
    /// The new first-item start ("YYYY-MM-DD HH:MM:SS").
    new_start_time: String,
    /// Retire the original and create a linked replacement.
    #[serde(default)]
    as_replacement: bool,
}

/// API request for creating or previewing a recurring series.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RecurringBookingApiRequest {
    /// Who and why. Ignored by the preview endpoint.
    #[serde(flatten)]
    attribution: Attribution,
    /// The business scope.
    business_id: i64,
    /// The location of the appointments.
    location_id: i64,
    /// The customer, when known.
    client_id: Option<i64>,
    /// The anchor occurrence's segments.
    items: Vec<BookingItemRequest>,
    /// Free-form operator notes, copied to every occurrence.
    notes: Option<String>,
    /// The recurrence pattern.
    recurrence: RecurrenceRuleRequest,
}

impl RecurringBookingApiRequest {
    fn to_request(&self) -> CreateRecurringBookingRequest {
        CreateRecurringBookingRequest {
            business_id: self.business_id,
            location_id: self.location_id,
            client_id: self.client_id,
            items: self.items.clone(),
            notes: self.notes.clone(),
            recurrence: self.recurrence.clone(),
        }
    }
}

/// API request for cancelling part or all of a series.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CancelSeriesApiRequest {
    /// Who and why.
    #[serde(flatten)]
    attribution: Attribution,
    /// "occurrence", "`from_index`", or "whole".
    scope: String,
    /// The occurrence index for the scoped variants.
    index: Option<i32>,
}

/// API request for class booking and cancellation.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ClassActionApiRequest {
    /// Who and why.
    #[serde(flatten)]
    attribution: Attribution,
    /// The customer claiming or releasing the seat.
    customer_id: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    /// Service status indicator.
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// The existing items a rejected booking collided with. Present
    /// only on booking-conflict responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conflicts: Option<Vec<ConflictingItemInfo>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// The colliding items, on booking-conflict errors.
    conflicts: Option<Vec<ConflictingItemInfo>>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            conflicts: self.conflicts,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } | ApiError::CapacityExhausted { .. } => StatusCode::CONFLICT,
            ApiError::Consistency { .. } | ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let conflicts: Option<Vec<ConflictingItemInfo>> = match &err {
            ApiError::Conflict { conflicts } => {
                Some(conflicts.iter().map(ConflictingItemInfo::of).collect())
            }
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            conflicts,
        }
    }
}

/// Parses the comma-separated `service_ids` query parameter.
fn parse_service_ids(raw: &str) -> Result<Vec<i64>, HttpError> {
    raw.split(',')
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| {
            piece.trim().parse::<i64>().map_err(|_| HttpError {
                status: StatusCode::BAD_REQUEST,
                message: format!("Invalid service id: '{piece}'"),
                conflicts: None,
            })
        })
        .collect()
}

/// Handler for GET /availability endpoint.
///
/// Computes bookable slot starts per date for a location and service
/// combination.
async fn handle_get_availability(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, HttpError> {
    info!(
        location_id = query.location_id,
        service_ids = %query.service_ids,
        date_from = %query.date_from,
        date_to = %query.date_to,
        "Handling availability request"
    );

    let request: AvailabilityRequest = AvailabilityRequest {
        location_id: query.location_id,
        service_ids: parse_service_ids(&query.service_ids)?,
        date_from: query.date_from,
        date_to: query.date_to,
        staff_id: query.staff_id,
    };
    let today: time::Date = OffsetDateTime::now_utc().date();

    let mut persistence = app_state.persistence.lock().await;
    let response: AvailabilityResponse = get_availability(&mut persistence, &request, today)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST /bookings endpoint.
///
/// Creates a conflict-checked booking.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateBookingApiRequest>,
) -> Result<Json<CreateBookingResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        location_id = req.location_id,
        items = req.items.len(),
        "Handling create_booking request"
    );

    let request: CreateBookingRequest = CreateBookingRequest {
        business_id: req.business_id,
        location_id: req.location_id,
        client_id: req.client_id,
        items: req.items.clone(),
        notes: req.notes.clone(),
        idempotency_key: req.idempotency_key.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateBookingResponse = create_booking(
        &mut persistence,
        &request,
        &req.attribution.actor(),
        req.attribution.cause(),
        &LogNotifier,
    )?;
    drop(persistence);

    info!(
        booking_id = response.booking.booking_id,
        created = response.created,
        "Booking request handled"
    );

    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingInfo>, HttpError> {
    info!(booking_id, "Handling get_booking request");

    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingInfo = get_booking(&mut persistence, booking_id)?;
    drop(persistence);

    Ok(Json(booking))
}

/// Handler for GET `/bookings/{booking_id}/audit` endpoint.
///
/// Returns the booking's audit trail, oldest first.
async fn handle_booking_audit(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<AuditTrailResponse>, HttpError> {
    info!(booking_id, "Handling booking_audit request");

    let mut persistence = app_state.persistence.lock().await;
    let trail: AuditTrailResponse = booking_audit_trail(&mut persistence, booking_id)?;
    drop(persistence);

    Ok(Json(trail))
}

/// Handler for POST `/bookings/{booking_id}/cancel` endpoint.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<BookingActionApiRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        booking_id,
        "Handling cancel_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse = cancel_booking(
        &mut persistence,
        booking_id,
        &req.attribution.actor(),
        req.attribution.cause(),
        &LogNotifier,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/status` endpoint.
///
/// Applies a lifecycle transition (confirm, complete, no-show, ...).
async fn handle_transition_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<BookingActionApiRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    let status: String = req.status.clone().ok_or_else(|| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: String::from("status is required"),
        conflicts: None,
    })?;
    info!(
        actor_id = %req.attribution.actor_id,
        booking_id,
        status = %status,
        "Handling transition_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse = transition_booking(
        &mut persistence,
        booking_id,
        &TransitionBookingRequest { status },
        &req.attribution.actor(),
        req.attribution.cause(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/reschedule` endpoint.
async fn handle_reschedule_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<RescheduleApiRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        booking_id,
        new_start_time = %req.new_start_time,
        as_replacement = req.as_replacement,
        "Handling reschedule_booking request"
    );

    let request: RescheduleBookingRequest = RescheduleBookingRequest {
        new_start_time: req.new_start_time.clone(),
        as_replacement: req.as_replacement,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse = reschedule_booking(
        &mut persistence,
        booking_id,
        &request,
        &req.attribution.actor(),
        req.attribution.cause(),
        &LogNotifier,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST /`recurring_bookings` endpoint.
///
/// Expands a recurrence rule and books each occurrence under the
/// rule's conflict strategy.
async fn handle_create_recurring_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RecurringBookingApiRequest>,
) -> Result<Json<CreateRecurringBookingResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        location_id = req.location_id,
        frequency = %req.recurrence.frequency,
        strategy = %req.recurrence.conflict_strategy,
        "Handling create_recurring_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateRecurringBookingResponse = create_recurring_booking(
        &mut persistence,
        &req.to_request(),
        &req.attribution.actor(),
        req.attribution.cause(),
        &LogNotifier,
    )?;
    drop(persistence);

    info!(rule_id = response.rule_id, "Recurring booking handled");

    Ok(Json(response))
}

/// Handler for POST /`recurring_bookings`/preview endpoint.
///
/// Dry-runs a series expansion, flagging conflicted occurrences.
async fn handle_preview_recurring_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RecurringBookingApiRequest>,
) -> Result<Json<PreviewRecurringBookingResponse>, HttpError> {
    info!(
        location_id = req.location_id,
        frequency = %req.recurrence.frequency,
        "Handling preview_recurring_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: PreviewRecurringBookingResponse =
        preview_recurring_booking(&mut persistence, &req.to_request())?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/recurring_bookings/{rule_id}/cancel` endpoint.
async fn handle_cancel_series(
    AxumState(app_state): AxumState<AppState>,
    Path(rule_id): Path<i64>,
    Json(req): Json<CancelSeriesApiRequest>,
) -> Result<Json<CancelSeriesResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        rule_id,
        scope = %req.scope,
        "Handling cancel_series request"
    );

    let request: CancelSeriesRequest = CancelSeriesRequest {
        scope: req.scope.clone(),
        index: req.index,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: CancelSeriesResponse = cancel_series(
        &mut persistence,
        rule_id,
        &request,
        &req.attribution.actor(),
        req.attribution.cause(),
        &LogNotifier,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/class_events/{class_event_id}/book` endpoint.
async fn handle_class_book(
    AxumState(app_state): AxumState<AppState>,
    Path(class_event_id): Path<i64>,
    Json(req): Json<ClassActionApiRequest>,
) -> Result<Json<ClassBookingResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        class_event_id,
        customer_id = req.customer_id,
        "Handling class_book request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ClassBookingResponse = class_book(
        &mut persistence,
        class_event_id,
        &ClassBookRequest {
            customer_id: req.customer_id,
        },
        &req.attribution.actor(),
        req.attribution.cause(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/class_events/{class_event_id}/cancel` endpoint.
async fn handle_class_cancel(
    AxumState(app_state): AxumState<AppState>,
    Path(class_event_id): Path<i64>,
    Json(req): Json<ClassActionApiRequest>,
) -> Result<Json<ClassCancelResponse>, HttpError> {
    info!(
        actor_id = %req.attribution.actor_id,
        class_event_id,
        customer_id = req.customer_id,
        "Handling class_cancel request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ClassCancelResponse = class_cancel(
        &mut persistence,
        class_event_id,
        &ClassCancelRequest {
            customer_id: req.customer_id,
        },
        &req.attribution.actor(),
        req.attribution.cause(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET /health endpoint.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/availability", get(handle_get_availability))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/audit", get(handle_booking_audit))
        .route("/bookings/{booking_id}/cancel", post(handle_cancel_booking))
        .route(
            "/bookings/{booking_id}/reschedule",
            post(handle_reschedule_booking),
        )
        .route(
            "/bookings/{booking_id}/status",
            post(handle_transition_booking),
        )
        .route("/recurring_bookings", post(handle_create_recurring_booking))
        .route(
            "/recurring_bookings/preview",
            post(handle_preview_recurring_booking),
        )
        .route(
            "/recurring_bookings/{rule_id}/cancel",
            post(handle_cancel_series),
        )
        .route(
            "/class_events/{class_event_id}/book",
            post(handle_class_book),
        )
        .route(
            "/class_events/{class_event_id}/cancel",
            post(handle_class_cancel),
        )
        .route("/health", get(handle_health))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Agenda Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_domain::{PlanType, Service, Staff, StaffPlan, WeekLabel, WorkingInterval};
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use time::macros::{date, time};
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
        }
    }

    /// Seeds one staff member with a 60-minute service and a weekday
    /// plan. Returns `(staff_id, service_id)`.
    async fn seed_catalog(app_state: &AppState) -> (i64, i64) {
        let mut persistence = app_state.persistence.lock().await;
        let member: Staff = persistence
            .create_staff(&Staff {
                staff_id: None,
                business_id: 1,
                location_id: 1,
                display_name: String::from("Dana"),
            })
            .expect("staff");
        let service: Service = persistence
            .create_service(
                &Service::new(1, 1, String::from("Consultation"), 60, 0, 5000).expect("service"),
            )
            .expect("service row");
        let staff_id: i64 = member.staff_id.expect("staff id");
        let service_id: i64 = service.service_id.expect("service id");
        persistence
            .assign_service_to_staff(staff_id, service_id)
            .expect("assignment");

        let intervals: Vec<(WeekLabel, WorkingInterval)> = (1..=5)
            .map(|day| {
                (
                    WeekLabel::A,
                    WorkingInterval::new(day, time!(09:00), time!(17:00)).expect("interval"),
                )
            })
            .collect();
        persistence
            .create_staff_plan(&StaffPlan {
                plan_id: None,
                staff_id,
                plan_type: PlanType::Weekly,
                valid_from: date!(2025-01-06),
                valid_to: None,
                intervals,
            })
            .expect("plan");
        drop(persistence);

        (staff_id, service_id)
    }

    fn attribution() -> Attribution {
        Attribution {
            actor_id: String::from("op-1"),
            actor_type: String::from("operator"),
            cause_id: String::from("req-1"),
            cause_description: String::from("Test request"),
        }
    }

    fn booking_body(staff_id: i64, service_id: i64, start: &str) -> CreateBookingApiRequest {
        CreateBookingApiRequest {
            attribution: attribution(),
            business_id: 1,
            location_id: 1,
            client_id: Some(7),
            items: vec![BookingItemRequest {
                service_id,
                staff_id,
                start_time: String::from(start),
            }],
            notes: None,
            idempotency_key: None,
        }
    }

    async fn post_json<T: Serialize>(app: Router, uri: &str, body: &T) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_get_booking() {
        let app_state: AppState = create_test_app_state();
        let (staff_id, service_id) = seed_catalog(&app_state).await;
        let app: Router = build_router(app_state);

        let response = post_json(
            app.clone(),
            "/bookings",
            &booking_body(staff_id, service_id, "2025-03-10 10:00:00"),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: CreateBookingResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert!(created.created);
        assert_eq!(created.booking.status, "pending");

        let get_response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/bookings/{}", created.booking.booking_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(get_response.status(), HttpStatusCode::OK);

        let get_bytes = axum::body::to_bytes(get_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let fetched: BookingInfo = serde_json::from_slice(&get_bytes).unwrap();
        assert_eq!(fetched.booking_id, created.booking.booking_id);
        assert_eq!(fetched.items[0].end_time, "2025-03-10 11:00:00");
    }

    #[tokio::test]
    async fn test_conflicting_booking_returns_conflict() {
        let app_state: AppState = create_test_app_state();
        let (staff_id, service_id) = seed_catalog(&app_state).await;
        let app: Router = build_router(app_state);

        let first = post_json(
            app.clone(),
            "/bookings",
            &booking_body(staff_id, service_id, "2025-03-10 10:00:00"),
        )
        .await;
        assert_eq!(first.status(), HttpStatusCode::OK);

        let second = post_json(
            app,
            "/bookings",
            &booking_body(staff_id, service_id, "2025-03-10 10:30:00"),
        )
        .await;
        assert_eq!(second.status(), HttpStatusCode::CONFLICT);

        let body_bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert!(error_response.error);
        let conflicts = error_response.conflicts.expect("conflicts in the 409 body");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].staff_id, staff_id);
        assert_eq!(conflicts[0].start_time, "2025-03-10 10:00:00");
        assert_eq!(conflicts[0].end_time, "2025-03-10 11:00:00");
    }

    #[tokio::test]
    async fn test_malformed_start_time_returns_bad_request() {
        let app_state: AppState = create_test_app_state();
        let (staff_id, service_id) = seed_catalog(&app_state).await;
        let app: Router = build_router(app_state);

        let response = post_json(
            app,
            "/bookings",
            &booking_body(staff_id, service_id, "next tuesday"),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_booking_returns_not_found() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/bookings/9999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_booking_and_audit_trail() {
        let app_state: AppState = create_test_app_state();
        let (staff_id, service_id) = seed_catalog(&app_state).await;
        let app: Router = build_router(app_state);

        let response = post_json(
            app.clone(),
            "/bookings",
            &booking_body(staff_id, service_id, "2025-03-10 10:00:00"),
        )
        .await;
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: CreateBookingResponse = serde_json::from_slice(&body_bytes).unwrap();
        let booking_id: i64 = created.booking.booking_id;

        let cancel = post_json(
            app.clone(),
            &format!("/bookings/{booking_id}/cancel"),
            &BookingActionApiRequest {
                attribution: attribution(),
                status: None,
            },
        )
        .await;
        assert_eq!(cancel.status(), HttpStatusCode::OK);

        let audit_response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/bookings/{booking_id}/audit"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(audit_response.status(), HttpStatusCode::OK);

        let audit_bytes = axum::body::to_bytes(audit_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let trail: AuditTrailResponse = serde_json::from_slice(&audit_bytes).unwrap();
        assert_eq!(trail.events.len(), 2);
        assert_eq!(trail.events[0].action_name, "CreateBooking");
        assert_eq!(trail.events[1].action_name, "CancelBooking");
    }

    #[tokio::test]
    async fn test_recurring_booking_roundtrip() {
        let app_state: AppState = create_test_app_state();
        let (staff_id, service_id) = seed_catalog(&app_state).await;
        let app: Router = build_router(app_state);

        let request: RecurringBookingApiRequest = RecurringBookingApiRequest {
            attribution: attribution(),
            business_id: 1,
            location_id: 1,
            client_id: Some(7),
            items: vec![BookingItemRequest {
                service_id,
                staff_id,
                start_time: String::from("2025-03-10 10:00:00"),
            }],
            notes: None,
            recurrence: RecurrenceRuleRequest {
                frequency: String::from("weekly"),
                interval_value: 1,
                max_occurrences: Some(3),
                end_date: None,
                conflict_strategy: String::from("skip"),
                days_of_week: None,
                day_of_month: None,
            },
        };

        let response = post_json(app, "/recurring_bookings", &request).await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let series: CreateRecurringBookingResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(series.outcomes.len(), 3);
        assert!(series.outcomes.iter().all(|o| o.outcome == "created"));
    }

    #[tokio::test]
    async fn test_class_booking_fills_then_conflicts() {
        let app_state: AppState = create_test_app_state();
        {
            let mut persistence = app_state.persistence.lock().await;
            persistence
                .create_class_event(
                    &agenda_domain::ClassEvent::new(
                        1,
                        1,
                        String::from("Morning Yoga"),
                        time::macros::datetime!(2025-03-10 09:00:00),
                        time::macros::datetime!(2025-03-10 10:00:00),
                        1,
                        0,
                        false,
                    )
                    .expect("class event"),
                )
                .expect("stored");
        }
        let app: Router = build_router(app_state);

        let book = post_json(
            app.clone(),
            "/class_events/1/book",
            &ClassActionApiRequest {
                attribution: attribution(),
                customer_id: 100,
            },
        )
        .await;
        assert_eq!(book.status(), HttpStatusCode::OK);

        let full = post_json(
            app,
            "/class_events/1/book",
            &ClassActionApiRequest {
                attribution: attribution(),
                customer_id: 101,
            },
        )
        .await;
        assert_eq!(full.status(), HttpStatusCode::CONFLICT);
    }
}
