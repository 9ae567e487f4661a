// Iris web app: prediction form, user registration, dataset API.

use super::classifier::{parse_measurement, Measurements, Predictor};
use super::models::{get_all_iris, insert_user, Iris, User};
use super::pages::{render_home, render_prediction, render_register_error, render_registered};
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::web::{lock_db, shared_db, SharedDb};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: SharedDb,
    predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(conn: Connection, predictor: Predictor) -> Self {
        Self {
            db: shared_db(conn),
            predictor: Arc::new(predictor),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/register", post(register))
        .route("/iris", get(list_iris))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Raw form values; parsed by hand so bad input re-renders the form.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionForm {
    #[serde(default)]
    pub sepal_length: String,
    #[serde(default)]
    pub sepal_width: String,
    #[serde(default)]
    pub petal_length: String,
    #[serde(default)]
    pub petal_width: String,
}

impl PredictionForm {
    pub fn measurements(&self) -> std::result::Result<Measurements, String> {
        Ok(Measurements {
            sepal_length: parse_measurement("sepal_length", &self.sepal_length)?,
            sepal_width: parse_measurement("sepal_width", &self.sepal_width)?,
            petal_length: parse_measurement("petal_length", &self.petal_length)?,
            petal_width: parse_measurement("petal_width", &self.petal_width)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET / - Home page with the prediction form
async fn index() -> Html<String> {
    Html(render_home(None))
}

/// POST /predict - Classify the submitted measurements
async fn predict(
    State(state): State<AppState>,
    Form(form): Form<PredictionForm>,
) -> Result<Response> {
    let measurements = match form.measurements() {
        Ok(m) => m,
        Err(message) => {
            return Ok((StatusCode::BAD_REQUEST, Html(render_home(Some(&message)))).into_response())
        }
    };

    let species = state
        .predictor
        .predict(&measurements)
        .map_err(|e| AppError::Prediction(format!("{:#}", e)))?;
    tracing::info!(?measurements, %species, "prediction made");

    Ok(Html(render_prediction(&measurements, &species)).into_response())
}

/// POST /register - Create a login
async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') || form.password.is_empty() {
        let page = render_register_error("A valid email and a password are required");
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    let user = hash_new_user(email.to_string(), form.password).await?;

    let conn = lock_db(&state.db)?;
    match insert_user(&conn, &user) {
        Ok(id) => {
            tracing::info!(user_id = id, "user registered");
            Ok((StatusCode::CREATED, Html(render_registered(email))).into_response())
        }
        Err(e) if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::Duplicate { .. })) => {
            let page = render_register_error("That email is already registered");
            Ok((StatusCode::CONFLICT, Html(page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Argon2 is slow on purpose; run it on the blocking pool.
async fn hash_new_user(email: String, password: String) -> Result<User> {
    tokio::task::spawn_blocking(move || User::new(&email, &password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("{:#}", e)))
}

/// GET /iris - Stored dataset rows
async fn list_iris(State(state): State<AppState>) -> Result<Json<Vec<Iris>>> {
    let conn = lock_db(&state.db)?;
    Ok(Json(get_all_iris(&conn)?))
}
