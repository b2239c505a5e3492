use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use url::Url;
use uuid::Uuid;

/// Keys the server accepts, both as headers and as query parameters.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub sdk_key: String,
    pub client_id: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            sdk_key: "test-sdk-key".to_string(),
            client_id: "test-client-id".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Link {
    pub id: Uuid,
    pub redirect: String,
    pub external_uid: Option<String>,
    pub clicks: u64,
}

#[derive(Deserialize)]
pub struct CreateLinkParams {
    #[serde(rename = "sdkKey")]
    pub sdk_key: Option<String>,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
    pub redirect: Option<String>,
    #[serde(rename = "externalUID")]
    pub external_uid: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Link>>>;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Credentials,
    pub links: Db,
}

type ApiError = (StatusCode, Json<HashMap<String, String>>);

pub fn app() -> Router {
    app_with(Credentials::default())
}

pub fn app_with(credentials: Credentials) -> Router {
    let state = AppState {
        credentials,
        links: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/create_link", post(create_link))
        .route("/l/{id}", get(follow_link))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Credentials::default()).await
}

pub async fn run_with(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(credentials)).await
}

fn error(status: StatusCode, message: &str) -> ApiError {
    let body = HashMap::from([("error".to_string(), message.to_string())]);
    (status, Json(body))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn create_link(
    State(state): State<AppState>,
    Query(params): Query<CreateLinkParams>,
    headers: HeaderMap,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let expected = &state.credentials;
    let authorized = header_str(&headers, "SDK-Key") == Some(expected.sdk_key.as_str())
        && header_str(&headers, "Client-ID") == Some(expected.client_id.as_str())
        && params.sdk_key.as_deref() == Some(expected.sdk_key.as_str())
        && params.client_id.as_deref() == Some(expected.client_id.as_str());
    if !authorized {
        tracing::warn!("rejected create_link with invalid credentials");
        return Err(error(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }

    let redirect = params
        .redirect
        .filter(|r| Url::parse(r).is_ok())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "invalid redirect"))?;

    let host = header_str(&headers, header::HOST.as_str()).unwrap_or("localhost");
    let link = Link {
        id: Uuid::new_v4(),
        redirect,
        external_uid: params.external_uid,
        clicks: 0,
    };
    let outtie_link = format!("http://{host}/l/{}", link.id);
    tracing::info!(
        id = %link.id,
        redirect = %link.redirect,
        external_uid = ?link.external_uid,
        "created link"
    );
    state.links.write().await.insert(link.id, link);

    Ok(Json(HashMap::from([("outtie_link".to_string(), outtie_link)])))
}

async fn follow_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, StatusCode> {
    let mut links = state.links.write().await;
    let link = links.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    link.clicks += 1;
    tracing::info!(
        %id,
        clicks = link.clicks,
        external_uid = link.external_uid.as_deref().unwrap_or("-"),
        "followed link"
    );
    Ok(Redirect::temporary(&link.redirect))
}
