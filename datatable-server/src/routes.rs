//! API routes
//!
//! | Route | Answer |
//! |-------|--------|
//! | `GET /api/users?limit=&page=&search=` | envelope of [`User`] with page metadata |
//! | `GET /api/users/with-tasks?...` | envelope of [`UserWithTasks`] with page metadata |
//! | `GET /api/users/{id}/tasks` | bare array of [`Task`] |
//!
//! Every failure is answered with `{"success": false, "error": "..."}`.

use datatable_lib::Envelope;
use datatable_lib::PageMeta;
use http_body_util::Full;
use hyper::Method;
use hyper::Response;
use hyper::StatusCode;
use hyper::Uri;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::header::HeaderValue;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::data::Dataset;
use crate::data::Task;
use crate::data::User;
use crate::data::UserWithTasks;
use crate::error::Result;
use crate::error::ServerError;

const DEFAULT_LIMIT: usize = 15;
const DEFAULT_PAGE: usize = 1;

/// Shared state of all connections.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub dataset: Dataset,
}

impl AppState {
    /// Generates the dataset described by `config`.
    pub fn new(config: ServerConfig) -> Self {
        let dataset = Dataset::generate(config.dataset_size, config.seed);
        Self { config, dataset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Users,
    UsersWithTasks,
    Tasks(u64),
}

impl Route {
    fn parse(method: &Method, path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let route = match segments.as_slice() {
            ["api", "users"] => Self::Users,
            ["api", "users", "with-tasks"] => Self::UsersWithTasks,
            ["api", "users", id, "tasks"] => {
                let id = id
                    .parse()
                    .map_err(|_| ServerError::BadRequest(format!("Invalid user id: {}", id)))?;
                Self::Tasks(id)
            }
            _ => return Err(ServerError::NotFound(format!("No route for {}", path))),
        };

        if *method != Method::GET {
            return Err(ServerError::MethodNotAllowed);
        }
        Ok(route)
    }
}

/// Query parameters of the list routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub page: usize,
    pub search: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
            search: String::new(),
        }
    }
}

impl ListQuery {
    /// Parses `limit`, `page` and `search`. Missing or empty values take the
    /// defaults; anything else that is not a positive integer is rejected.
    pub fn parse(query: Option<&str>) -> Result<Self> {
        let mut parsed = Self::default();
        let Some(query) = query else {
            return Ok(parsed);
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "limit" => {
                    if let Some(limit) = positive("limit", &value)? {
                        parsed.limit = limit;
                    }
                }
                "page" => {
                    if let Some(page) = positive("page", &value)? {
                        parsed.page = page;
                    }
                }
                "search" => parsed.search = value.into_owned(),
                _ => {}
            }
        }
        Ok(parsed)
    }
}

fn positive(name: &str, value: &str) -> Result<Option<usize>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ServerError::BadRequest(format!(
            "Invalid {} parameter: {}",
            name, value
        ))),
    }
}

/// Answers one request.
pub async fn respond(state: &AppState, method: &Method, uri: &Uri) -> Response<Full<Bytes>> {
    let response = match dispatch(state, method, uri).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("{} {} failed: {}", method, uri, e);
            error_response(&e)
        }
    };
    log::info!("{} {} -> {}", method, uri, response.status().as_u16());
    response
}

async fn dispatch(state: &AppState, method: &Method, uri: &Uri) -> Result<Response<Full<Bytes>>> {
    let config = &state.config;
    match Route::parse(method, uri.path())? {
        Route::Users => {
            tokio::time::sleep(config.users_latency).await;
            let query = ListQuery::parse(uri.query())?;
            let (users, meta) = paginate(&state.dataset, &query);
            let data: Vec<User> = users.into_iter().cloned().collect();
            json_response(StatusCode::OK, &Envelope::ok(data, Some(meta)))
                .map_err(|_| ServerError::Internal("Failed to fetch users".into()))
        }
        Route::UsersWithTasks => {
            tokio::time::sleep(config.embedded_latency).await;
            let query = ListQuery::parse(uri.query())?;
            let (users, meta) = paginate(&state.dataset, &query);
            let data: Vec<UserWithTasks> = users
                .into_iter()
                .map(|user| state.dataset.with_tasks(user))
                .collect();
            json_response(StatusCode::OK, &Envelope::ok(data, Some(meta)))
                .map_err(|_| ServerError::Internal("Failed to fetch users with tasks".into()))
        }
        Route::Tasks(user_id) => {
            tokio::time::sleep(config.tasks_latency).await;
            if config.fails_tasks_for(user_id) {
                return Err(ServerError::Internal("Failed to fetch tasks".into()));
            }
            let tasks: &[Task] = state
                .dataset
                .tasks_for(user_id)
                .ok_or_else(|| ServerError::NotFound("User not found".into()))?;
            json_response(StatusCode::OK, &tasks)
        }
    }
}

fn paginate<'a>(dataset: &'a Dataset, query: &ListQuery) -> (Vec<&'a User>, PageMeta) {
    let matching = dataset.search(&query.search);
    let meta = PageMeta::compute(matching.len(), query.page, query.limit);
    let page = matching[meta.item_range()].to_vec();
    (page, meta)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Full<Bytes>>> {
    let bytes = serde_json::to_vec(body).map_err(|e| ServerError::Internal(e.to_string()))?;
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

fn error_response(error: &ServerError) -> Response<Full<Bytes>> {
    let envelope: Envelope<()> = Envelope::failure(error.to_string());
    json_response(error.status(), &envelope).unwrap_or_else(|_| {
        let mut response = Response::new(Full::new(Bytes::from_static(b"{\"success\":false}")));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
