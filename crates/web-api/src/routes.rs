use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::{request::Parts, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use application::{EditMessageRequest, PostMessageRequest};
use config::ServerConfig;

use crate::{
    dto::{MessageDto, ParticipantDto},
    error::ApiError,
    state::AppState,
};

/// 调用者身份所在的请求头
pub const USER_HEADER: &str = "user";

/// `User` 请求头的值；缺失时为 `None`，由具体操作决定如何处理。
#[derive(Debug, Clone, Default)]
pub struct UserHeader(pub Option<String>);

impl UserHeader {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn or_empty(&self) -> String {
        self.0.clone().unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for UserHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_HEADER) {
            None => Ok(UserHeader(None)),
            Some(value) => value
                .to_str()
                .map(|v| UserHeader(Some(v.to_owned())))
                .map_err(|_| ApiError::unprocessable("User header must be valid text")),
        }
    }
}

/// JSON 请求体；缺失或无法解析时统一返回 422。
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct JsonBody<T>(T);

#[derive(Debug, Deserialize)]
struct JoinPayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/participants", post(join).get(list_participants))
        .route("/messages", post(post_message).get(list_messages))
        .route("/messages/{id}", put(edit_message).delete(delete_message))
        .route("/status", post(heartbeat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` 表示允许任意来源；无法解析的来源会被忽略。
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "忽略无效的 CORS 来源");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn join(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<JoinPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .join(payload.name.as_deref().unwrap_or_default())
        .await?;
    Ok(StatusCode::CREATED)
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.registry.list().await?;
    Ok(Json(participants.into_iter().map(ParticipantDto::from).collect()))
}

async fn heartbeat(
    State(state): State<AppState>,
    user: UserHeader,
) -> Result<StatusCode, ApiError> {
    state.registry.heartbeat(&user.or_empty()).await?;
    Ok(StatusCode::OK)
}

async fn post_message(
    State(state): State<AppState>,
    user: UserHeader,
    JsonBody(payload): JsonBody<MessagePayload>,
) -> Result<StatusCode, ApiError> {
    state
        .ledger
        .post(PostMessageRequest {
            from: user.or_empty(),
            to: payload.to.unwrap_or_default(),
            text: payload.text.unwrap_or_default(),
            kind: payload.kind.unwrap_or_default(),
        })
        .await?;
    Ok(StatusCode::CREATED)
}

async fn list_messages(
    State(state): State<AppState>,
    user: UserHeader,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    // 非正整数的 limit 等同于不限制
    let limit = query.limit.and_then(|l| l.trim().parse::<usize>().ok());
    let messages = state.ledger.list_visible_tail(user.as_deref(), limit).await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

async fn edit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserHeader,
    JsonBody(payload): JsonBody<MessagePayload>,
) -> Result<Json<MessageDto>, ApiError> {
    let message = state
        .ledger
        .edit(EditMessageRequest {
            id,
            editor: user.or_empty(),
            to: payload.to.unwrap_or_default(),
            text: payload.text.unwrap_or_default(),
            kind: payload.kind.unwrap_or_default(),
        })
        .await?;
    Ok(Json(MessageDto::from(message)))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: UserHeader,
) -> Result<StatusCode, ApiError> {
    state.ledger.delete(&id, user.as_deref()).await?;
    Ok(StatusCode::OK)
}
