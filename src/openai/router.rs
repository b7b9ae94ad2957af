//! OpenAI API 路由配置

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};

use crate::banana::client::BananaClient;
use crate::common::auth::{self, SessionToken};

use super::handlers::{AppState, chat_completions, list_models, not_found};
use super::types::ErrorResponse;

/// Bearer token 认证中间件
///
/// 只检查格式，token 作为 [`SessionToken`] 交给 handler 转发给上游
async fn auth_middleware(mut request: Request<Body>, next: Next) -> Response {
    match auth::extract_bearer_token(&request) {
        Some(token) => {
            request.extensions_mut().insert(SessionToken(token));
            next.run(request).await
        }
        None => {
            tracing::warn!("缺少或无效的 Authorization 请求头");
            let error = ErrorResponse::authentication_error();
            (StatusCode::UNAUTHORIZED, Json(error)).into_response()
        }
    }
}

/// CORS 中间件层
fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 创建 OpenAI API 路由
///
/// # 端点
/// - `GET /v1/models` - 尺寸 × 宽高比组合的模型列表
/// - `POST /v1/chat/completions` - 生成图片
///
/// # 认证
/// `/v1/chat/completions` 需要 `Authorization: Bearer <token>`，
/// token 作为上游 session cookie 使用。
///
/// 请求体不设大小上限：edit 模式的 data URI 参考图常超过默认的 2 MB。
///
/// 其余路径和方法返回 404。
pub fn create_router(banana: BananaClient) -> Router {
    let state = AppState::new(banana);

    let v1_routes = Router::new()
        .route("/models", get(list_models).fallback(not_found))
        .route(
            "/chat/completions",
            post(chat_completions)
                .route_layer(middleware::from_fn(auth_middleware))
                .layer(DefaultBodyLimit::disable())
                .fallback(not_found),
        );

    Router::new()
        .nest("/v1", v1_routes)
        .fallback(not_found)
        .layer(cors_layer())
        .with_state(state)
}
