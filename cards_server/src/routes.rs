use std::path::Path as FsPath;

use axum::{
    extract::{rejection::FormRejection, Form, Path, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, warn};

use cards_core::{Action, Card, ShuffleKind, Snapshot};

use crate::error::ServerError;
use crate::render;
use crate::SharedState;

/// 把 HTTP 路径映射到牌堆动作。动作路径同时接受 GET 和 POST。
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping).post(ping))
        .route("/draw", get(draw).post(draw))
        .route("/reset", get(reset).post(reset))
        .route("/shuffle_random", get(shuffle_random).post(shuffle_random))
        .route("/shuffle_3waycut", get(shuffle_three_way_cut).post(shuffle_three_way_cut))
        .route("/shuffle_riffle", get(shuffle_riffle).post(shuffle_riffle))
        .route("/shutdown", get(shutdown).post(shutdown))
        .route("/state", get(state_json))
        .route("/find", get(find))
        .route("/findimpl", get(find_impl).post(find_impl))
        .route("/res/{name}", get(resource))
        .fallback(not_found)
        .with_state(state)
}

// --- 页面 ---

/// 主页面，会消费掉待显示的消息
async fn index(State(state): State<SharedState>) -> Response {
    let snapshot = state.controller.page_state();
    html_response(render::index_page(&snapshot), "no-cache")
}

async fn find() -> Response {
    html_response(render::find_form(), "public")
}

/// 处理选牌表单：查找这张牌，把结果留给下一次主页面渲染，然后跳回主页。
/// 表单无法解析或没有选中任何牌时，当作没有选牌，并清除旧的消息。
async fn find_impl(
    State(state): State<SharedState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let card = match form {
        Ok(Form(fields)) => selected_card(&fields),
        Err(rejection) => {
            warn!(%rejection, "无法解析选牌表单");
            None
        }
    };
    match card {
        Some(card) => {
            state.controller.perform(Action::Find(card));
        }
        None => {
            debug!("选牌表单中没有选中任何牌，清除待显示的消息");
            state.controller.take_message();
        }
    }
    html_response(render::redirect_page(), "no-cache")
}

/// 图片按钮提交的字段名形如 "ace of spades.x"
fn selected_card(fields: &[(String, String)]) -> Option<Card> {
    fields
        .iter()
        .find_map(|(name, _)| name.strip_suffix(".x")?.parse().ok())
}

// --- 状态片段 ---

async fn ping(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Refresh)
}

async fn draw(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Draw)
}

async fn reset(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Reset)
}

async fn shuffle_random(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Shuffle(ShuffleKind::Random))
}

async fn shuffle_three_way_cut(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Shuffle(ShuffleKind::ThreeWayCut))
}

async fn shuffle_riffle(State(state): State<SharedState>) -> Response {
    fragment(&state, Action::Shuffle(ShuffleKind::Riffle))
}

/// 先回复，再通知服务器优雅关闭
async fn shutdown(State(state): State<SharedState>) -> Response {
    let response = fragment(&state, Action::Shutdown);
    state.shutdown.notify_one();
    response
}

async fn state_json(State(state): State<SharedState>) -> Json<Snapshot> {
    Json(state.controller.perform(Action::Refresh))
}

fn fragment(state: &SharedState, action: Action) -> Response {
    let snapshot = state.controller.perform(action);
    (
        [
            (header::CONTENT_TYPE, "text/xml; charset=UTF-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        render::state_fragment(&snapshot),
    )
        .into_response()
}

fn html_response(body: String, cache_control: &'static str) -> Response {
    ([(header::CACHE_CONTROL, cache_control)], Html(body)).into_response()
}

// --- 静态资源 ---

async fn resource(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response, ServerError> {
    let body = load_resource(&state.res_dir, &name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&name)),
            (header::CACHE_CONTROL, "public"),
        ],
        body,
    )
        .into_response())
}

/// 只允许读取资源目录下的单个文件名
async fn load_resource(dir: &FsPath, name: &str) -> Result<Vec<u8>, ServerError> {
    let is_plain_name = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if !is_plain_name {
        return Err(ServerError::ResourceNotFound(name.to_string()));
    }

    tokio::fs::read(dir.join(name)).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ServerError::ResourceNotFound(name.to_string())
        } else {
            ServerError::Io {
                name: name.to_string(),
                source,
            }
        }
    })
}

fn content_type(name: &str) -> &'static str {
    if name.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

async fn not_found(uri: Uri) -> StatusCode {
    debug!(%uri, "未知路径");
    StatusCode::NOT_FOUND
}

// --- 单元测试 ---
