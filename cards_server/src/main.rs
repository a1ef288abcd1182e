use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cards_core::DeckController;

mod error;
mod render;
mod routes;

/// 在浏览器中操作一副共享的扑克牌
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// HTTP 服务器监听的端口
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// 监听的地址
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// 图片等静态资源所在的目录
    #[arg(long, default_value = "res")]
    res_dir: PathBuf,
}

// 服务器全局状态，通过 Arc 在所有连接之间共享，生命周期与进程相同
pub struct AppState {
    controller: DeckController,
    res_dir: PathBuf,
    // `/shutdown` 通过它通知服务器退出
    shutdown: Notify,
}

impl AppState {
    pub fn new(res_dir: PathBuf) -> Self {
        AppState {
            controller: DeckController::default(),
            res_dir,
            shutdown: Notify::new(),
        }
    }
}

pub type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let state = SharedState::new(AppState::new(args.res_dir));
    let app = routes::router(state.clone());

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听 {addr}"))?;
    info!("服务器正在监听 {}", addr);
    info!("请在浏览器中打开 http://localhost:{}", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("服务器已停止");
    Ok(())
}

/// 收到 `/shutdown` 请求或 Ctrl-C 时返回
async fn shutdown_signal(state: SharedState) {
    tokio::select! {
        _ = state.shutdown.notified() => info!("收到 /shutdown 请求，正在关闭"),
        _ = tokio::signal::ctrl_c() => info!("收到 Ctrl-C，正在关闭"),
    }
}
