//! 进程生命周期：Running → Closing → Terminated

use std::fmt;

use tokio::{signal, sync::watch};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Running,
    Closing,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Running => "running",
            LifecycleState::Closing => "closing",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// 生命周期状态机，状态只能向前推进
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Running);
        Self { state }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// 离开 Running 时完成的 future，用于 axum 的优雅关闭
    pub fn closing(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            // 发送端被丢弃同样视为关闭
            let _ = rx.wait_for(|s| *s != LifecycleState::Running).await;
        }
    }

    pub fn begin_closing(&self) -> bool {
        self.advance(LifecycleState::Closing)
    }

    pub fn terminate(&self) -> bool {
        self.advance(LifecycleState::Terminated)
    }

    fn advance(&self, next: LifecycleState) -> bool {
        let moved = self.state.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
        if moved {
            info!("生命周期状态 -> {}", next);
        }
        moved
    }
}

/// 等待中断信号（Ctrl+C，Unix 下还有 SIGTERM）
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C"),
        _ = terminate => info!("收到 SIGTERM"),
    }
}
