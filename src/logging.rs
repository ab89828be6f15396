use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベルを指定する環境変数（`WARDROBE_LOG=debug` など）
pub const LOG_ENV: &str = "WARDROBE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// 環境変数からフィルタを作る。未設定・不正な値なら既定値
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// stderr 向けのサブスクライバを登録する（2 回目以降の呼び出しは無視される）
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
