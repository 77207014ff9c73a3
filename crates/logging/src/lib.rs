use common::config;
use once_cell::sync::Lazy;
pub use slog::*;
use slog_async::AsyncGuard;
use std::sync::Mutex;

static GUARD: Lazy<Mutex<Option<AsyncGuard>>> = Lazy::new(|| Mutex::new(None));

fn wrap<D>(drain: D) -> IgnoreResult<slog_async::Async>
where
    D: Drain<Err = Never, Ok = ()> + Send + 'static,
{
    let (drain, guard) = slog_async::Async::new(slog_envlogger::new(drain))
        .chan_size(2 << 12)
        .thread_name("slog-async".into())
        .build_with_guard();
    if let Ok(mut slot) = GUARD.lock() {
        *slot = Some(guard);
    }
    drain.ignore_res()
}

/// 非同期ドレインのキューを書き出し、ワーカースレッドを終了させる。
///
/// プロセス終了前に呼ぶ。以降のログは捨てられる。
pub fn flush() {
    let guard = GUARD.lock().ok().and_then(|mut slot| slot.take());
    drop(guard);
}

/// プロセス共通のルートロガー。
///
/// 出力形式は `RUST_LOG_FORMAT`（`json` または `term`）、レベルは `RUST_LOG` で切り替える。
/// 標準出力は解析結果の表示に使うため、ログは標準エラーに出す。
pub static DEFAULT: Lazy<Logger> = Lazy::new(|| {
    let mk_term = || {
        slog_term::FullFormat::new(slog_term::TermDecorator::new().stderr().build())
            .build()
            .fuse()
    };

    let mk_json = || slog_json::Json::default(std::io::stderr()).fuse();

    let format = config::get("RUST_LOG_FORMAT").unwrap_or_default();
    let drain = match format.as_str() {
        "json" => wrap(mk_json()),
        _ => wrap(mk_term()),
    };

    Logger::root(
        drain,
        o!(
            "version" => env!("CARGO_PKG_VERSION"),
        ),
    )
});
