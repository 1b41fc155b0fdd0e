//! メインウィンドウ（tao + wry）
//!
//! - ページ読み込み完了まで非表示
//! - ページ側には platform / versions だけを公開
//! - 別オリジンへの遷移と新規ウィンドウは既定のブラウザで開く

use anyhow::{Context, Result};
use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::window::WindowBuilder;
use wry::{PageLoadEvent, WebViewBuilder};

use crate::config::WindowConfig;

#[derive(Debug, Clone, Copy)]
enum UserEvent {
    PageLoaded,
}

/// 終了時の後始末（何度呼ばれても1回だけ実行）
struct QuitHook<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> QuitHook<F> {
    fn new(hook: F) -> Self {
        Self(Some(hook))
    }

    fn fire(&mut self) -> bool {
        match self.0.take() {
            Some(hook) => {
                hook();
                true
            }
            None => false,
        }
    }
}

/// アプリ終了の意図を表すイベントか
///
/// メニューやCmd+Qでの終了は CloseRequested を経ずに LoopDestroyed だけが届く
fn is_quit_intent(event: &Event<'_, UserEvent>) -> bool {
    matches!(
        event,
        Event::LoopDestroyed
            | Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            }
    )
}

/// ページに公開する情報
pub fn bridge_script() -> String {
    let versions = serde_json::json!({
        "platform": std::env::consts::OS,
        "versions": {
            "app": env!("CARGO_PKG_VERSION"),
            "webview": wry::webview_version().unwrap_or_default(),
        },
    });
    format!(
        "Object.defineProperty(window, 'desktop', {{ value: Object.freeze({}), writable: false }});",
        versions
    )
}

/// URLのオリジン（scheme://host:port）
pub fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")? + 3;
    let rest = &url[scheme_end..];
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&url[..scheme_end + host_end])
}

/// アプリ内で開いてよいURLか
pub fn is_internal(url: &str, app_origin: &str) -> bool {
    if url.starts_with("about:") || url.starts_with("blob:") || url.starts_with("data:") {
        return true;
    }
    origin_of(url).is_some_and(|o| o.eq_ignore_ascii_case(app_origin))
}

fn open_external(url: &str) {
    tracing::info!(url, "opening in external browser");
    if let Err(e) = open::that(url) {
        tracing::warn!(url, error = %e, "failed to open external url");
    }
}

/// ウィンドウを開いてイベントループを回す（戻らない）
///
/// # Arguments
/// * `config` - サイズ・タイトル
/// * `url` - 読み込むサーバーURL
/// * `dev_tools` - 開発者ツールを有効化
/// * `on_quit` - 終了直前に1度だけ呼ぶ
pub fn run<F>(config: &WindowConfig, url: &str, dev_tools: bool, on_quit: F) -> Result<()>
where
    F: FnOnce() + 'static,
{
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_min_inner_size(LogicalSize::new(config.min_width, config.min_height))
        .with_visible(false)
        .build(&event_loop)
        .context("create window")?;

    let nav_origin = origin_of(url).unwrap_or(url).to_string();

    #[cfg(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    ))]
    let builder = WebViewBuilder::new(&window);
    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    )))]
    let builder = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().context("gtk container")?;
        WebViewBuilder::new_gtk(vbox)
    };

    let webview = builder
        .with_url(url)
        .with_initialization_script(&bridge_script())
        .with_devtools(dev_tools)
        .with_navigation_handler(move |target: String| {
            if is_internal(&target, &nav_origin) {
                return true;
            }
            open_external(&target);
            false
        })
        .with_new_window_req_handler(|target: String| {
            open_external(&target);
            false
        })
        .with_on_page_load_handler(move |event, _url| {
            if let PageLoadEvent::Finished = event {
                let _ = proxy.send_event(UserEvent::PageLoaded);
            }
        })
        .build()
        .context("create webview")?;

    tracing::info!(%url, "window created, waiting for first paint");

    let mut on_quit = QuitHook::new(on_quit);
    let mut shown = false;
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        let _ = &webview;

        if is_quit_intent(&event) {
            if on_quit.fire() {
                tracing::info!("quit requested, backend shutdown done");
            }
            *control_flow = ControlFlow::Exit;
            return;
        }

        if let Event::UserEvent(UserEvent::PageLoaded) = event {
            if !shown {
                shown = true;
                window.set_visible(true);
                window.set_focus();
            }
        }
    })
}
