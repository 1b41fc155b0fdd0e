//! ブロッキングのエラーダイアログ

use rfd::{MessageButtons, MessageDialog, MessageLevel};

use crate::error::LauncherError;

pub fn show_error(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// 起動失敗の通知
pub fn show_launch_error(error: &LauncherError) {
    show_error(error.dialog_title(), &error.user_message());
}

/// 捕捉されなかったpanicもダイアログで通知する
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "uncaught panic");
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown error".to_string());
        show_error("Error", &format!("An error occurred: {}", message));
        default_hook(info);
    }));
}
