use foldermenu_core::notify::Notifier;
use windows::core::PCWSTR;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_OK, MB_SETFOREGROUND, MB_TOPMOST,
    MESSAGEBOX_STYLE,
};

use crate::wide::wide;

pub struct MessageBoxNotifier;

impl Notifier for MessageBoxNotifier {
    fn info(&self, title: &str, message: &str) {
        show(title, message, MB_ICONINFORMATION);
    }

    fn error(&self, title: &str, message: &str) {
        show(title, message, MB_ICONERROR);
    }
}

fn show(title: &str, message: &str, icon: MESSAGEBOX_STYLE) {
    let title = wide(title);
    let message = wide(message);
    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(message.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | icon | MB_SETFOREGROUND | MB_TOPMOST,
        );
    }
}
