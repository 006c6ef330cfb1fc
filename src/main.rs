#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
mod icon;
#[cfg(windows)]
mod launcher;
#[cfg(windows)]
mod notify;
#[cfg(windows)]
mod popup;
#[cfg(windows)]
mod wide;

use std::process::ExitCode;

#[cfg(windows)]
fn main() -> ExitCode {
    use foldermenu_core::config::{Config, CONFIG_FILE_NAME};
    use foldermenu_core::lister::FsLister;
    use foldermenu_core::session::{announce_startup, report_config_error, Session};

    init_logging();
    let _com = ComApartment::init();

    let notifier = notify::MessageBoxNotifier;
    let config_path = Config::config_path().unwrap_or_else(|| CONFIG_FILE_NAME.into());

    let startup = match Config::bootstrap(&config_path, dirs::home_dir().as_deref()) {
        Ok(startup) => startup,
        Err(err) => {
            report_config_error(&err, &notifier);
            return ExitCode::FAILURE;
        }
    };
    announce_startup(&startup, &config_path, &notifier);

    let session = Session::start(
        &startup.root_path,
        FsLister::new(startup.show_hidden),
        icon::ShellIcons::new(startup.show_icons),
        launcher::ShellLauncher,
        notifier,
    );

    if popup::run(session) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(not(windows))]
fn main() -> ExitCode {
    init_logging();
    log::error!("foldermenu only runs on Windows");
    ExitCode::FAILURE
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Shell icon and launch calls expect COM on the calling thread.
#[cfg(windows)]
struct ComApartment {
    initialized: bool,
}

#[cfg(windows)]
impl ComApartment {
    fn init() -> Self {
        use windows::Win32::System::Com::{
            CoInitializeEx, COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE,
        };

        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE) };
        if hr.is_err() {
            log::warn!("CoInitializeEx failed: {hr:?}");
        }
        Self {
            initialized: hr.is_ok(),
        }
    }
}

#[cfg(windows)]
impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { windows::Win32::System::Com::CoUninitialize() };
        }
    }
}
