use std::path::Path;

use foldermenu_core::launcher::{LaunchError, Launcher};
use windows::core::{w, PCWSTR};
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

use crate::wide::wide;

pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        let wide_path = wide(path);

        let result = unsafe {
            ShellExecuteW(
                None,
                w!("open"),
                PCWSTR(wide_path.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                SW_SHOWNORMAL,
            )
        };

        // ShellExecuteW reports success with any value above 32.
        let code = result.0 as isize;
        if code > 32 {
            Ok(())
        } else {
            Err(LaunchError::new(path, shell_error_message(code)))
        }
    }
}

fn shell_error_message(code: isize) -> String {
    let message = match code {
        0 | 8 => "The operating system is out of memory or resources.",
        2 => "The system cannot find the file specified.",
        3 => "The system cannot find the path specified.",
        5 => "Access is denied.",
        11 => "The .exe file is invalid.",
        26 => "A sharing violation occurred.",
        27 => "The file name association is incomplete or invalid.",
        28 => "The DDE transaction timed out.",
        29 => "The DDE transaction failed.",
        30 => "The DDE transaction could not be completed because other DDE transactions were being processed.",
        31 => "There is no application associated with the given file name extension.",
        32 => "The specified DLL was not found.",
        _ => return format!("ShellExecute failed with code {code}."),
    };
    message.to_string()
}
