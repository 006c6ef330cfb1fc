use std::path::Path;

use foldermenu_core::icon::IconProvider;
use windows::core::PCWSTR;
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, SelectObject, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP,
};
use windows::Win32::Storage::FileSystem::FILE_FLAGS_AND_ATTRIBUTES;
use windows::Win32::UI::Shell::{SHGetFileInfoW, SHFILEINFOW, SHGFI_ICON, SHGFI_SMALLICON};
use windows::Win32::UI::WindowsAndMessaging::{DestroyIcon, DrawIconEx, DI_NORMAL, HICON};

use crate::wide::wide;

const ICON_SIZE: i32 = 16;

/// A 32-bit bitmap attached to a menu item. Deleted when dropped.
pub struct MenuBitmap(HBITMAP);

impl MenuBitmap {
    pub fn handle(&self) -> HBITMAP {
        self.0
    }
}

impl Drop for MenuBitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0.into());
        }
    }
}

/// Looks up the shell's small icon for a file.
pub struct ShellIcons {
    enabled: bool,
}

impl ShellIcons {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl IconProvider for ShellIcons {
    type Icon = MenuBitmap;

    fn small_icon(&self, path: &Path) -> Option<MenuBitmap> {
        if !self.enabled {
            return None;
        }
        let hicon = extract_small_icon(path)?;
        let bitmap = icon_to_bitmap(hicon);
        unsafe {
            let _ = DestroyIcon(hicon);
        }
        bitmap
    }
}

fn extract_small_icon(path: &Path) -> Option<HICON> {
    let wide_path = wide(path);
    unsafe {
        let mut shfi = SHFILEINFOW::default();
        let result = SHGetFileInfoW(
            PCWSTR(wide_path.as_ptr()),
            FILE_FLAGS_AND_ATTRIBUTES(0),
            Some(&mut shfi),
            std::mem::size_of::<SHFILEINFOW>() as u32,
            SHGFI_ICON | SHGFI_SMALLICON,
        );

        if result == 0 || shfi.hIcon.is_invalid() {
            return None;
        }
        Some(shfi.hIcon)
    }
}

fn icon_to_bitmap(hicon: HICON) -> Option<MenuBitmap> {
    unsafe {
        let hdc = CreateCompatibleDC(None);
        if hdc.is_invalid() {
            return None;
        }

        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: ICON_SIZE,
                biHeight: -ICON_SIZE, // top-down
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut bits = std::ptr::null_mut();
        let bitmap = match CreateDIBSection(Some(hdc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0) {
            Ok(hbm) => MenuBitmap(hbm),
            Err(_) => {
                let _ = DeleteDC(hdc);
                return None;
            }
        };

        let old = SelectObject(hdc, bitmap.handle().into());
        let drawn = DrawIconEx(hdc, 0, 0, hicon, ICON_SIZE, ICON_SIZE, 0, None, DI_NORMAL).is_ok();
        SelectObject(hdc, old);
        let _ = DeleteDC(hdc);

        drawn.then_some(bitmap)
    }
}
