use anyhow::{Context, Result};
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowW, GetSystemMetrics, GetWindowRect, SetWindowPos, HWND_NOTOPMOST, HWND_TOPMOST,
    SM_CXSCREEN, SM_CYSCREEN, SWP_NOSIZE,
};

use super::{ScreenSize, WindowHandle, WindowRect, WindowSystem};

/// Win32 window manager access
#[derive(Debug, Default)]
pub struct Win32WindowSystem;

impl Win32WindowSystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WindowSystem for Win32WindowSystem {
    fn find_window(&self, title: &str) -> Result<Option<WindowHandle>> {
        let title = HSTRING::from(title);
        let hwnd = unsafe { FindWindowW(PCWSTR::null(), &title) };
        if hwnd.0 == 0 {
            Ok(None)
        } else {
            Ok(Some(WindowHandle(hwnd.0)))
        }
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(HWND(handle.0), &mut rect) }
            .context("GetWindowRect failed")?;
        Ok(WindowRect {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        })
    }

    fn set_window_position(
        &self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        topmost: bool,
    ) -> Result<()> {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        unsafe { SetWindowPos(HWND(handle.0), insert_after, x, y, 0, 0, SWP_NOSIZE) }
            .context("SetWindowPos failed")?;
        Ok(())
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width == 0 || height == 0 {
            anyhow::bail!("GetSystemMetrics returned an empty screen");
        }
        Ok(ScreenSize { width, height })
    }
}
