use anyhow::Result;

#[cfg(target_os = "windows")]
pub mod windows;

/// Opaque native window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// Window bounds in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Access to the platform window manager
pub trait WindowSystem: Send + Sync {
    /// Find a top-level window by exact title
    fn find_window(&self, title: &str) -> Result<Option<WindowHandle>>;

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect>;

    /// Move the window's top-left corner, keeping its size
    fn set_window_position(&self, handle: WindowHandle, x: i32, y: i32, topmost: bool)
        -> Result<()>;

    fn screen_size(&self) -> Result<ScreenSize>;
}

/// Top-left corner that centers `rect` on `screen`
#[must_use]
pub const fn centered_position(screen: ScreenSize, rect: WindowRect) -> (i32, i32) {
    (
        screen.width / 2 - rect.width() / 2,
        screen.height / 2 - rect.height() / 2,
    )
}

/// Window system for platforms without a native prompt window.
///
/// Never finds a window, so repositioning is a no-op.
#[derive(Debug, Default)]
pub struct HeadlessWindowSystem;

impl WindowSystem for HeadlessWindowSystem {
    fn find_window(&self, _title: &str) -> Result<Option<WindowHandle>> {
        Ok(None)
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<WindowRect> {
        anyhow::bail!("No window system available (handle {})", handle.0)
    }

    fn set_window_position(
        &self,
        handle: WindowHandle,
        _x: i32,
        _y: i32,
        _topmost: bool,
    ) -> Result<()> {
        anyhow::bail!("No window system available (handle {})", handle.0)
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        anyhow::bail!("No window system available")
    }
}

/// Create platform-specific window system
///
/// # Errors
///
/// Returns an error if window system initialization fails
pub fn create_window_system() -> Result<Box<dyn WindowSystem>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::Win32WindowSystem::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        log::info!("No native prompt window on this platform, repositioning disabled");
        Ok(Box::new(HeadlessWindowSystem))
    }
}
