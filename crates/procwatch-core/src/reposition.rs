use anyhow::Result;
use std::time::Duration;

use crate::shutdown::ShutdownSignal;
use crate::window::{centered_position, WindowSystem};

/// Center the window titled `title` on screen and keep it on top.
///
/// Returns the new position when the window was moved, `None` when it is
/// absent or already centered.
///
/// # Errors
///
/// Returns an error if any window system call fails
pub fn reposition_once(windows: &dyn WindowSystem, title: &str) -> Result<Option<(i32, i32)>> {
    let Some(handle) = windows.find_window(title)? else {
        return Ok(None);
    };

    let rect = windows.window_rect(handle)?;
    let (x, y) = centered_position(windows.screen_size()?, rect);
    if (rect.left, rect.top) == (x, y) {
        return Ok(None);
    }

    log::debug!("Repositioning prompt at ({x}, {y})");
    windows.set_window_position(handle, x, y, true)?;
    Ok(Some((x, y)))
}

/// Periodic repositioning until shutdown. Window errors are logged and retried.
pub async fn run_reposition_loop(
    windows: Box<dyn WindowSystem>,
    prompt_title: String,
    shutdown: ShutdownSignal,
    period: Duration,
) {
    log::info!(
        "Reposition loop started for \"{prompt_title}\" (period: {}s)",
        period.as_secs_f32()
    );

    while !shutdown.is_triggered() {
        if let Err(e) = reposition_once(windows.as_ref(), &prompt_title) {
            log::warn!("Failed to reposition prompt: {e:#}");
        }

        if shutdown.is_triggered() {
            break;
        }
        tokio::time::sleep(period).await;
    }

    log::info!("Reposition loop stopped");
}
