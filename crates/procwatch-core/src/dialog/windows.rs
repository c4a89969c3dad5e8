use anyhow::{Context, Result};
use async_trait::async_trait;
use windows::core::HSTRING;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, IDCANCEL, IDNO, IDYES, MB_ICONEXCLAMATION, MB_YESNOCANCEL,
};

use super::{Dialog, PromptChoice};

/// Native Win32 message box
#[derive(Debug, Default)]
pub struct MessageBoxDialog;

#[async_trait]
impl Dialog for MessageBoxDialog {
    async fn show_yes_no_cancel(&self, title: &str, text: &str) -> Result<PromptChoice> {
        let (title, text) = (HSTRING::from(title), HSTRING::from(text));
        let pressed = tokio::task::spawn_blocking(move || unsafe {
            MessageBoxW(HWND(0), &text, &title, MB_YESNOCANCEL | MB_ICONEXCLAMATION)
        })
        .await
        .context("Message box task failed")?;

        match pressed {
            IDYES => Ok(PromptChoice::Yes),
            IDNO => Ok(PromptChoice::No),
            IDCANCEL => Ok(PromptChoice::Cancel),
            other => anyhow::bail!("MessageBoxW returned unexpected result {}", other.0),
        }
    }
}
