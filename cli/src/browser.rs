//! Terminal-side implementations of the core's browser and clipboard traits.
//!
//! A new browsing context is the platform opener (`xdg-open`, `open`, `start`).
//! The "current context" is the terminal itself, so falling back means showing
//! the link for the user. Commands print ready links to stdout either way.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use mealflow_core::{
    Browser, BrowserError, Clipboard, ClipboardError, Notifier, Target, WindowHandle,
};

pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

/// The opener process. It counts as closed once it has exited unsuccessfully.
struct OpenerHandle {
    child: Mutex<Child>,
}

impl WindowHandle for OpenerHandle {
    fn closed(&self) -> Option<bool> {
        let mut child = self.child.lock().ok()?;
        match child.try_wait() {
            Ok(Some(status)) => Some(!status.success()),
            Ok(None) => Some(false),
            Err(_) => None,
        }
    }

    fn focus(&self) {}

    fn close(&self) {
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
        }
    }
}

impl Browser for SystemBrowser {
    fn open(
        &self,
        url: &str,
        target: &Target,
    ) -> Result<Option<Box<dyn WindowHandle>>, BrowserError> {
        let child = Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BrowserError::OpenFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(url, target = target.as_str(), pid = child.id(), "spawned system opener");
        Ok(Some(Box::new(OpenerHandle {
            child: Mutex::new(child),
        })))
    }

    fn navigate_current(&self, url: &str) {
        eprintln!("Не вдалося відкрити браузер. Відкрийте посилання вручну:\n{}", url);
    }
}

/// Prints the copied text; terminals have no clipboard we can rely on.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        println!("Скопіюйте посилання:\n{}", text);
        Ok(())
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
