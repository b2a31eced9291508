use async_trait::async_trait;
use tracing::{debug, info, warn};

#[cfg(not(target_os = "windows"))]
const APP_NAME: &str = "GitHub";
#[cfg(target_os = "macos")]
const DEFAULT_SOUND: &str = "Default";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEFAULT_SOUND: &str = "message-new-instant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub subtitle: String,
    pub link: Option<String>,
}

/// Fire-and-forget delivery of alerts. Delivery failures are never reported back.
#[async_trait]
pub trait AlertSink: Send {
    async fn dispatch(&mut self, alert: &Alert);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Desktop,
    LogOnly,
}

#[derive(Debug)]
pub struct DesktopNotifier {
    kind: NotifierKind,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopNotifier {
    pub fn new() -> Self {
        // Start optimistic; if we fail to show, we downgrade to LogOnly.
        let kind = if cfg!(target_os = "windows") {
            NotifierKind::LogOnly
        } else {
            NotifierKind::Desktop
        };
        debug!(?kind, "DesktopNotifier created");
        Self { kind }
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    async fn show(&self, alert: &Alert) -> Result<(), String> {
        let body = match &alert.link {
            Some(link) => format!("{}\n{}", alert.subtitle, link),
            None => alert.subtitle.clone(),
        };
        let mut n = notify_rust::Notification::new();
        n.appname(APP_NAME)
            .summary(&alert.title)
            .body(&body)
            .sound_name(DEFAULT_SOUND)
            .show_async()
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    #[cfg(target_os = "macos")]
    async fn show(&self, alert: &Alert) -> Result<(), String> {
        let mut n = notify_rust::Notification::new();
        n.appname(APP_NAME)
            .summary(&alert.title)
            .subtitle(&alert.subtitle)
            .body(alert.link.as_deref().unwrap_or_default())
            .sound_name(DEFAULT_SOUND);
        tokio::task::spawn_blocking(move || n.show().map(|_| ()).map_err(|e| e.to_string()))
            .await
            .map_err(|e| e.to_string())?
    }

    #[cfg(target_os = "windows")]
    async fn show(&self, _alert: &Alert) -> Result<(), String> {
        Err("desktop notifications are not supported on windows".into())
    }
}

#[async_trait]
impl AlertSink for DesktopNotifier {
    async fn dispatch(&mut self, alert: &Alert) {
        match self.kind {
            NotifierKind::Desktop => {
                if let Err(e) = self.show(alert).await {
                    warn!(error=%e, "notify-rust failed; downgrading to LogOnly notifier");
                    self.kind = NotifierKind::LogOnly;
                    log_alert(alert);
                }
            }
            NotifierKind::LogOnly => log_alert(alert),
        }
    }
}

fn log_alert(alert: &Alert) {
    info!(
        subtitle = %alert.subtitle,
        link = alert.link.as_deref().unwrap_or_default(),
        "[ALERT] {}",
        alert.title
    );
}

/// Factory for the default sink (notify-rust with log fallback)
pub fn default_sink() -> Box<dyn AlertSink> {
    Box::new(DesktopNotifier::new())
}
