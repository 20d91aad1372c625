//! Chromium-backed [`PageDriver`] over the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{DriverError, PageDriver};
use crate::config::BrowserOptions;

fn session<E: std::fmt::Display>(err: E) -> DriverError {
    DriverError::Session(err.to_string())
}

/// One Chromium session with a single page reused for the whole run.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    scroll_container: Option<String>,
    timeout: Duration,
    closed: bool,
}

impl ChromiumDriver {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch a browser and open the session page.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, DriverError> {
        let chrome_path = match &options.chrome_path {
            Some(path) => path.clone(),
            None => Self::find_chrome()?,
        };

        info!("Launching browser (headless={})", options.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu"); // Recommended for headless

        for arg in &options.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(DriverError::Session)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(session)?;

        // Drive the CDP event stream for the lifetime of the session.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(session)?;

        Ok(Self {
            browser,
            page,
            handler,
            scroll_container: None,
            timeout: Duration::from_secs(options.timeout),
            closed: false,
        })
    }

    /// Scroll a specific container instead of the window. Virtualized tables
    /// only re-render when their own wrapper scrolls.
    pub fn with_scroll_container(mut self, selector: impl Into<String>) -> Self {
        self.scroll_container = Some(selector.into());
        self
    }

    /// Find a Chrome executable on this machine.
    fn find_chrome() -> Result<PathBuf, DriverError> {
        for path in Self::CHROME_PATHS {
            let candidate = Path::new(path);
            if candidate.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(candidate.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(DriverError::Session(
            "Chrome/Chromium not found; install it or set browser.chrome_path".to_string(),
        ))
    }

    /// Wait for the document to become interactive, bounded by the
    /// configured timeout. Failures are logged, never fatal: a slow page is
    /// handled by the caller's settle waits.
    async fn wait_for_ready(&self) {
        let script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete' || document.readyState === 'interactive') {
                    resolve(document.readyState);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;

        match tokio::time::timeout(self.timeout, self.page.evaluate(script.to_string())).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }

    fn js_string(value: &str) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("Navigating to {}", url);
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(DriverError::Session)?;
        self.page.execute(params).await.map_err(session)?;
        self.wait_for_ready().await;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::NotFound(selector.to_string()))?;
        element.click().await.map_err(session)?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::NotFound(selector.to_string()))?;
        element.click().await.map_err(session)?;

        // Clear whatever the storefront pre-filled before typing.
        let clear = format!(
            "(() => {{ const el = document.querySelector({}); if (el) {{ el.value = ''; }} }})()",
            Self::js_string(selector)
        );
        self.page.evaluate(clear).await.map_err(session)?;

        element.type_str(text).await.map_err(session)?;
        element.press_key("Enter").await.map_err(session)?;
        Ok(())
    }

    async fn scroll_to(&self, position: u32) -> Result<(), DriverError> {
        let script = match &self.scroll_container {
            Some(container) => format!(
                "(() => {{ const el = document.querySelector({}); if (el) {{ el.scrollTop = {}; }} }})()",
                Self::js_string(container),
                position
            ),
            None => format!("window.scrollTo(0, {position});"),
        };
        self.page.evaluate(script).await.map_err(session)?;
        Ok(())
    }

    async fn rendered_html(&self) -> Result<String, DriverError> {
        self.page.content().await.map_err(session)
    }

    async fn save_snapshot(&self, path: &Path) -> Result<(), DriverError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.page
            .save_screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
                path,
            )
            .await
            .map_err(session)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
