use crate::webdriver::pacing::Pacer;
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client that owns the
/// session for the duration of one run.
///
/// The caller is responsible for calling [`ProbeSession::close`] on every
/// exit path; the session is never stashed in a global.
pub struct ProbeSession {
    pub(crate) client: Client,
    pub(crate) pacer: Pacer,
}

impl ProbeSession {
    /// Connect to a running WebDriver service (Chromedriver by default on
    /// `http://localhost:9515`) and start a browser session.
    pub async fn connect(endpoint: &str, headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = vec!["--disable-extensions".to_string()];
        if headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(endpoint)
            .await
            .with_context(|| format!("failed to connect to WebDriver at {endpoint}"))?;

        Ok(Self {
            client,
            pacer: Pacer::new(),
        })
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
