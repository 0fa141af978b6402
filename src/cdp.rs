//! Chrome DevTools Protocol rendering backend
//!
//! Drives a throwaway headless Chrome instance through the `headless_chrome`
//! crate. Each [`CdpRenderer`] owns exactly one browser process and one tab;
//! `close` drops both so the child process dies before the retry loop moves
//! on.

use crate::render::{RenderBackend, RenderedImage, RenderedPage};
use crate::{AnalyzerConfig, Error, Result};
use headless_chrome::browser::tab::Tab;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// In-page script: directive detection under the same normalized-substring
/// policy as the static pass. Returns a boolean.
const DIRECTIVE_SCRIPT: &str = r#"
(() => {
    try {
        const wanted = 'max-image-preview:large';
        const normalize = (s) => s
            .toLowerCase()
            .split(',').map(t => t.trim()).join(',')
            .replace(/ : /g, ':').replace(/: /g, ':').replace(/ :/g, ':');
        for (const meta of document.getElementsByTagName('meta')) {
            const name = (meta.getAttribute('name') || '').toLowerCase();
            const content = meta.content || '';
            if (name !== 'robots' && !content.toLowerCase().includes('max-image-preview')) {
                continue;
            }
            if (normalize(content).includes(wanted)) {
                return true;
            }
        }
        return normalize(document.documentElement.innerHTML).includes(wanted);
    } catch (e) {
        return false;
    }
})()
"#;

/// In-page script: every rendered image's current source and natural
/// dimensions, serialized to JSON so the value crosses CDP as one string.
const IMAGES_SCRIPT: &str = r#"
(() => {
    try {
        return JSON.stringify(Array.from(document.images).map(img => ({
            src: img.currentSrc || img.src || '',
            width: img.naturalWidth || 0,
            height: img.naturalHeight || 0
        })));
    } catch (e) {
        return '[]';
    }
})()
"#;

/// Rendering backend backed by a dedicated headless Chrome process
pub struct CdpRenderer {
    browser: Browser,
    tab: Arc<Tab>,
    settle: Duration,
}

impl CdpRenderer {
    /// Launch a fresh browser with the oversized viewport and browser UA the
    /// pipeline needs for lazy-loaded images to materialize.
    pub fn open(config: &AnalyzerConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::Render(format!("failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Render(format!("failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Render(format!("failed to create tab: {}", e)))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| Error::Render(format!("failed to set user agent: {}", e)))?;

        tab.set_default_timeout(config.page_timeout);

        Ok(Self {
            browser,
            tab,
            settle: config.settle,
        })
    }

    fn evaluate_string(&self, script: &str) -> Result<String> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::Render(format!("evaluation failed: {}", e)))?;

        match result.value {
            Some(v) if v.is_string() => Ok(v.as_str().unwrap_or_default().to_string()),
            Some(v) => Ok(v.to_string()),
            None => Err(Error::Render("no value returned from evaluation".into())),
        }
    }

    fn evaluate_bool(&self, script: &str) -> Result<bool> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::Render(format!("evaluation failed: {}", e)))?;

        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

impl RenderBackend for CdpRenderer {
    fn load_and_wait(&mut self, url: &str) -> Result<RenderedPage> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Render(format!("navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Render(format!("wait for navigation failed: {}", e)))?;

        // Give late network activity (lazy loaders, deferred scripts) a
        // moment to finish before reading geometry.
        std::thread::sleep(self.settle);

        let directive_found = self.evaluate_bool(DIRECTIVE_SCRIPT)?;

        let raw = self.evaluate_string(IMAGES_SCRIPT)?;
        let images: Vec<RenderedImage> = serde_json::from_str(&raw)
            .map_err(|e| Error::Render(format!("malformed image list from page: {}", e)))?;

        debug!("rendered pass saw {} img elements on {}", images.len(), url);

        Ok(RenderedPage {
            directive_found,
            images,
        })
    }

    fn close(self) -> Result<()> {
        // Drop tab then browser so the child Chrome process terminates
        // before the caller's next attempt.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
