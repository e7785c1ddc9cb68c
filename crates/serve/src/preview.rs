// crates/serve/src/preview.rs

//! Visual-editor bridge for preview requests.
//!
//! The bridge is a browser script owned by the CMS. We inject a small loader
//! into `<head>` that acquires it, subscribes to editor events and tears both
//! down on `pagehide`. What each event does is decided here, in
//! [`RELOAD_POLICY`], and serialised into the loader.

use crate::render::{error::RenderError, html_rewriter};
use serde_json::{json, Map, Value as Json};
use std::time::Duration;

/// Delay applied to bursts of `input` events while an editor types.
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    Input,
    Published,
    Change,
}

impl BridgeEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeEvent::Input => "input",
            BridgeEvent::Published => "published",
            BridgeEvent::Change => "change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    Immediate,
    Debounced(Duration),
}

impl ReloadPolicy {
    fn delay_ms(&self) -> u128 {
        match self {
            ReloadPolicy::Immediate => 0,
            ReloadPolicy::Debounced(d) => d.as_millis(),
        }
    }
}

pub const RELOAD_POLICY: &[(BridgeEvent, ReloadPolicy)] = &[
    (BridgeEvent::Input, ReloadPolicy::Debounced(INPUT_DEBOUNCE)),
    (BridgeEvent::Published, ReloadPolicy::Immediate),
    (BridgeEvent::Change, ReloadPolicy::Immediate),
];

pub fn policy_for(event: BridgeEvent) -> ReloadPolicy {
    RELOAD_POLICY
        .iter()
        .find(|(e, _)| *e == event)
        .map(|(_, p)| *p)
        .unwrap_or(ReloadPolicy::Immediate)
}

const LOADER: &str = r#"(function () {
  var config = __CONFIG__;
  var timer = null;
  var script = document.createElement("script");
  function reload() { window.location.reload(); }
  function teardown() {
    if (timer !== null) { clearTimeout(timer); timer = null; }
    if (script.parentNode) { script.parentNode.removeChild(script); }
    window.removeEventListener("pagehide", teardown);
  }
  script.src = config.scriptUrl;
  script.async = true;
  script.onload = function () {
    if (typeof window.StoryblokBridge === "undefined") { return; }
    var bridge = new window.StoryblokBridge({ accessToken: config.accessToken });
    Object.keys(config.events).forEach(function (name) {
      var delay = config.events[name];
      bridge.on(name, function () {
        if (timer !== null) { clearTimeout(timer); timer = null; }
        if (delay > 0) { timer = setTimeout(reload, delay); } else { reload(); }
      });
    });
  };
  script.onerror = function () {
    console.error("preview bridge failed to load: " + config.scriptUrl);
  };
  document.head.appendChild(script);
  window.addEventListener("pagehide", teardown);
  window.storefrontPreviewTeardown = teardown;
})();"#;

#[derive(Debug, Clone)]
pub struct PreviewBridge {
    script_url: String,
    access_token: String,
}

impl PreviewBridge {
    pub fn new(script_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
            access_token: access_token.into(),
        }
    }

    /// The `<script>` element to place in `<head>`.
    pub fn snippet(&self) -> String {
        let events: Map<String, Json> = RELOAD_POLICY
            .iter()
            .map(|(event, policy)| (event.as_str().to_owned(), json!(policy.delay_ms() as u64)))
            .collect();

        let config = json!({
            "scriptUrl": self.script_url,
            "accessToken": self.access_token,
            "events": events,
        });
        // keep the config from closing the script element early
        let config = config.to_string().replace('<', "\\u003c");

        format!(
            "<script data-preview-bridge>{}</script>",
            LOADER.replace("__CONFIG__", &config)
        )
    }

    /// Append the snippet to the document head.
    pub fn inject(&self, html: &str) -> Result<String, RenderError> {
        html_rewriter::append_to_head(html, &self.snippet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_debounced_and_publish_is_immediate() {
        assert_eq!(
            policy_for(BridgeEvent::Input),
            ReloadPolicy::Debounced(Duration::from_millis(1000))
        );
        assert_eq!(policy_for(BridgeEvent::Published), ReloadPolicy::Immediate);
        assert_eq!(policy_for(BridgeEvent::Change), ReloadPolicy::Immediate);
    }

    #[test]
    fn snippet_carries_policy_and_teardown() {
        let bridge = PreviewBridge::new("//app.storyblok.com/f/storyblok-v2-latest.js", "tok");
        let snippet = bridge.snippet();
        assert!(snippet.contains(r#""input":1000"#));
        assert!(snippet.contains(r#""published":0"#));
        assert!(snippet.contains(r#""accessToken":"tok""#));
        assert!(snippet.contains("pagehide"));
        assert!(snippet.contains("removeChild(script)"));
    }

    #[test]
    fn config_cannot_break_out_of_script() {
        let bridge = PreviewBridge::new("x", "</script><script>alert(1)</script>");
        let snippet = bridge.snippet();
        assert_eq!(snippet.matches("</script>").count(), 1);
    }

    #[test]
    fn inject_places_snippet_inside_head() {
        let bridge = PreviewBridge::new("x", "tok");
        let html = bridge
            .inject("<html><head><title>t</title></head><body></body></html>")
            .unwrap();
        let script = html.find("data-preview-bridge").unwrap();
        assert!(script > html.find("<title>").unwrap());
        assert!(script < html.find("</head>").unwrap());
    }
}
