use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

/// Characters left as-is when a URL is embedded into the image proxy path.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// How stored files are exposed to clients.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPolicy {
    /// Serve every file through the application's own `/file/{id}` route
    /// instead of a backend-native URL.
    #[serde(default = "default_proxy")]
    pub proxy: bool,
    #[serde(default)]
    pub image_proxy: ImageProxy,
}

fn default_proxy() -> bool {
    true
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            proxy: default_proxy(),
            image_proxy: ImageProxy::default(),
        }
    }
}

/// External thumbnailing service reached as `{base_url}/{w}x{h}/{escaped source url}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageProxy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_image_proxy_url")]
    pub base_url: String,
}

fn default_image_proxy_url() -> String {
    "http://localhost:8080".into()
}

impl Default for ImageProxy {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_image_proxy_url(),
        }
    }
}

impl ImageProxy {
    pub fn wrap(&self, source: &str, width: u32, height: u32) -> String {
        format!(
            "{}/{width}x{height}/{}",
            self.base_url.trim_end_matches('/'),
            query_escape(source)
        )
    }
}

impl AccessPolicy {
    /// Last step of URL resolution: route through the image proxy when enabled.
    pub fn finish(&self, url: String, width: u32, height: u32) -> String {
        if self.image_proxy.enabled {
            self.image_proxy.wrap(&url, width, height)
        } else {
            url
        }
    }
}

/// Form-style escaping: unreserved characters stay, space becomes `+`.
pub fn query_escape(s: &str) -> String {
    // '%' itself is escaped, so "%20" can only come from a space.
    utf8_percent_encode(s, QUERY_ESCAPE)
        .to_string()
        .replace("%20", "+")
}
