//! Request environment used to default the endpoint URI.
//!
//! Discovery never reads process state directly; it asks a [`RequestContext`].
//! [`CgiContext`] reads the usual CGI variables, [`StaticContext`] carries fixed
//! values for tests and offline generation.

use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// Read-only view of the request that serves the WSDL
pub trait RequestContext {
    /// `true` when the request arrived over HTTPS
    fn is_https(&self) -> bool;
    /// Host header, falling back to the server name
    fn host(&self) -> String;
    /// Request path, possibly still carrying a query string
    fn request_path(&self) -> String;
    /// Name of the script or program serving the document
    fn script_name(&self) -> String;

    fn scheme(&self) -> &'static str {
        if self.is_https() {
            "https"
        } else {
            "http"
        }
    }

    /// Request path with any query parameters removed
    fn request_path_without_parameters(&self) -> String {
        let path = self.request_path();
        match path.find('?') {
            Some(pos) => path[..pos].to_string(),
            None => path,
        }
    }

    /// `scheme://host/path` of the current request
    fn endpoint_uri(&self) -> String {
        format!(
            "{}://{}{}",
            self.scheme(),
            self.host(),
            self.request_path_without_parameters()
        )
    }

    /// Script name without directory and extension, used as a document base name
    fn script_base_name(&self) -> String {
        let script = self.script_name();
        let file_name = Path::new(&script)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&script)
            .to_string();
        file_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Context backed by CGI-style variables
#[derive(Debug, Clone, Default)]
pub struct CgiContext {
    vars: HashMap<String, String>,
}

impl CgiContext {
    /// Snapshot the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.var(key))
    }
}

impl RequestContext for CgiContext {
    fn is_https(&self) -> bool {
        self.var("HTTPS")
            .map(|v| v.eq_ignore_ascii_case("on"))
            .unwrap_or(false)
    }

    fn host(&self) -> String {
        self.first_of(&["HTTP_HOST", "SERVER_NAME"])
            .unwrap_or("localhost")
            .to_string()
    }

    fn request_path(&self) -> String {
        // X-Rewrite-Url is checked first so IIS rewrites win
        self.first_of(&[
            "HTTP_X_REWRITE_URL",
            "REQUEST_URI",
            "ORIG_PATH_INFO",
            "SCRIPT_NAME",
        ])
        .unwrap_or("/")
        .to_string()
    }

    fn script_name(&self) -> String {
        if let Some(script) = self.var("SCRIPT_NAME") {
            return script.to_string();
        }
        let program = std::env::args().next().unwrap_or_default();
        debug!("SCRIPT_NAME not set, using program name {}", program);
        program
    }
}

/// Fixed context values
#[derive(Debug, Clone)]
pub struct StaticContext {
    pub https: bool,
    pub host: String,
    pub path: String,
    pub script: String,
}

impl StaticContext {
    pub fn new(host: &str, path: &str) -> Self {
        Self {
            https: false,
            host: host.to_string(),
            path: path.to_string(),
            script: path.to_string(),
        }
    }
}

impl Default for StaticContext {
    fn default() -> Self {
        Self::new("localhost", "/service")
    }
}

impl RequestContext for StaticContext {
    fn is_https(&self) -> bool {
        self.https
    }

    fn host(&self) -> String {
        self.host.clone()
    }

    fn request_path(&self) -> String {
        self.path.clone()
    }

    fn script_name(&self) -> String {
        self.script.clone()
    }
}
