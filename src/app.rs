//! Application entry point: builds the app value from production settings.

use crate::settings::ProductionConfig;

/// The web application, constructed once from its settings
#[derive(Debug, Clone)]
pub struct App {
    config: ProductionConfig,
}

/// Construct the application from `config`
pub fn create_app(config: ProductionConfig) -> App {
    if config.secret_key.is_fallback() {
        tracing::warn!("SECRET_KEY is not set; using the insecure built-in secret");
    }
    App { config }
}

impl App {
    pub fn config(&self) -> &ProductionConfig {
        &self.config
    }

    /// Response headers named by the settings
    pub fn security_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("X-Frame-Options", self.config.x_frame_options.clone())];
        if self.config.secure_content_type_nosniff {
            headers.push((
                "X-Content-Type-Options",
                self.config.x_content_type_options.clone(),
            ));
        }
        if self.config.secure_browser_xss_filter {
            headers.push(("X-XSS-Protection", self.config.x_xss_protection.clone()));
        }
        headers
    }

    /// Attribute suffix for the session cookie
    pub fn session_cookie_attributes(&self) -> String {
        let mut attrs = Vec::with_capacity(4);
        if self.config.session_cookie_secure {
            attrs.push("Secure".to_string());
        }
        if self.config.session_cookie_httponly {
            attrs.push("HttpOnly".to_string());
        }
        attrs.push(format!(
            "SameSite={}",
            self.config.session_cookie_samesite.as_str()
        ));
        attrs.push(format!(
            "Max-Age={}",
            self.config.permanent_session_lifetime.as_secs()
        ));
        attrs.join("; ")
    }

    /// Cache-Control value for static files
    pub fn static_cache_control(&self) -> String {
        format!(
            "public, max-age={}",
            self.config.send_file_max_age_default.as_secs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        create_app(ProductionConfig::from_lookup(|_| Some("k".to_string())))
    }

    #[test]
    fn test_create_app_keeps_config() {
        let app = app();
        assert_eq!(app.config().secret_key.expose(), "k");
        assert!(!app.config().debug);
    }

    #[test]
    fn test_security_headers() {
        let headers = app().security_headers();
        assert_eq!(
            headers,
            vec![
                ("X-Frame-Options", "SAMEORIGIN".to_string()),
                ("X-Content-Type-Options", "nosniff".to_string()),
                ("X-XSS-Protection", "1; mode=block".to_string()),
            ]
        );
    }

    #[test]
    fn test_security_headers_respect_flags() {
        let mut config = ProductionConfig::from_lookup(|_| None);
        config.secure_browser_xss_filter = false;
        let headers = create_app(config).security_headers();
        assert!(!headers.iter().any(|(name, _)| *name == "X-XSS-Protection"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        assert_eq!(
            app().session_cookie_attributes(),
            "Secure; HttpOnly; SameSite=Lax; Max-Age=2592000"
        );
    }

    #[test]
    fn test_static_cache_control() {
        assert_eq!(app().static_cache_control(), "public, max-age=31536000");
    }
}
