use std::net::IpAddr;

use ipnet::IpNet;

/// Projects featured on the landing page, in display order.
pub const DEFAULT_FEATURED_PROJECTS: &str =
    "hippo2,ai-camp-bot,team-tomorrow-website,ai-on-thumbs";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub trusted_proxies: Vec<IpNet>,
    pub featured_projects: Vec<String>,
    pub secure_cookies: bool,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    /// Inbox that receives contact form mail.
    pub to: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| "Missing required environment variable: DATABASE_URL".to_string())?;

        let host: IpAddr = env_or("SHOWCASE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid SHOWCASE_HOST: {e}"))?;

        let port: u16 = env_or("SHOWCASE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid SHOWCASE_PORT: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("SHOWCASE_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid SHOWCASE_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let featured_projects = split_list(&env_or(
            "SHOWCASE_FEATURED_PROJECTS",
            DEFAULT_FEATURED_PROJECTS,
        ));

        let secure_cookies = match env_or("SHOWCASE_SECURE_COOKIES", "true").as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let log_level = env_or("SHOWCASE_LOG_LEVEL", "info");

        let smtp = match (
            var("SHOWCASE_SMTP_HOST"),
            var("SHOWCASE_SMTP_PORT"),
            var("SHOWCASE_SMTP_USER"),
            var("SHOWCASE_SMTP_PASS"),
            var("SHOWCASE_SMTP_FROM"),
            var("SHOWCASE_SMTP_TO"),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from), Some(to)) => {
                Some(SmtpConfig {
                    host,
                    port: port
                        .parse()
                        .map_err(|e| format!("Invalid SHOWCASE_SMTP_PORT: {e}"))?,
                    user,
                    pass,
                    from,
                    to,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            trusted_proxies,
            featured_projects,
            secure_cookies,
            log_level,
            smtp,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/showcase")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(
            config.featured_projects,
            vec![
                "hippo2",
                "ai-camp-bot",
                "team-tomorrow-website",
                "ai-on-thumbs"
            ]
        );
        assert!(config.secure_cookies);
        assert!(config.smtp.is_none());
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn database_url_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn featured_projects_keep_order_and_skip_blanks() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/showcase"),
            ("SHOWCASE_FEATURED_PROJECTS", " b , ,a,c "),
        ])
        .unwrap();

        assert_eq!(config.featured_projects, vec!["b", "a", "c"]);
    }

    #[test]
    fn invalid_proxy_is_rejected() {
        let err = config(&[
            ("DATABASE_URL", "postgres://localhost/showcase"),
            ("SHOWCASE_TRUSTED_PROXIES", "10.0.0.0/8,not-a-net"),
        ])
        .unwrap_err();

        assert!(err.contains("not-a-net"));
    }

    #[test]
    fn smtp_needs_every_field() {
        let partial = config(&[
            ("DATABASE_URL", "postgres://localhost/showcase"),
            ("SHOWCASE_SMTP_HOST", "smtp.example.com"),
            ("SHOWCASE_SMTP_PORT", "587"),
        ])
        .unwrap();
        assert!(partial.smtp.is_none());

        let full = config(&[
            ("DATABASE_URL", "postgres://localhost/showcase"),
            ("SHOWCASE_SMTP_HOST", "smtp.example.com"),
            ("SHOWCASE_SMTP_PORT", "587"),
            ("SHOWCASE_SMTP_USER", "mailer"),
            ("SHOWCASE_SMTP_PASS", "hunter2"),
            ("SHOWCASE_SMTP_FROM", "site@example.com"),
            ("SHOWCASE_SMTP_TO", "hello@example.com"),
        ])
        .unwrap();
        let smtp = full.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.to, "hello@example.com");
    }
}
