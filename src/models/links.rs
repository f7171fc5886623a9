use serde::{Deserialize, Serialize};
use url::Url;

/// A user's external profile links. The owning `user_id` column is never
/// exposed; a user without a links row gets every field empty.
#[derive(Debug, Clone, Default, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserLinks {
    pub devto: Option<String>,
    pub facebook: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

/// Whether `value` is an absolute http(s) URL.
pub fn is_web_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

impl UserLinks {
    fn labelled(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("Website", &self.website),
            ("GitHub", &self.github),
            ("LinkedIn", &self.linkedin),
            ("Twitter", &self.twitter),
            ("DEV", &self.devto),
            ("Facebook", &self.facebook),
        ]
    }

    /// Non-empty web links as `(label, href)` pairs, in display order.
    /// Anything that is not http(s) is left out.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        self.labelled()
            .into_iter()
            .filter_map(|(label, href)| {
                href.as_deref()
                    .map(str::trim)
                    .filter(|h| is_web_url(h))
                    .map(|h| (label, h))
            })
            .collect()
    }

    /// Reject any non-blank link that is not an http(s) URL, naming it.
    pub fn validate(&self) -> Result<(), String> {
        for (label, href) in self.labelled() {
            if let Some(href) = href.as_deref().filter(|h| !h.trim().is_empty()) {
                if !is_web_url(href) {
                    return Err(format!("{label} link must be an http or https URL"));
                }
            }
        }
        Ok(())
    }
}
