use crate::config::Settings;
use crate::domain::model::SourceKind;
use crate::utils::error::{EnumError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

static ENV_VAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

/// Optional configuration file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub sources: Option<SourcesSection>,
    pub dns: Option<DnsSection>,
    pub http: Option<HttpSection>,
    pub resolve: Option<ResolveSection>,
    pub endpoints: Option<EndpointsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesSection {
    pub enabled: Option<Vec<SourceKind>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsSection {
    pub nameservers: Option<Vec<IpAddr>>,
    pub timeout_secs: Option<u64>,
    pub lifetime_secs: Option<u64>,
    pub doh_endpoint: Option<String>,
    pub fallback_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveSection {
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsSection {
    pub archive: Option<String>,
    pub crtsh: Option<String>,
    pub certspotter: Option<String>,
    pub bufferover: Option<String>,
    pub virustotal: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| EnumError::ConfigError {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${USER_AGENT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_REGEX
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Overlays every value present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(enabled) = self.sources.as_ref().and_then(|s| s.enabled.clone()) {
            settings.sources = enabled;
        }

        if let Some(dns) = &self.dns {
            if let Some(nameservers) = &dns.nameservers {
                settings.nameservers = nameservers.clone();
            }
            if let Some(secs) = dns.timeout_secs {
                settings.dns_timeout = Duration::from_secs(secs);
            }
            if let Some(secs) = dns.lifetime_secs {
                settings.dns_lifetime = Duration::from_secs(secs);
            }
            if let Some(endpoint) = &dns.doh_endpoint {
                settings.doh_endpoint = endpoint.clone();
            }
            if let Some(secs) = dns.fallback_timeout_secs {
                settings.fallback_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(http) = &self.http {
            if let Some(secs) = http.timeout_secs {
                settings.http_timeout = Duration::from_secs(secs);
            }
            if let Some(agent) = &http.user_agent {
                settings.user_agent = agent.clone();
            }
        }

        if let Some(concurrency) = self.resolve.as_ref().and_then(|r| r.concurrency) {
            settings.concurrency = concurrency;
        }

        if let Some(endpoints) = &self.endpoints {
            let target = &mut settings.endpoints;
            let overrides = [
                (&mut target.archive, &endpoints.archive),
                (&mut target.crtsh, &endpoints.crtsh),
                (&mut target.certspotter, &endpoints.certspotter),
                (&mut target.bufferover, &endpoints.bufferover),
                (&mut target.virustotal, &endpoints.virustotal),
            ];
            for (slot, value) in overrides {
                if let Some(value) = value {
                    *slot = value.clone();
                }
            }
        }
    }
}
