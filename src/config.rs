use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Resolution settings
    pub root_host: String,
    pub max_hops: usize,
    pub connect_timeout_secs: u64,
    pub max_response_bytes: usize,

    // Rate limiting
    pub rate_burst: u64,
    pub rate_refill_secs: u64,

    // Cache settings
    pub cache_ttl_secs: u64,
    pub cache_sweep_secs: u64,

    // Front-end settings
    pub request_timeout_ms: u64,
    pub debug: bool,
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `None` when the periodic sweep is disabled.
    pub fn cache_sweep_interval(&self) -> Option<Duration> {
        (self.cache_sweep_secs > 0).then(|| Duration::from_secs(self.cache_sweep_secs))
    }

    pub fn rate_refill_interval(&self) -> Duration {
        Duration::from_secs(self.rate_refill_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_host: "whois.iana.org".to_string(),
            max_hops: 8,
            connect_timeout_secs: 10,
            max_response_bytes: 1024 * 1024,
            rate_burst: 30,
            rate_refill_secs: 60,
            cache_ttl_secs: 12 * 60 * 60,
            cache_sweep_secs: 60 * 60,
            request_timeout_ms: 1000,
            debug: false,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let root_host = std::env::var("IPWHOIS_ROOT_HOST")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.root_host);

    let max_hops = env_or("IPWHOIS_MAX_HOPS", defaults.max_hops);
    if max_hops == 0 {
        anyhow::bail!("IPWHOIS_MAX_HOPS must be at least 1");
    }

    let connect_timeout_secs =
        env_or("IPWHOIS_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs);
    let max_response_bytes = env_or("IPWHOIS_MAX_RESPONSE_BYTES", defaults.max_response_bytes);

    let rate_burst = env_or("IPWHOIS_RATE_BURST", defaults.rate_burst);
    let rate_refill_secs = env_or("IPWHOIS_RATE_REFILL_SECS", defaults.rate_refill_secs);
    if rate_refill_secs == 0 {
        anyhow::bail!("IPWHOIS_RATE_REFILL_SECS must be at least 1");
    }

    let cache_ttl_secs = env_or("IPWHOIS_CACHE_TTL_SECS", defaults.cache_ttl_secs);
    let cache_sweep_secs = env_or("IPWHOIS_CACHE_SWEEP_SECS", defaults.cache_sweep_secs);

    let request_timeout_ms = env_or("IPWHOIS_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        root_host,
        max_hops,
        connect_timeout_secs,
        max_response_bytes,
        rate_burst,
        rate_refill_secs,
        cache_ttl_secs,
        cache_sweep_secs,
        request_timeout_ms,
        debug,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use parking_lot::{const_mutex, Mutex};

    // Environment variables are process-global; keep these tests serial.
    static ENV_LOCK: Mutex<()> = const_mutex(());

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.root_host, "whois.iana.org");
        assert_eq!(cfg.rate_burst, 30);
        assert_eq!(cfg.rate_refill_interval(), Duration::from_secs(60));
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(43200));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
        assert!(!cfg.debug);
    }

    #[test]
    fn test_load_config_defaults() {
        let _lock = ENV_LOCK.lock();
        std::env::remove_var("IPWHOIS_ROOT_HOST");
        std::env::remove_var("IPWHOIS_CACHE_TTL_SECS");

        let cfg = load_config().unwrap();
        assert_eq!(cfg.root_host, "whois.iana.org");
        assert_eq!(cfg.cache_ttl_secs, 43200);
    }

    #[test]
    fn test_load_config_with_custom_root_host() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_ROOT_HOST", "whois.ripe.net");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.root_host, "whois.ripe.net");
        std::env::remove_var("IPWHOIS_ROOT_HOST");
    }

    #[test]
    fn test_load_config_with_rate_settings() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_RATE_BURST", "5");
        std::env::set_var("IPWHOIS_RATE_REFILL_SECS", "10");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.rate_burst, 5);
        assert_eq!(cfg.rate_refill_interval(), Duration::from_secs(10));
        std::env::remove_var("IPWHOIS_RATE_BURST");
        std::env::remove_var("IPWHOIS_RATE_REFILL_SECS");
    }

    #[test]
    fn test_load_config_zero_refill_rejected() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_RATE_REFILL_SECS", "0");
        assert!(load_config().is_err());
        std::env::remove_var("IPWHOIS_RATE_REFILL_SECS");
    }

    #[test]
    fn test_load_config_zero_hops_rejected() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_MAX_HOPS", "0");
        assert!(load_config().is_err());
        std::env::remove_var("IPWHOIS_MAX_HOPS");
    }

    #[test]
    fn test_sweep_disabled_with_zero() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_CACHE_SWEEP_SECS", "0");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.cache_sweep_interval(), None);
        std::env::remove_var("IPWHOIS_CACHE_SWEEP_SECS");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("IPWHOIS_REQUEST_TIMEOUT_MS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.request_timeout_ms, 1000); // default
        std::env::remove_var("IPWHOIS_REQUEST_TIMEOUT_MS");
    }

    #[test]
    fn test_load_config_with_debug() {
        let _lock = ENV_LOCK.lock();
        std::env::set_var("DEBUG", "1");
        let cfg = load_config().unwrap();
        assert!(cfg.debug);
        std::env::remove_var("DEBUG");
    }
}
