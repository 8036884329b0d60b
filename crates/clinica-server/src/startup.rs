//! Server startup utilities.

use clinica_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
      _ _       _
  ___| (_)_ __ (_) ___ __ _
 / __| | | '_ \| |/ __/ _` |
| (__| | | | | | | (_| (_| |
 \___|_|_|_| |_|_|\___\__,_|
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1", addr);
    info!("Health:    http://{}/health", addr);
    info!("Store:     {:?}", config.database.backend);
    info!("Cache:     {:?}", config.cache.backend);
    info!(
        "TTLs:      {}s entities, {}s presence",
        config.cache.entity_ttl_secs, config.cache.presence_ttl_secs
    );
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }
}
