use crate::config;

/// Load the configuration, falling back to defaults when it is missing or invalid.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("trackinfo: invalid config, using defaults: {msg}");
                log::warn!("invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("trackinfo: failed to load config, using defaults: {e}");
            log::warn!("failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
