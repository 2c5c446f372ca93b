// Application state module
// Immutable per-server state shared by every connection task

use std::path::PathBuf;

use super::types::Config;
use crate::http::hooks::{CrossOriginIsolation, HookChain, ServerName};
use crate::logger::{self, LogFormat};

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical form of `config.server.root_directory`
    pub root: PathBuf,
    /// Runs on every response before it is sent
    pub hooks: HookChain,
    pub access_log_format: LogFormat,
}

impl AppState {
    /// Build state with the default hook chain: `Server` header, then the
    /// cross-origin isolation headers
    pub fn new(config: Config, root: PathBuf) -> Self {
        let mut hooks = HookChain::new();
        match ServerName::new(&config.http.server_name) {
            Some(name) => hooks = hooks.with(name),
            None => logger::log_warning(&format!(
                "Invalid server name '{}', Server header disabled",
                config.http.server_name
            )),
        }
        let hooks = hooks.with(CrossOriginIsolation);
        Self::with_hooks(config, root, hooks)
    }

    /// Build state with a caller-supplied hook chain
    pub fn with_hooks(config: Config, root: PathBuf, hooks: HookChain) -> Self {
        let access_log_format = LogFormat::from_name(&config.logging.access_log_format)
            .unwrap_or_else(|| {
                logger::log_warning(&format!(
                    "Unknown access log format '{}', using common",
                    config.logging.access_log_format
                ));
                LogFormat::Common
            });

        Self {
            config,
            root,
            hooks,
            access_log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain() {
        let state = AppState::new(Config::default(), PathBuf::from("/srv"));
        assert_eq!(state.hooks.len(), 2);
        assert_eq!(state.access_log_format, LogFormat::Common);
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let mut config = Config::default();
        config.logging.access_log_format = "xml".to_string();
        let state = AppState::with_hooks(config, PathBuf::from("/srv"), HookChain::new());
        assert_eq!(state.access_log_format, LogFormat::Common);
        assert!(state.hooks.is_empty());
    }
}
