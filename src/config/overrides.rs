//! Command-line overrides layered on top of file and environment values.

use crate::config::schema::ProxyConfig;

/// Values given explicitly at startup. They win over the file and `WF_SERVER`,
/// and are re-applied on every reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub target: Option<String>,
    pub context: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(bind_address) = &self.bind_address {
            config.listener.bind_address = bind_address.clone();
        }
        if let Some(target) = &self.target {
            config.proxy.target = target.clone();
        }
        if let Some(context) = &self.context {
            config.proxy.context = context.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.observability.log_level = log_level.clone();
        }
    }
}
