#![allow(dead_code)]

use syncroute::config::{BatchConfig, ConfigFile, HookConfig, RawConfigFile, RouteConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_route(mut self, name: &str, route: RouteConfig) -> Self {
        self.config.route.insert(name.to_string(), route);
        self
    }

    pub fn delete_extraneous(mut self, val: bool) -> Self {
        self.config.config.delete_extraneous = val;
        self
    }

    pub fn timeout(mut self, val: &str) -> Self {
        self.config.config.timeout = Some(val.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RouteConfig`.
pub struct RouteConfigBuilder {
    route: RouteConfig,
}

impl RouteConfigBuilder {
    pub fn new() -> Self {
        Self {
            route: RouteConfig::default(),
        }
    }

    pub fn batch(mut self, sources: &[&str], destinations: &[&str]) -> Self {
        self.route.batch.push(BatchConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            destinations: destinations.iter().map(|s| s.to_string()).collect(),
            ..BatchConfig::default()
        });
        self
    }

    pub fn delete_extraneous(mut self, val: bool) -> Self {
        self.route.delete_extraneous = Some(val);
        self
    }

    pub fn before(mut self, line: &str, host: Option<&str>) -> Self {
        self.route.before.push(hook(line, host));
        self
    }

    pub fn after(mut self, line: &str, host: Option<&str>) -> Self {
        self.route.after.push(hook(line, host));
        self
    }

    pub fn build(self) -> RouteConfig {
        self.route
    }
}

impl Default for RouteConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn hook(line: &str, host: Option<&str>) -> HookConfig {
    HookConfig {
        line: line.to_string(),
        host: host.map(str::to_string),
        ..HookConfig::default()
    }
}
