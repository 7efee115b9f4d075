// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::duration::parse_duration;
use crate::config::model::{BatchConfig, ConfigFile, HookConfig, RawConfigFile, RouteConfig};
use crate::errors::{Result, SyncrouteError};
use crate::sync::{Batch, Destination, Hook, Route};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SyncrouteError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_routes(&raw)?;
        let timeout = validate_global_config(&raw)?;

        let mut routes = BTreeMap::new();
        for (name, route_cfg) in raw.route.iter() {
            let route = build_route(name, route_cfg, raw.config.delete_extraneous)?;
            routes.insert(name.clone(), route);
        }

        Ok(ConfigFile::new_unchecked(
            raw.config.output,
            timeout,
            raw.config.additional_flags,
            routes,
        ))
    }
}

fn config_error(msg: impl Into<String>) -> SyncrouteError {
    SyncrouteError::ConfigError(msg.into())
}

fn ensure_has_routes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.route.is_empty() {
        return Err(config_error(
            "config must contain at least one [route.<name>] section",
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<Option<std::time::Duration>> {
    if cfg.config.additional_flags.iter().any(|f| f.trim().is_empty()) {
        return Err(config_error(
            "[config].additional_flags must not contain empty flags",
        ));
    }

    cfg.config
        .timeout
        .as_deref()
        .map(|s| {
            parse_duration(s).map_err(|e| config_error(format!("[config].timeout: {e}")))
        })
        .transpose()
}

fn build_route(name: &str, cfg: &RouteConfig, default_delete: bool) -> Result<Route> {
    if name.trim().is_empty() {
        return Err(config_error("route names must not be empty"));
    }

    let mut route =
        Route::new(name).delete_extraneous(cfg.delete_extraneous.unwrap_or(default_delete));

    for (i, batch) in cfg.batch.iter().enumerate() {
        route = route.batch(build_batch(name, i, batch)?);
    }
    for (i, hook) in cfg.before.iter().enumerate() {
        route = route.before(build_hook(name, "before", i, hook)?);
    }
    for (i, hook) in cfg.after.iter().enumerate() {
        route = route.after(build_hook(name, "after", i, hook)?);
    }

    Ok(route)
}

fn build_batch(route: &str, index: usize, cfg: &BatchConfig) -> Result<Batch> {
    let at = format!("route '{route}', batch #{}", index + 1);

    if cfg.sources.is_empty() || cfg.sources.iter().any(|s| s.trim().is_empty()) {
        return Err(config_error(format!(
            "{at}: `sources` must list at least one non-empty path"
        )));
    }
    if cfg.destinations.is_empty() || cfg.destinations.iter().any(|d| d.trim().is_empty()) {
        return Err(config_error(format!(
            "{at}: `destinations` must list at least one non-empty path"
        )));
    }

    let mut batch = Batch::new().requires_sudo(cfg.requires_sudo);
    for source in &cfg.sources {
        batch = batch.source(source.clone());
    }
    for raw in &cfg.destinations {
        let destination = Destination::parse(raw);
        if let Destination::Remote { directory, .. } = &destination {
            if directory.is_empty() {
                return Err(config_error(format!(
                    "{at}: remote destination '{raw}' has no directory"
                )));
            }
        }
        batch = batch.destination(destination);
    }
    if let Some(owner) = cfg.chown.as_deref().filter(|o| !o.is_empty()) {
        batch = batch.chown(owner);
    }
    for pattern in &cfg.excludes {
        batch = batch.exclude(pattern.clone());
    }

    Ok(batch)
}

fn build_hook(route: &str, phase: &str, index: usize, cfg: &HookConfig) -> Result<Hook> {
    if cfg.line.trim().is_empty() {
        return Err(config_error(format!(
            "route '{route}', {phase} hook #{}: `line` must not be empty",
            index + 1
        )));
    }

    let hook = match cfg.host.as_deref() {
        Some(host) if host.trim().is_empty() => {
            return Err(config_error(format!(
                "route '{route}', {phase} hook #{}: `host` must not be empty",
                index + 1
            )));
        }
        Some(host) => Hook::remote(host, cfg.line.clone()),
        None => Hook::local(cfg.line.clone()),
    };

    let hook = match cfg.cwd.as_deref() {
        Some(cwd) => hook.cwd(cwd),
        None => hook,
    };
    Ok(hook.requires_sudo(cfg.requires_sudo))
}
