mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_STORAGE_TIMEOUT_MS, DEFAULT_WARMUP_TIMEOUT_MS,
	Service, Shards, Site, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.site.id.is_empty() {
		return Err(Error::Validation { message: "site.id must be non-empty.".to_string() });
	}
	if !matches!(cfg.site.environment.as_str(), "local" | "remote") {
		return Err(Error::Validation {
			message: "site.environment must be one of local or remote.".to_string(),
		});
	}

	match cfg.storage.backend.as_str() {
		"local" if cfg.storage.root.is_none() => {
			return Err(Error::Validation {
				message: "storage.root is required when storage.backend is local.".to_string(),
			});
		},
		"http" if cfg.storage.base_url.is_none() => {
			return Err(Error::Validation {
				message: "storage.base_url is required when storage.backend is http.".to_string(),
			});
		},
		"local" | "http" => {},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of local or http.".to_string(),
			});
		},
	}

	if cfg.storage.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_shards(&cfg.shards)
}

/// Worker list checks, also run by the orchestrator before each fan-out.
pub fn validate_shards(shards: &Shards) -> Result<()> {
	if shards.workers.is_empty() {
		return Err(Error::Validation {
			message: "shards.workers must list at least one worker.".to_string(),
		});
	}
	if let Some(position) = shards.workers.iter().position(|worker| worker.trim().is_empty()) {
		return Err(Error::Validation {
			message: format!("shards.workers[{position}] must be non-empty."),
		});
	}
	if shards.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "shards.query_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if shards.warmup_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "shards.warmup_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
	cfg.site.id = cfg.site.id.trim().to_string();
	cfg.site.environment = cfg.site.environment.trim().to_ascii_lowercase();
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();

	if cfg.storage.base_url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
		cfg.storage.base_url = None;
	}
	if let Some(url) = cfg.storage.base_url.as_mut() {
		*url = url.trim().trim_end_matches('/').to_string();
	}
	if cfg.storage.root.as_deref().map(|root| root.as_os_str().is_empty()).unwrap_or(false) {
		cfg.storage.root = None;
	}

	for worker in &mut cfg.shards.workers {
		*worker = worker.trim().to_string();
	}
}
