use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use pod_config::{Config, DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_WARMUP_TIMEOUT_MS, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("pod_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> pod_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = pod_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

#[test]
fn sample_config_loads_with_defaults() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.");

	assert_eq!(cfg.shards.workers.len(), 3);
	assert_eq!(cfg.shards.query_timeout_ms, DEFAULT_QUERY_TIMEOUT_MS);
	assert_eq!(cfg.shards.warmup_timeout_ms, DEFAULT_WARMUP_TIMEOUT_MS);
	assert!(cfg.shards.warm_on_health_check);
	assert_eq!(cfg.storage.timeout_ms, 5_000);
}

#[test]
fn normalizes_whitespace_and_case() {
	let payload = sample_toml_with("site", "environment", Value::String(" Remote ".to_string()));
	let payload = {
		let mut root: Value = toml::from_str(&payload).expect("Failed to parse payload.");
		let shards = root
			.get_mut("shards")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [shards].");

		shards.insert(
			"workers".to_string(),
			Value::Array(vec![Value::String("  http://127.0.0.1:4001/search ".to_string())]),
		);

		toml::to_string(&root).expect("Failed to render payload.")
	};
	let cfg = load_payload(payload).expect("Config must load.");

	assert_eq!(cfg.site.environment, "remote");
	assert_eq!(cfg.shards.workers, vec!["http://127.0.0.1:4001/search".to_string()]);
}

#[test]
fn missing_config_file_is_a_read_error() {
	let err = pod_config::load(&env::temp_dir().join("pod_config_test_missing.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
	let err = load_payload("[service\nhttp_bind =".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn workers_must_be_non_empty() {
	let payload = sample_toml_with("shards", "workers", Value::Array(Vec::new()));
	let err = load_payload(payload).expect_err("Expected worker validation error.");

	assert!(
		err.to_string().contains("shards.workers must list at least one worker."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_worker_entries_are_rejected() {
	let mut cfg = base_config();

	cfg.shards.workers.push("   ".to_string());

	let err = pod_config::validate(&cfg).expect_err("Expected blank worker error.");

	assert!(
		err.to_string().contains("shards.workers[3] must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn timeouts_must_be_positive() {
	let mut cfg = base_config();

	cfg.shards.query_timeout_ms = 0;

	let err = pod_config::validate(&cfg).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("shards.query_timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn environment_must_be_known() {
	let payload = sample_toml_with("site", "environment", Value::String("staging".to_string()));
	let err = load_payload(payload).expect_err("Expected environment validation error.");

	assert!(
		err.to_string().contains("site.environment must be one of local or remote."),
		"Unexpected error: {err}"
	);
}

#[test]
fn http_backend_requires_base_url() {
	let payload = sample_toml_with("storage", "backend", Value::String("http".to_string()));
	let err = load_payload(payload).expect_err("Expected storage validation error.");

	assert!(
		err.to_string().contains("storage.base_url is required when storage.backend is http."),
		"Unexpected error: {err}"
	);
}

#[test]
fn unknown_backend_is_rejected() {
	let mut cfg = base_config();

	cfg.storage.backend = "s3".to_string();

	assert!(pod_config::validate(&cfg).is_err());
}
