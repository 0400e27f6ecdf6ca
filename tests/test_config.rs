use barehttp::config::Config;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::from_lookup(lookup(&[])).unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server_name, "barehttp");
    assert_eq!(cfg.max_header_bytes, 16 * 1024);
    assert_eq!(cfg.header_timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_from_environment_values() {
    let cfg = Config::from_lookup(lookup(&[
        ("LISTEN", "0.0.0.0:3000"),
        ("SERVER_NAME", "my-custom-server"),
        ("MAX_HEADER_BYTES", "1024"),
        ("HEADER_TIMEOUT_MS", "250"),
    ]))
    .unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server_name, "my-custom-server");
    assert_eq!(cfg.max_header_bytes, 1024);
    assert_eq!(cfg.header_timeout(), Duration::from_millis(250));
}

#[test]
fn test_config_rejects_bad_numbers() {
    let err = Config::from_lookup(lookup(&[("MAX_HEADER_BYTES", "big")])).unwrap_err();

    assert!(err.to_string().contains("MAX_HEADER_BYTES"));
}

#[test]
fn test_config_from_yaml_fills_defaults() {
    let cfg = Config::from_yaml_str("listen_addr: '0.0.0.0:5000'\nheader_timeout_ms: 100\n").unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.header_timeout_ms, 100);
    assert_eq!(cfg.server_name, "barehttp");
}

#[test]
fn test_config_from_missing_file() {
    assert!(Config::from_file("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr, cfg2.listen_addr);
}
