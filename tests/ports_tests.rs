use portsweep::config::ScanConfig;
use portsweep::ports::{default_concurrency, parse_port_range};

#[test]
fn parse_range_and_single_port() {
    let r = parse_port_range("1-1024").expect("parse ok");
    assert_eq!((r.start(), r.end(), r.len()), (1, 1024, 1024));

    let r = parse_port_range("7").expect("parse ok");
    assert_eq!(r.len(), 1);
}

#[test]
fn invalid_port_rejected() {
    assert!(parse_port_range("0").is_err());
    assert!(parse_port_range("1-65536").is_err());
}

#[test]
fn config_uses_heuristic_unless_overridden() {
    let range = parse_port_range("1-100").unwrap();
    assert_eq!(default_concurrency(&range), 11);

    let cfg = ScanConfig::new("localhost").with_range(range);
    assert_eq!(cfg.effective_concurrency().unwrap(), 11);
    assert_eq!(cfg.with_concurrency(3).effective_concurrency().unwrap(), 3);
}
