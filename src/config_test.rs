use super::*;
use clap::error::ErrorKind;

#[test]
fn test_port_defaults_to_8080() {
    let cli = Cli::try_parse_from(["graceful-server"]).unwrap();
    assert_eq!(cli.port, 8080);
}

#[test]
fn test_port_flag_is_parsed() {
    let cli = Cli::try_parse_from(["graceful-server", "--port", "9090"]).unwrap();
    let config = cli.into_config();

    assert_eq!(config.port(), 9090);
    assert_eq!(config.write_timeout(), Duration::from_secs(4));
}

#[test]
fn test_port_out_of_range_is_rejected() {
    let err = Cli::try_parse_from(["graceful-server", "--port", "65536"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_port_must_be_numeric() {
    assert!(Cli::try_parse_from(["graceful-server", "--port", "http"]).is_err());
}

#[test]
fn test_zero_write_timeout_is_rejected() {
    let result = ServerConfig::new(8080).with_write_timeout(Duration::ZERO);
    assert!(matches!(result, Err(ConfigError::ZeroWriteTimeout)));
}

#[test]
fn test_write_timeout_override_keeps_port() {
    let config = ServerConfig::new(0)
        .with_write_timeout(Duration::from_millis(250))
        .unwrap();

    assert_eq!(config.port(), 0);
    assert_eq!(config.write_timeout(), Duration::from_millis(250));
}
