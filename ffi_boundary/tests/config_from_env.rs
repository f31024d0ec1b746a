//! `BoundaryConfig::from_env` never fails: there is nobody across the
//! boundary to hand an error to. One test in its own binary, since it
//! changes the process environment.

use ffi_boundary::config::{BoundaryConfig, CONFIG_ENV_VAR};
use ffi_boundary::LogFormat;
use std::io::Write;

#[test]
fn from_env_falls_back_to_defaults() {
    std::env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(BoundaryConfig::from_env(), BoundaryConfig::default());

    std::env::set_var(CONFIG_ENV_VAR, "/nonexistent/ffi_boundary.toml");
    assert_eq!(BoundaryConfig::from_env(), BoundaryConfig::default());

    let mut invalid = tempfile::NamedTempFile::new().unwrap();
    writeln!(invalid, "[logging\nformat = ").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, invalid.path());
    assert_eq!(BoundaryConfig::from_env(), BoundaryConfig::default());

    let mut unknown = tempfile::NamedTempFile::new().unwrap();
    writeln!(unknown, "[logging]\nformat = \"xml\"").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, unknown.path());
    assert_eq!(BoundaryConfig::from_env(), BoundaryConfig::default());

    let mut valid = tempfile::NamedTempFile::new().unwrap();
    writeln!(valid, "[logging]\nformat = \"json\"\n\n[handles]\nmax_live_strings = 16").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, valid.path());
    let config = BoundaryConfig::from_env();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.handles.max_live_strings, 16);
    assert_eq!(config.handles.max_live_structs, 65_536);

    std::env::remove_var(CONFIG_ENV_VAR);
}
