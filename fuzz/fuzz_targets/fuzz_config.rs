//! Fuzz target: `SystemConfig::from_json`
//!
//! Arbitrary bytes must either be rejected or yield a config that
//! passes validation and builds a control loop without panicking.
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpsense::app::service::ControlLoop;
use pumpsense::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = SystemConfig::from_json(data) {
        assert!(config.validate().is_ok());
        let app = ControlLoop::new(&config);
        assert_eq!(app.channel_count(), config.channel_count());
    }
});
