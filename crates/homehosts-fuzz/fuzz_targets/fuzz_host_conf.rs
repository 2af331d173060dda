#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let conf = homehosts_core::hostconf::HostConf::parse(data);
    let _ = conf.apply_env_override(Some("on"));
});
