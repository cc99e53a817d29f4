fn main() {
    // Build-time configuration overrides (see `NodeConfig::from_build_env`).
    for var in [
        "AQUANODE_WIFI_SSID",
        "AQUANODE_WIFI_PASSWORD",
        "AQUANODE_SERVER_HOST",
        "AQUANODE_SERVER_PORT",
        "AQUANODE_DEVICE_ID",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
