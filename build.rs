fn main() {
    // Build-time configuration is baked into the image.
    println!("cargo:rerun-if-env-changed=GSM_REMOTE_AUTHORIZED_NUMBER");
    println!("cargo:rerun-if-env-changed=GSM_REMOTE_CONFIG_JSON");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
