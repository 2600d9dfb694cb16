fn main() {
    // ESP-IDF link/env plumbing is only needed for device builds; host-target
    // test builds skip it entirely.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
