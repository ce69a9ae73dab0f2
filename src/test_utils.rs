use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logger once for the whole test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
