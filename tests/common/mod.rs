#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Once;
use textseg::GCStr;

pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Lines as plain strings.
pub fn texts(lines: &[GCStr]) -> Vec<String> {
    lines.iter().map(ToString::to_string).collect()
}

/// Indices of clusters flagged `ALLOW_BEFORE`.
pub fn allowed(s: &GCStr) -> Vec<usize> {
    (0..s.len())
        .filter(|&i| {
            s.flag(i)
                .is_some_and(|f| f.contains(textseg::ClusterFlags::ALLOW_BEFORE))
        })
        .collect()
}
