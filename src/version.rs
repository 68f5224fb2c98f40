//! Version and build information for Vespucci
//!
//! Build metadata is stamped by `build.rs`; both values read "unknown"
//! when git or rustc could not be queried.

/// `{version} ({commit}) rustc {rustc_version}`, shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VESPUCCI_COMMIT_SHA"),
    ") rustc ",
    env!("VESPUCCI_RUSTC_VERSION")
);

/// Get the package version (e.g., "0.1.0")
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the build commit SHA
pub fn build_commit() -> &'static str {
    env!("VESPUCCI_COMMIT_SHA")
}
