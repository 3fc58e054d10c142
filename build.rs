//! Build script for homelog
//!
//! Embeds a build counter, the build time and the cargo profile. The counter
//! lives in OUT_DIR so the source tree is never written to.

use std::fs;
use std::path::PathBuf;

fn next_build_number(counter: &PathBuf) -> u64 {
    let previous = fs::read_to_string(counter)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let next = previous + 1;

    if let Err(e) = fs::write(counter, next.to_string()) {
        println!("cargo:warning=could not persist build counter: {}", e);
    }
    next
}

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let out_dir = std::env::var_os("OUT_DIR").map(PathBuf::from).unwrap_or_default();
    let build_number = next_build_number(&out_dir.join("build_number"));
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=HOMELOG_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=HOMELOG_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=HOMELOG_BUILD_PROFILE={}", profile);
}
