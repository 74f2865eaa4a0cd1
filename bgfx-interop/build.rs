//! Build script for bgfx-interop
//!
//! Compiles the small C translation unit that owns the variadic trace
//! entry point. Rust cannot build a `va_list` on stable, so the `...` to
//! `va_list` hop happens in C before the call reaches `trace_vargs`.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=csrc/trace.c");
    println!("cargo:rerun-if-changed=csrc/bgfx_interop.h");

    cc::Build::new()
        .file("csrc/trace.c")
        .include("csrc")
        .warnings(true)
        .compile("bgfx_interop_trace");

    // MSVC ships vsnprintf as an inline function; the linkable symbol
    // lives in the legacy stdio shim library.
    if std::env::var("CARGO_CFG_TARGET_ENV").as_deref() == Ok("msvc") {
        println!("cargo:rustc-link-lib=dylib=legacy_stdio_definitions");
    }
}
