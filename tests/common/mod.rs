// Shared helpers for integration tests.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use bashgen::assembler::Output;
use bashgen::config::{ScriptConfig, loader};

/// Parse and validate an inline JSON configuration.
pub fn config(json: &str) -> ScriptConfig {
    loader::parse(json)
        .expect("parse configuration")
        .validate()
        .expect("valid configuration")
}

/// Render `json` with default options.
pub fn render(json: &str) -> Output {
    bashgen::generate(&config(json)).expect("render configuration")
}

/// Main script text of `output`.
pub fn main_text(output: &Output) -> String {
    output.main().render()
}

/// Helper file text of `output`, if split.
pub fn utils_text(output: &Output) -> Option<String> {
    output.utils().map(bashgen::document::Document::render)
}
