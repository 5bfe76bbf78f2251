// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `gatehouse version`

use crate::cli::Cli;
use crate::error::BinResult;

/// Crate name and version for every component linked into the binary.
pub fn components() -> [(&'static str, &'static str); 5] {
    [
        ("gatehouse-bin", crate::VERSION),
        ("gatehouse-core", gatehouse_core::VERSION),
        ("gatehouse-session", gatehouse_session::VERSION),
        ("gatehouse-api", gatehouse_api::VERSION),
        ("gatehouse-config", gatehouse_config::VERSION),
    ]
}

/// Prints component versions and the build target.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("gatehouse {}", crate::VERSION);
    for (name, version) in components() {
        println!("  {:<18} {}", name, version);
    }
    println!(
        "  target             {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
    println!("PolyForm Noncommercial License 1.0.0. Copyright (c) 2025 Sylvex.");
    Ok(())
}
