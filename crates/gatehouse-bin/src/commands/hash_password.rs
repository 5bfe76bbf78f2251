// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use anyhow::Context;
use gatehouse_api::auth::password::hash_password_blocking;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints an Argon2id PHC string for the given password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = read_password(&args)?;
    println!("{}", hash(&password)?);
    Ok(())
}

fn read_password(args: &HashPasswordArgs) -> BinResult<String> {
    if let Some(password) = &args.password {
        return Ok(password.clone());
    }

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn hash(password: &str) -> BinResult<String> {
    if password.is_empty() {
        return Err(BinError::usage("password must not be empty"));
    }
    Ok(hash_password_blocking(password)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_api::auth::password::verify_password_blocking;

    #[test]
    fn test_hash_is_verifiable() {
        let phc = hash("correct horse").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password_blocking("correct horse", &phc).unwrap());
        assert!(!verify_password_blocking("wrong horse", &phc).unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            hash("").unwrap_err().exit_code(),
            crate::error::exit::USAGE
        );
    }
}
