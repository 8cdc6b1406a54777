// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::{self, BufRead};

use campus_core::{Argon2PasswordHasher, PasswordHasher};

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::load_campus_config;

/// Prints an Argon2id verifier for the given password.
///
/// Uses the `auth.hashing` parameters of the active configuration so seeded
/// verifiers match what the service produces at registration.
pub fn hash_password(cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let config = load_campus_config(cli.config.as_deref())?;
    let hasher = Argon2PasswordHasher::with_config(config.auth.hashing)
        .map_err(BinError::InvalidHashing)?;

    let password = read_password(&args, io::stdin().lock())?;
    println!("{}", hash_with(&hasher, &password)?);
    Ok(())
}

fn hash_with(hasher: &dyn PasswordHasher, password: &str) -> BinResult<String> {
    if password.is_empty() {
        return Err(BinError::invalid_input("Password cannot be empty"));
    }
    Ok(hasher.hash(password)?.as_str().to_string())
}

fn read_password(args: &HashPasswordArgs, mut input: impl BufRead) -> BinResult<String> {
    if !args.stdin {
        return args
            .password
            .clone()
            .ok_or_else(|| BinError::invalid_input("Pass a password or --stdin"));
    }

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}
