//! Identity tokens for spawned children
//!
//! A child learns that it should run the entry point, not the test runner,
//! from an environment variable its parent injected. The variable name is
//! derived from the program path and arguments so that unrelated spawners
//! never collide.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Prefix shared by every token variable name
pub(crate) const ENV_PREFIX: &str = "SPAWN_";

/// Value injected into the child's environment
pub(crate) const TOKEN_VALUE: &str = "1";

const DIGEST_HEX_LEN: usize = 64;

/// Environment variable marking a process as a particular spawner's child
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityToken {
    name: String,
}

impl IdentityToken {
    /// Derive the token from a program path and its arguments.
    ///
    /// Arguments are concatenated without a separator before hashing.
    pub fn derive<S: AsRef<str>>(program: &Path, args: &[S]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(program.as_os_str().as_bytes());
        for arg in args {
            hasher.update(arg.as_ref().as_bytes());
        }
        let digest = hasher.finalize();

        Self {
            name: format!("{}{}", ENV_PREFIX, hex::encode(digest)),
        }
    }

    /// Environment variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `(name, value)` pair to set on the child
    pub fn env_pair(&self) -> (&str, &str) {
        (&self.name, TOKEN_VALUE)
    }

    /// Check the current process environment for this token
    pub fn is_present(&self) -> bool {
        self.is_present_in(std::env::vars_os())
    }

    /// Check an explicit environment for this token.
    ///
    /// Only presence with a non-empty value counts; the exact value is not compared.
    pub fn is_present_in<I>(&self, vars: I) -> bool
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        vars.into_iter()
            .any(|(key, value)| key.as_os_str() == OsStr::new(&self.name) && !value.is_empty())
    }
}

/// True when the current process was launched by any spawner
pub fn is_spawned_child() -> bool {
    is_spawned_child_in(std::env::vars_os())
}

/// True when `vars` carries any well-formed token with a non-empty value
pub(crate) fn is_spawned_child_in<I>(vars: I) -> bool
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .any(|(key, value)| !value.is_empty() && looks_like_token(&key))
}

fn looks_like_token(key: &OsStr) -> bool {
    let Some(key) = key.to_str() else {
        return false;
    };
    let Some(digest) = key.strip_prefix(ENV_PREFIX) else {
        return false;
    };
    digest.len() == DIGEST_HEX_LEN && digest.chars().all(|c| c.is_ascii_hexdigit())
}
