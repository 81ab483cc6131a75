use std::collections::HashSet;

use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Id;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw admin credentials, as found in configuration or received from a login
/// request. These are never kept once hashed, since the password is in
/// plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// An admin user, with the password held only as an argon2 hash.
#[derive(Debug, PartialEq, Eq)]
pub struct Admin {
    pub id: Id,
    pub username: String,
    password_hash: String,
}

impl Admin {
    /// Hash the given credentials into an admin with the given ID.
    /// This enforces that the username is non-empty, and the password meets minimum length.
    pub fn from_credentials(id: Id, cred: AdminCredentials) -> Result<Self> {
        if cred.username.trim().is_empty() || cred.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::BadRequest(format!(
                "Illegal admin credentials for '{}': the username must be non-empty and \
the password at least {MIN_PASSWORD_LENGTH} characters",
                cred.username
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default())?;
        Ok(Self {
            id,
            username: cred.username,
            password_hash,
        })
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// The set of admins allowed to run the election, injected from configuration
/// at startup.
#[derive(Debug)]
pub struct AdminRoster {
    admins: Vec<Admin>,
}

impl AdminRoster {
    /// Hash every configured credential. The roster must be non-empty and
    /// usernames must be unique.
    pub fn from_credentials(credentials: Vec<AdminCredentials>) -> Result<Self> {
        if credentials.is_empty() {
            return Err(Error::BadRequest(
                "At least one admin must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut admins = Vec::with_capacity(credentials.len());
        for (index, cred) in credentials.into_iter().enumerate() {
            if !seen.insert(cred.username.clone()) {
                return Err(Error::BadRequest(format!(
                    "Admin username configured twice: {}",
                    cred.username
                )));
            }
            let id = Id::new(index as u32 + 1);
            admins.push(Admin::from_credentials(id, cred)?);
        }
        Ok(Self { admins })
    }

    /// Find the admin matching these credentials, if any.
    pub fn authenticate(&self, cred: &AdminCredentials) -> Option<&Admin> {
        self.admins
            .iter()
            .find(|admin| admin.username == cred.username)
            .filter(|admin| admin.verify_password(&cred.password))
    }

    /// Are these valid admin credentials?
    pub fn validate(&self, cred: &AdminCredentials) -> bool {
        self.authenticate(cred).is_some()
    }

    pub fn get(&self, id: Id) -> Option<&Admin> {
        self.admins.iter().find(|admin| admin.id == id)
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}
