//! services/api/src/auth/password.rs
//!
//! One-way, salted password hashing. Hashing runs whenever a user's password
//! is set or changed, before the value reaches persistence; plaintext is
//! never stored. Verification goes through the library's own comparison,
//! never a hand-rolled equality check.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a plaintext password with a freshly generated salt. The salt is
/// embedded in the returned PHC string, so verification re-derives from it.
pub fn hash(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2.hash_password(plaintext.as_bytes(), &salt)?.to_string())
}

/// Verifies a plaintext candidate against a stored hash.
pub fn verify(plaintext: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;

    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_its_own_input() {
        let hashed = hash("hunter22").unwrap();
        assert!(verify("hunter22", &hashed).unwrap());
        assert!(!verify("hunter23", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("hunter22").unwrap();
        let b = hash("hunter22").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_is_an_error_not_a_match() {
        assert!(verify("hunter22", "not-a-phc-string").is_err());
    }
}
