use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    /// Hash of a throwaway secret with the same parameters as real hashes.
    static ref DUMMY_HASH: String = hash_password("tenflow-dummy-password").unwrap_or_default();
}

/// Argon2id digest in PHC string form, with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// A digest that cannot be parsed verifies as `false`.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Spends the same argon2 work as [`verify_password`] for an account that
/// does not exist. Always `false`.
pub fn verify_unknown_account(plain: &str) -> bool {
    let _ = verify_password(plain, &DUMMY_HASH);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret123", &a));
        assert!(verify_password("secret123", &b));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn mutated_hash_verifies_false() {
        let hash = hash_password("secret123").unwrap();
        let mut mutated = hash.clone().into_bytes();
        let last = mutated.len() - 1;
        mutated[last] = if mutated[last] == b'A' { b'B' } else { b'A' };
        let mutated = String::from_utf8(mutated).unwrap();
        assert!(!verify_password("secret123", &mutated));
    }

    #[test]
    fn unknown_account_runs_a_real_verification() {
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
        assert!(!verify_unknown_account("tenflow-dummy-password"));
        assert!(!verify_unknown_account("anything"));
    }
}
