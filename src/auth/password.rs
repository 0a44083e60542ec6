use bcrypt::{hash, verify, BcryptError};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // cost 4 is the bcrypt minimum, fine for tests
    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = hash_password("testpass123", 4).unwrap();
        assert!(verify_password("testpass123", &hashed).unwrap());
        assert!(!verify_password("wrongpass", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("testpass123", 4).unwrap();
        let b = hash_password("testpass123", 4).unwrap();
        assert_ne!(a, b);
    }
}
