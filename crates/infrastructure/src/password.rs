//! bcrypt 密码哈希适配器
//!
//! bcrypt 为 CPU 密集计算，放到阻塞线程池中执行，避免阻塞异步运行时。

use application::{PasswordHasher, PasswordHasherError};
use async_trait::async_trait;
use bcrypt::DEFAULT_COST;
use domain::PasswordHash;

#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: Option<u32>) -> Self {
        Self {
            cost: cost.unwrap_or(DEFAULT_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|err| PasswordHasherError::worker_error(err.to_string()))?
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))?;

        PasswordHash::new(hashed).map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let plaintext = plaintext.to_owned();
        let hashed = hashed.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hashed))
            .await
            .map_err(|err| PasswordHasherError::worker_error(err.to_string()))?
            .map_err(|err| PasswordHasherError::verify_error(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt 允许的最低 cost，仅用于加快测试
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = BcryptPasswordHasher::new(Some(TEST_COST));
        let hashed = hasher.hash("correct horse").await.unwrap();

        assert!(hashed.as_str().starts_with("$2"));
        assert!(hasher.verify("correct horse", &hashed).await.unwrap());
        assert!(!hasher.verify("battery staple", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let hasher = BcryptPasswordHasher::new(Some(TEST_COST));
        let bogus = PasswordHash::new("not-a-bcrypt-hash").unwrap();
        assert!(hasher.verify("anything", &bogus).await.is_err());
    }

    #[test]
    fn default_cost_is_bcrypt_default() {
        assert_eq!(BcryptPasswordHasher::default().cost(), DEFAULT_COST);
    }
}
