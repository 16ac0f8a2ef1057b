use std::{fmt, sync::Arc};

use crate::{ConfettiError, ConfettiResult};

/// Decides whether a presented credential grants moderation rights.
pub trait AdminAuthority: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Accepts exactly one configured token.
pub struct TokenAuthority {
    token: String,
}

impl TokenAuthority {
    pub fn new(token: impl Into<String>) -> ConfettiResult<TokenAuthority> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfettiError::validation("admin token must not be empty"));
        }
        Ok(TokenAuthority { token })
    }
}

impl AdminAuthority for TokenAuthority {
    fn verify(&self, credential: &str) -> bool {
        constant_time_eq(self.token.as_bytes(), credential.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[derive(Clone)]
pub struct Authority(Arc<dyn AdminAuthority>);

impl Authority {
    pub fn new(authority: impl AdminAuthority + 'static) -> Authority {
        Authority(Arc::new(authority))
    }

    pub fn verify(&self, credential: &str) -> bool {
        self.0.verify(credential)
    }
}

impl fmt::Debug for Authority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Authority(..)")
    }
}
