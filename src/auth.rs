//! Authorization for admin commands.
//!
//! The machine itself never checks credentials; the session asks an
//! [`Authorizer`] before forwarding an admin command.

/// Decides whether a credential grants admin access.
pub trait Authorizer {
    fn authorize(&self, credential: &str) -> bool;
}

/// Grants access to holders of a fixed shared PIN.
#[derive(Debug, Clone)]
pub struct PinAuthorizer {
    pin: String,
}

impl PinAuthorizer {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }
}

impl Authorizer for PinAuthorizer {
    fn authorize(&self, credential: &str) -> bool {
        // compare every byte so timing does not leak the matching prefix
        let (a, b) = (self.pin.as_bytes(), credential.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}
