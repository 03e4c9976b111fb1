use rand::Rng;

use crate::api::models::{LoginRequest, RegisterRequest};

const TAG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TAG_LENGTH: usize = 6;

/// Existing account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn as_login_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            password: &self.password,
        }
    }
}

/// Credentials for a fresh account.
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub credentials: Credentials,
}

impl NewAccount {
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    /// Generates an account from a random tag.
    /// The password contains all the character classes the service asks for.
    pub fn random_with(rng: &mut impl Rng) -> Self {
        let tag: String = (0..TAG_LENGTH)
            .map(|_| TAG_ALPHABET[rng.gen_range(0..TAG_ALPHABET.len())] as char)
            .collect();
        let username = format!("rs-{}", tag);
        Self {
            credentials: Credentials {
                email: format!("{}@example.com", username),
                password: format!("RsStarter1!{}", tag),
            },
            username,
        }
    }

    pub fn as_register_request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            username: &self.username,
            email: &self.credentials.email,
            password: &self.credentials.password,
        }
    }
}
