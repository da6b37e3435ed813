//! Authentication: bearer tokens, password hashing, the request
//! authorization gate, and the Google OAuth flow.

mod gate;
mod google;
mod password;
mod token;

pub use gate::AuthUser;
pub use google::{GoogleOAuth, GoogleProfile, OAuthConfig};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, TOKEN_TTL_HOURS};
