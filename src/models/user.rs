//! Authenticated actor model: token claims and capabilities

use serde::{Deserialize, Serialize};

/// Permission a guarded operation requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    MarkReturned,
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
    AddBookInstance,
    ChangeBookInstance,
    DeleteBookInstance,
}

impl Capability {
    /// Name carried in token claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::MarkReturned => "catalog.can_mark_returned",
            Capability::AddAuthor => "catalog.add_author",
            Capability::ChangeAuthor => "catalog.change_author",
            Capability::DeleteAuthor => "catalog.delete_author",
            Capability::AddBook => "catalog.add_book",
            Capability::ChangeBook => "catalog.change_book",
            Capability::DeleteBook => "catalog.delete_book",
            Capability::AddBookInstance => "catalog.add_bookinstance",
            Capability::ChangeBookInstance => "catalog.change_bookinstance",
            Capability::DeleteBookInstance => "catalog.delete_bookinstance",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    /// Session identifier, when the identity provider issues one
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    /// Granted permission names, e.g. "catalog.can_mark_returned"
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.is_superuser
            || self
                .capabilities
                .iter()
                .any(|granted| granted == capability.as_str())
    }

    /// Key under which per-session state (the visit counter) is tracked
    pub fn session_key(&self) -> &str {
        self.sid.as_deref().unwrap_or(&self.sub)
    }
}
