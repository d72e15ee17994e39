use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

/// Session token validity window
pub const SESSION_HOURS: i64 = 24;

/// Single error for both "no such user" and "wrong password"
///
/// Deliberately indistinguishable so login responses cannot be used to
/// enumerate accounts.
pub const GENERIC_LOGIN_ERROR: &str = "Authentication failed! Email or Password is wrong";

const USERS_FILE: &str = "users.json";

/// A registered account as stored on disk
///
/// The password hash only ever travels between this struct and the store
/// file; responses are built from [`PublicUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The account fields safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginSuccess {
    #[serde(rename = "jwtToken")]
    pub jwt_token: String,
    pub email: String,
    pub name: String,
}

/// Claims embedded in a session token
///
/// Stateless by design: any request presenting a correctly signed,
/// unexpired token is treated as authenticated as `sub`, whether or not the
/// account still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub sub: String,
    pub exp: usize,
}

/// Authenticated identity attached to a request by the middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// HS256 signing/verification keys for session tokens
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        TokenKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a 24-hour token for an account
    pub fn issue(&self, user: &UserAccount) -> Result<String, AppError> {
        let claims = Claims {
            email: user.email.clone(),
            sub: user.id.clone(),
            exp: (Utc::now() + Duration::hours(SESSION_HOURS)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal("token signing", e))
    }

    /// Verify a raw token value and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                if matches!(err.kind(), ErrorKind::ExpiredSignature) {
                    log::debug!("rejected expired session token");
                }
                AppError::Auth("Unauthorized, JWT token wrong or expired".to_string())
            })
    }
}

/// JSON-file-backed account store
///
/// Accounts live in `users.json` under the data directory, keyed by id; the
/// in-memory map is the source of truth and every mutation is flushed back
/// to disk before returning.
pub struct UserStore {
    path: PathBuf,
    users: RwLock<HashMap<String, UserAccount>>,
}

impl UserStore {
    /// Open (or initialize) the store under `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(data_dir)
            .map_err(|e| AppError::internal("create data directory", e))?;
        let path = data_dir.join(USERS_FILE);

        let users = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| AppError::internal("read users file", e))?;
            serde_json::from_str(&contents)
                .map_err(|e| AppError::internal("parse users file", e))?
        } else {
            HashMap::new()
        };

        Ok(UserStore {
            path,
            users: RwLock::new(users),
        })
    }

    fn persist(&self, users: &HashMap<String, UserAccount>) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| AppError::internal("serialize users", e))?;
        fs::write(&self.path, json).map_err(|e| AppError::internal("write users file", e))
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let users = self.users.read().unwrap();
        users.values().find(|u| u.email == email).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<UserAccount> {
        let users = self.users.read().unwrap();
        users.get(id).cloned()
    }

    pub fn insert(&self, user: UserAccount) -> Result<(), AppError> {
        let mut users = self.users.write().unwrap();
        users.insert(user.id.clone(), user);
        self.persist(&users)
    }

    /// Update name/email of an existing account
    pub fn update(&self, id: &str, name: &str, email: &str) -> Result<Option<UserAccount>, AppError> {
        let mut users = self.users.write().unwrap();
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        user.name = name.to_string();
        user.email = email.to_string();
        let updated = user.clone();
        self.persist(&users)?;
        Ok(Some(updated))
    }
}

/// Credential validation, token issuance and profile updates
pub struct AuthService {
    store: UserStore,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(data_dir: &Path, jwt_secret: &str) -> Result<Self, AppError> {
        Ok(AuthService {
            store: UserStore::open(data_dir)?,
            keys: TokenKeys::new(jwt_secret),
        })
    }

    /// Register a new account
    ///
    /// Fails with `Conflict` when the email is already registered. The
    /// password is hashed with Argon2 (salted, irreversible) before storage
    /// and the hash never appears in any response.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<(), AppError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }
        if self.store.find_by_email(email).is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = UserAccount {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
        };
        self.store.insert(user)
    }

    /// Validate credentials and issue a session token
    ///
    /// Unknown email and wrong password produce the exact same error.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginSuccess, AppError> {
        let Some(user) = self.store.find_by_email(email) else {
            return Err(AppError::Auth(GENERIC_LOGIN_ERROR.to_string()));
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Auth(GENERIC_LOGIN_ERROR.to_string()));
        }

        Ok(LoginSuccess {
            jwt_token: self.keys.issue(&user)?,
            email: user.email,
            name: user.name,
        })
    }

    /// Update name/email for the authenticated account
    ///
    /// Fails with `Conflict` when the new email belongs to a *different*
    /// account, and with `NotFound` when the token's account no longer
    /// exists. Returns public fields only.
    pub fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<PublicUser, AppError> {
        if let Some(existing) = self.store.find_by_email(email) {
            if existing.id != user_id {
                return Err(AppError::Conflict(
                    "Email is already taken by another user".to_string(),
                ));
            }
        }

        match self.store.update(user_id, name, email)? {
            Some(user) => Ok(PublicUser {
                name: user.name,
                email: user.email,
            }),
            None => Err(AppError::NotFound("User not found".to_string())),
        }
    }

    /// Verify a raw token value from the Authorization header
    ///
    /// Stateless: the account's continued existence is not checked here.
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = self.keys.verify(token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &TokenKeys {
        &self.keys
    }
}

/// Hash a password with Argon2id and a fresh random salt
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal("password hashing", e))
}

/// Check a password against a stored hash; mismatch is Ok(false), not an error
fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal("stored hash format", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
