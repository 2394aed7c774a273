// Authentication endpoints
//
// Token issuance, registration, federated exchange, logout, and the
// identity fetch. None of these manage session state -- that is the
// session layer's job; these are plain request/response calls.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    FederatedLoginRequest, FederatedLoginResponse, LoginRequest, LoginResponse,
    RegistrationRequest, RegistrationResponse, UserProfile,
};

impl ApiClient {
    /// Exchange email/password for a credential.
    ///
    /// `POST auth/login/` -- the issued token arrives under `key`.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, Error> {
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.expose_secret().to_owned(),
        };
        self.post("auth/login/", &body).await
    }

    /// Register a new account.
    ///
    /// `POST auth/registration/`. Field-level validation failures come
    /// back as [`Error::Validation`] with the server's messages intact.
    pub async fn register(
        &self,
        form: &RegistrationRequest,
    ) -> Result<RegistrationResponse, Error> {
        self.post("auth/registration/", form).await
    }

    /// Exchange a federated provider token for our own credential.
    ///
    /// `POST auth/google/` -- returns both the credential and the
    /// identity record in one round trip.
    pub async fn federated_login(
        &self,
        provider_token: &str,
    ) -> Result<FederatedLoginResponse, Error> {
        let body = FederatedLoginRequest {
            token: provider_token.to_owned(),
        };
        self.post("auth/google/", &body).await
    }

    /// Server-side session teardown. `POST auth/logout/`.
    ///
    /// Callers treat failures as non-fatal -- local logout must succeed
    /// regardless.
    pub async fn logout(&self) -> Result<(), Error> {
        let _: Value = self.post_empty("auth/logout/").await?;
        debug!("server logout complete");
        Ok(())
    }

    /// Fetch the identity record for the current credential.
    ///
    /// `GET auth/user/`. A 401 here means the stored credential is no
    /// longer valid.
    pub async fn current_user(&self) -> Result<UserProfile, Error> {
        self.get("auth/user/").await
    }
}
