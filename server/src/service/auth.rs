use protocol::{FollowupSession, InvestigatorLoginResponse};

use crate::auth_token::{now_ms, AuthClaims, AuthTokenService, Role};
use crate::db::{verify_against_dummy, Investigator, Repositories};
use crate::error::{Result, VaultVoiceError};
use crate::service::whistleblower::WhistleblowerService;
use crate::session::{Principal, SessionManager};

const MIN_PASSWORD_LEN: usize = 8;

/// Authenticated caller, stored in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session_id: String,
    pub principal: Principal,
}

impl AuthContext {
    /// Whistleblower tokens only open the case they were issued for.
    pub fn require_case(&self, case_id: &str) -> Result<()> {
        if self.principal.role == Role::Whistleblower && self.principal.subject == case_id {
            Ok(())
        } else {
            Err(VaultVoiceError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    repos: Repositories,
    sessions: SessionManager,
    tokens: AuthTokenService,
}

impl AuthService {
    pub fn new(repos: Repositories, sessions: SessionManager, tokens: AuthTokenService) -> Self {
        Self {
            repos,
            sessions,
            tokens,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    fn issue(&self, principal: Principal) -> Result<(String, u64)> {
        let subject = principal.subject.clone();
        let role = principal.role;
        let session = self.sessions.create_session(principal);

        let token = self
            .tokens
            .issue_token(subject, role, session.session_id, now_ms())
            .map_err(|err| VaultVoiceError::Internal(format!("Failed to issue auth token: {err}")))?;

        Ok((token, self.tokens.ttl().as_secs()))
    }

    pub async fn investigator_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<InvestigatorLoginResponse> {
        log::info!("Investigator login attempt for user: {}", username);

        let Some(investigator) = self.repos.investigators.find_by_username(username).await? else {
            verify_against_dummy(password);
            log::warn!("Failed investigator login for user: {}", username);
            return Err(VaultVoiceError::InvalidCredentials);
        };

        if !investigator.verify_password(password)? {
            log::warn!("Failed investigator login for user: {}", username);
            return Err(VaultVoiceError::InvalidCredentials);
        }

        let investigator_id = investigator
            .id
            .ok_or_else(|| VaultVoiceError::Internal("Investigator has no id".to_string()))?;

        self.repos
            .investigators
            .update_last_login(&investigator_id)
            .await?;

        let (token, expires_in_secs) =
            self.issue(Principal::investigator(investigator_id.to_hex()))?;

        log::info!("Successful investigator login for user: {}", username);

        Ok(InvestigatorLoginResponse {
            token,
            name: investigator.display_name,
            expires_in_secs,
        })
    }

    pub async fn followup_login(
        &self,
        session_id: &str,
        passphrase: &str,
    ) -> Result<FollowupSession> {
        let whistleblower = WhistleblowerService::new(self.repos.clone());
        let case = whistleblower.verify_followup(session_id, passphrase).await?;

        let (token, expires_in_secs) = self.issue(Principal::whistleblower(case.id_hex()))?;
        let case_view = whistleblower.case_view(&case).await?;

        log::info!("Follow-up login for case {}", case.id_hex());

        Ok(FollowupSession {
            token,
            expires_in_secs,
            case: case_view,
        })
    }

    /// Checks signature, expiry and that the server-side session is still live.
    pub fn authenticate(&self, token: &str) -> Result<AuthContext> {
        let claims: AuthClaims = self
            .tokens
            .verify(token, now_ms())
            .map_err(|err| {
                log::debug!("Rejected auth token: {}", err);
                VaultVoiceError::Unauthorized
            })?;

        let session = self.sessions.validate_session(&claims.session_id)?;
        if session.principal.role != claims.role || session.principal.subject != claims.subject {
            return Err(VaultVoiceError::Unauthorized);
        }

        Ok(AuthContext {
            session_id: session.session_id,
            principal: session.principal,
        })
    }

    pub fn logout(&self, session_id: &str) {
        self.sessions.invalidate_session(session_id);
    }

    pub async fn create_investigator(
        &self,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Investigator> {
        let username = username.trim();
        if username.is_empty() {
            return Err(VaultVoiceError::Validation(
                "username must not be blank".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(VaultVoiceError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let display_name = match display_name.trim() {
            "" => username.to_string(),
            name => name.to_string(),
        };

        let investigator = Investigator::new(username.to_string(), display_name, password)?;
        let investigator = self.repos.investigators.insert(investigator).await?;

        log::info!("Created investigator account: {}", username);
        Ok(investigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn service() -> AuthService {
        let tokens = AuthTokenService::new(
            b"test-secret-test-secret-test-secret!".to_vec(),
            Duration::from_secs(600),
        )
        .unwrap();
        AuthService::new(Repositories::in_memory(), SessionManager::new(8), tokens)
    }

    #[actix_rt::test]
    async fn test_investigator_login_and_authenticate() {
        let auth = service();
        auth.create_investigator("alex", "Alex Doe", "password123")
            .await
            .unwrap();

        let login = auth.investigator_login("alex", "password123").await.unwrap();
        assert_eq!(login.name, "Alex Doe");
        assert_eq!(login.expires_in_secs, 600);

        let context = auth.authenticate(&login.token).unwrap();
        assert_eq!(context.principal.role, Role::Investigator);
    }

    #[actix_rt::test]
    async fn test_wrong_password_is_rejected() {
        let auth = service();
        auth.create_investigator("alex", "", "password123")
            .await
            .unwrap();

        assert!(matches!(
            auth.investigator_login("alex", "password124").await,
            Err(VaultVoiceError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.investigator_login("nobody", "password123").await,
            Err(VaultVoiceError::InvalidCredentials)
        ));
    }

    #[actix_rt::test]
    async fn test_logout_revokes_token() {
        let auth = service();
        auth.create_investigator("alex", "Alex Doe", "password123")
            .await
            .unwrap();
        let login = auth.investigator_login("alex", "password123").await.unwrap();
        let context = auth.authenticate(&login.token).unwrap();

        auth.logout(&context.session_id);
        assert!(auth.authenticate(&login.token).is_err());
    }

    #[actix_rt::test]
    async fn test_duplicate_username_conflicts() {
        let auth = service();
        auth.create_investigator("alex", "Alex", "password123")
            .await
            .unwrap();

        assert!(matches!(
            auth.create_investigator("alex", "Other", "password456").await,
            Err(VaultVoiceError::Conflict(_))
        ));
        assert!(matches!(
            auth.create_investigator("sam", "Sam", "short").await,
            Err(VaultVoiceError::Validation(_))
        ));
    }

    #[test]
    fn test_require_case() {
        let context = AuthContext {
            session_id: "s".into(),
            principal: Principal::whistleblower("case-a"),
        };
        assert!(context.require_case("case-a").is_ok());
        assert!(context.require_case("case-b").is_err());

        let investigator = AuthContext {
            session_id: "s".into(),
            principal: Principal::investigator("case-a"),
        };
        assert!(investigator.require_case("case-a").is_err());
    }
}
