use crate::auth_token::AuthTokenService;
use crate::db::Repositories;
use crate::middleware::RateLimiter;
use crate::service::{AuthService, CaseService, ReportService, WhistleblowerService};
use crate::session::SessionManager;

/// PEM of the key whistleblower clients wrap case keys with.
#[derive(Debug, Clone)]
pub struct InvestigatorPublicKey(String);

impl InvestigatorPublicKey {
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    pub fn pem(&self) -> &str {
        &self.0
    }
}

/// Everything the HTTP layer shares between workers.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub auth: AuthService,
    pub whistleblowers: WhistleblowerService,
    pub cases: CaseService,
    pub reports: ReportService,
    pub rate_limiter: RateLimiter,
    pub public_key: InvestigatorPublicKey,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        sessions: SessionManager,
        tokens: AuthTokenService,
        public_key: InvestigatorPublicKey,
    ) -> Self {
        Self {
            auth: AuthService::new(repos.clone(), sessions, tokens),
            whistleblowers: WhistleblowerService::new(repos.clone()),
            cases: CaseService::new(repos.clone()),
            reports: ReportService::new(repos.clone()),
            repos,
            rate_limiter: RateLimiter::new(),
            public_key,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        self.auth.sessions()
    }
}
