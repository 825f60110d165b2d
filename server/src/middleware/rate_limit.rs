use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::VaultVoiceError;

pub const MAX_REQUESTS: usize = 10;
pub const WINDOW_DURATION: Duration = Duration::from_secs(60);

/// Sliding-window limiter for the credential and intake endpoints.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<IpAddr, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limit(MAX_REQUESTS, WINDOW_DURATION)
    }

    pub fn with_limit(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        let now = Instant::now();

        let mut entry = self.requests.entry(ip).or_default();
        entry.retain(|&timestamp| now.duration_since(timestamp) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }

    pub fn cleanup_old_entries(&self) {
        let now = Instant::now();

        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < self.window);
            !timestamps.is_empty()
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn rate_limit_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    // Without a peer address there is nothing to key the window on.
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .ok_or(VaultVoiceError::RateLimitExceeded)?;

    let rate_limiter = req
        .app_data::<web::Data<RateLimiter>>()
        .ok_or_else(|| VaultVoiceError::Internal("Rate limiter not available".to_string()))?;

    if !rate_limiter.check_rate_limit(ip) {
        log::warn!(
            "Rate limit exceeded for IP: {} on {}",
            ip,
            req.match_pattern().unwrap_or_default()
        );
        return Err(VaultVoiceError::RateLimitExceeded.into());
    }

    next.call(req).await
}
