use protocol::{ReportInput, ReportView};

use crate::db::{Report, Repositories};
use crate::error::{Result, VaultVoiceError};

const DEFAULT_STATUS: &str = "NEW";

/// Standalone report demo, unrelated to cases.
#[derive(Clone)]
pub struct ReportService {
    repos: Repositories,
}

impl ReportService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn save_report(&self, input: ReportInput) -> Result<ReportView> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(VaultVoiceError::Validation(
                "title must not be blank".to_string(),
            ));
        }

        let status = input
            .status
            .map(|status| status.trim().to_string())
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        let report = Report {
            id: None,
            title: title.to_string(),
            description: input.description,
            status,
        };

        let saved = self.repos.reports.insert(report).await?;
        Ok(saved.view())
    }

    pub async fn get_all_reports(&self) -> Result<Vec<ReportView>> {
        let reports = self.repos.reports.list().await?;
        Ok(reports.iter().map(Report::view).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_save_defaults_status() {
        let service = ReportService::new(Repositories::in_memory());
        let saved = service
            .save_report(ReportInput {
                title: "Expense irregularity".into(),
                description: "Receipts do not match".into(),
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(saved.status, "NEW");
        assert!(!saved.id.is_empty());
        assert_eq!(service.get_all_reports().await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_blank_title_is_rejected() {
        let service = ReportService::new(Repositories::in_memory());
        let result = service
            .save_report(ReportInput {
                title: "   ".into(),
                description: String::new(),
                status: Some("OPEN".into()),
            })
            .await;
        assert!(matches!(result, Err(VaultVoiceError::Validation(_))));
    }
}
