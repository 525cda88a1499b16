//! HTTP client for the POS export service

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{CredentialsConfig, OutletCredentials};
use crate::retrieval::archive::unpack_single_csv;
use crate::retrieval::retry::RetryPolicy;
use crate::retrieval::{RetrievalError, SalesDataSource};
use crate::types::RawSaleRecord;

// The service rejects bare clients, so present a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const EXPORT_FEATURE: &str = "order-export-item-detail";

#[derive(Serialize)]
struct LoginRequest<'a> {
    session: LoginSession<'a>,
}

#[derive(Serialize)]
struct LoginSession<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Serialize)]
struct ExportRequest<'a> {
    feature_name: &'a str,
    additional: ExportWindow,
}

#[derive(Serialize)]
struct ExportWindow {
    start_time: String,
    end_time: String,
    outlet_id: u64,
}

#[derive(Deserialize)]
struct ExportCreated {
    id: u64,
}

#[derive(Deserialize)]
struct ExportStatus {
    status: String,
    #[serde(default)]
    file_url: Option<String>,
}

/// Client for the POS export service.
///
/// Drives the full retrieval flow: login, export job submission, bounded
/// status polling, archive download and extraction.
pub struct ExportApiClient {
    http: reqwest::Client,
    config: CredentialsConfig,
    retry: RetryPolicy,
}

impl ExportApiClient {
    /// Create a client with the default polling policy
    pub fn new(config: CredentialsConfig) -> Result<Self, RetrievalError> {
        Self::with_retry_policy(config, RetryPolicy::default())
    }

    /// Create a client with a custom polling policy
    pub fn with_retry_policy(
        config: CredentialsConfig,
        retry: RetryPolicy,
    ) -> Result<Self, RetrievalError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            config,
            retry,
        })
    }

    fn outlet(&self, outlet: &str) -> Result<&OutletCredentials, RetrievalError> {
        self.config
            .outlets
            .get(outlet)
            .ok_or_else(|| RetrievalError::UnknownOutlet {
                outlet: outlet.to_string(),
                available: self.config.outlet_keys(),
            })
    }

    fn login_url(&self) -> String {
        format!("{}/account/v2/login", self.config.base_url)
    }

    fn exports_url(&self) -> String {
        format!("{}/exporting/v1/exports", self.config.base_url)
    }

    async fn login(&self, credentials: &OutletCredentials) -> Result<String, RetrievalError> {
        info!(email = %credentials.email, "logging in to export service");
        let request = LoginRequest {
            session: LoginSession {
                email: &credentials.email,
                password: &credentials.password,
            },
        };
        let response: LoginResponse = self
            .http
            .post(self.login_url())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.access_token)
    }

    async fn submit_export_job(
        &self,
        token: &str,
        credentials: &OutletCredentials,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64, RetrievalError> {
        info!(%start_date, %end_date, outlet_id = credentials.outlet_id, "submitting export job");
        let request = ExportRequest {
            feature_name: EXPORT_FEATURE,
            additional: ExportWindow {
                start_time: format!("{}T00:00:00", start_date.format("%Y-%m-%d")),
                end_time: format!("{}T23:59:59", end_date.format("%Y-%m-%d")),
                outlet_id: credentials.outlet_id,
            },
        };
        let created: ExportCreated = self
            .http
            .post(self.exports_url())
            .header(AUTHORIZATION, token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn poll_export_job(&self, token: &str, job_id: u64) -> Result<String, RetrievalError> {
        let url = format!("{}/{job_id}", self.exports_url());

        for attempt in 1..=self.retry.max_attempts {
            let status: ExportStatus = self
                .http
                .get(&url)
                .header(AUTHORIZATION, token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if status.status == "SUCCESS" {
                info!(job_id, attempt, "export job ready");
                return status.file_url.ok_or(RetrievalError::MissingFileUrl);
            }

            debug!(job_id, attempt, status = %status.status, "export job not ready");
            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.interval).await;
            }
        }

        Err(RetrievalError::ExportNotReady {
            job_id,
            attempts: self.retry.max_attempts,
        })
    }

    async fn download_archive(&self, file_url: &str) -> Result<Vec<u8>, RetrievalError> {
        info!("downloading export archive");
        let bytes = self
            .http
            .get(file_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// Run the full retrieval flow for one outlet and date range
    pub async fn fetch_raw_records(
        &self,
        outlet: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawSaleRecord>, RetrievalError> {
        let credentials = self.outlet(outlet)?;
        let token = self.login(credentials).await?;
        let job_id = self
            .submit_export_job(&token, credentials, start_date, end_date)
            .await?;
        let file_url = self.poll_export_job(&token, job_id).await?;
        let bytes = self.download_archive(&file_url).await?;
        let records = unpack_single_csv(&bytes)?;
        info!(count = records.len(), "export records parsed");
        Ok(records)
    }
}

#[async_trait]
impl SalesDataSource for ExportApiClient {
    async fn fetch_sales(
        &self,
        outlet: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawSaleRecord>, RetrievalError> {
        self.fetch_raw_records(outlet, start_date, end_date).await
    }
}
