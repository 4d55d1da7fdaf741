use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::PaymentError;

/// 第一次重试前的等待时间，之后每次翻倍
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// 单次退避等待的上限
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// 第 `attempt` 次尝试失败后的退避时间
pub fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_BASE_DELAY.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

/// 一次远程调用在全部重试耗尽前最多占用的时间
pub fn call_budget(timeout: Duration, retries: u32) -> Duration {
    let attempts = retries.saturating_add(1);
    let mut total = timeout.saturating_mul(attempts);
    for attempt in 1..attempts {
        let delay = retry_delay(attempt);
        if delay == RETRY_MAX_DELAY {
            // 之后每次退避都是上限值
            return total.saturating_add(delay.saturating_mul(attempts - attempt));
        }
        total = total.saturating_add(delay);
    }
    total
}

/// 支付网关接口
///
/// `initiate_payment` 冻结金额，`finalize_payment` 提交或释放冻结。
/// 每一次成功的 `initiate_payment` 必须恰好对应一次 `finalize_payment`。
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn coins_balance(&self, user_id: i64) -> Result<i64, PaymentError>;

    async fn referrals_count(&self, user_id: i64) -> Result<i64, PaymentError>;

    /// 对同一个 `payment_id` 幂等
    async fn initiate_payment(
        &self,
        user_id: i64,
        amount: i64,
        payment_id: Uuid,
    ) -> Result<(), PaymentError>;

    async fn finalize_payment(&self, payment_id: Uuid, success: bool) -> Result<(), PaymentError>;
}

#[derive(Debug, Deserialize)]
struct CoinsBalanceResponse {
    coins: i64,
}

#[derive(Debug, Deserialize)]
struct ReferralsCountResponse {
    count: i64,
}

#[derive(Debug, Serialize)]
struct InitiatePaymentRequest {
    user_id: i64,
    amount: i64,
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct FinalizePaymentRequest {
    payment_id: String,
    complete: bool,
}

/// 基于 HTTP 的支付网关客户端
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    user_service_url: String,
    referral_service_url: String,
    retries: u32,
}

impl HttpPaymentGateway {
    pub fn new(config: &Config) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout())
            .build()?;

        Ok(Self {
            client,
            user_service_url: config.user_service_url.trim_end_matches('/').to_string(),
            referral_service_url: config.referral_service_url.trim_end_matches('/').to_string(),
            retries: config.client_retries,
        })
    }

    /// 发送请求，超时、连接失败与 5xx 时按指数退避重试。
    /// 四个远程调用都是幂等的，所以都可以重试。
    async fn send_with_retry<F>(
        &self,
        operation: &'static str,
        build: F,
    ) -> Result<Response, PaymentError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let attempts = self.retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            let err = match build(&self.client).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    PaymentError::Rejected {
                        operation,
                        status,
                        message,
                    }
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!("{} attempt {} timed out", operation, attempt);
                    PaymentError::Timeout { attempts: attempt }
                }
                Err(e) => PaymentError::Transport(e),
            };

            if attempt >= attempts || !err.is_ambiguous() {
                return Err(err);
            }

            tracing::warn!(
                "{} attempt {}/{} failed, retrying: {}",
                operation,
                attempt,
                attempts,
                err
            );
            tokio::time::sleep(retry_delay(attempt)).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn coins_balance(&self, user_id: i64) -> Result<i64, PaymentError> {
        let url = format!("{}/users/{}/coins", self.user_service_url, user_id);
        let response = self
            .send_with_retry("get_coins_balance", |client| client.get(&url))
            .await?;
        let body: CoinsBalanceResponse = response.json().await?;
        Ok(body.coins)
    }

    async fn referrals_count(&self, user_id: i64) -> Result<i64, PaymentError> {
        let url = format!("{}/referrals/{}/count", self.referral_service_url, user_id);
        let response = self
            .send_with_retry("get_referrals_count", |client| client.get(&url))
            .await?;
        let body: ReferralsCountResponse = response.json().await?;
        Ok(body.count)
    }

    async fn initiate_payment(
        &self,
        user_id: i64,
        amount: i64,
        payment_id: Uuid,
    ) -> Result<(), PaymentError> {
        let url = format!("{}/payments/initiate", self.user_service_url);
        let body = InitiatePaymentRequest {
            user_id,
            amount,
            transaction_id: payment_id.to_string(),
        };
        self.send_with_retry("initiate_payment", |client| client.post(&url).json(&body))
            .await?;
        Ok(())
    }

    async fn finalize_payment(&self, payment_id: Uuid, success: bool) -> Result<(), PaymentError> {
        let url = format!("{}/payments/finalize", self.user_service_url);
        let body = FinalizePaymentRequest {
            payment_id: payment_id.to_string(),
            complete: success,
        };
        self.send_with_retry("finalize_payment", |client| client.post(&url).json(&body))
            .await?;
        Ok(())
    }
}
