use crate::amount::resolve_amount;
use crate::client::{Host, Service};
use crate::error::Error;
use crate::operators::Operator;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientPhone {
    pub country_code: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderPhone {
    pub country_code: String,
    pub number: String,
}

/// Wire shape of a top-up submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    pub recipient_phone: RecipientPhone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_phone: Option<SenderPhone>,
    pub operator_id: i64,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_identifier: Option<String>,
}

/// Provider confirmation of a top-up, echoing the request fields. Every
/// field tolerates absence so partial provider responses still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopupResponse {
    pub transaction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_identifier: Option<String>,
    pub recipient_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_phone: Option<String>,
    pub country_code: String,
    pub operator_id: Option<i64>,
    pub operator_name: String,
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_currency_code: Option<String>,
    pub requested_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_amount_currency_code: Option<String>,
    pub delivered_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_amount_currency_code: Option<String>,
    #[serde(with = "transaction_date", skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDateTime>,
}

/// The provider formats transaction dates as `2020-09-18 08:26:27`, which is
/// neither RFC 3339 nor a unix timestamp, so it gets its own serde module.
mod transaction_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveDateTime::parse_from_str(&raw, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// How the builder will resolve the operator at submission time. The three
/// variants are mutually exclusive; the last configured one wins.
#[derive(Debug, Clone, Default)]
enum OperatorChoice {
    #[default]
    Unset,
    Explicit(Box<Operator>),
    AutoDetect(String),
}

/// Per-job top-up builder over a shared [`Service`].
///
/// Owned value, created fresh by [`Service::topups`] for every job; nothing
/// here is shared between concurrent workers. A failed by-name search is
/// deferred and surfaces when [`Topups::topup`] runs, matching the fluent
/// call shape `topups().find_operator(..).suggested_amount(..).topup(..)`.
#[derive(Debug, Clone)]
pub struct Topups {
    service: Service,
    choice: OperatorChoice,
    suggested_amount: bool,
    tolerance: f64,
    auto_fallback: bool,
    custom_identifier: Option<String>,
    deferred_error: Option<Error>,
}

impl Topups {
    pub(crate) fn new(service: Service) -> Self {
        Self {
            service,
            choice: OperatorChoice::default(),
            suggested_amount: false,
            tolerance: 0.0,
            auto_fallback: false,
            custom_identifier: None,
            deferred_error: None,
        }
    }

    /// Use this exact operator for the submission.
    pub fn operator(mut self, operator: Operator) -> Self {
        self.choice = OperatorChoice::Explicit(Box::new(operator));
        self
    }

    /// Search the country's catalog for an operator by exact name. A failed
    /// search is remembered and surfaces at submission time.
    pub async fn find_operator(mut self, country: &str, name: &str) -> Self {
        match self.service.search_operator(country, name).await {
            Ok(operator) => {
                self.choice = OperatorChoice::Explicit(Box::new(operator));
                self.deferred_error = None;
            }
            Err(err) => self.deferred_error = Some(err),
        }
        self
    }

    /// Resolve the operator from the recipient's phone number at submission
    /// time. Clears the auto-fallback flag: a submission that already goes
    /// through auto-detection has nothing further to fall back to, and this
    /// reset is what bounds the fallback to a single retry.
    pub fn auto_detect(mut self, country: &str) -> Self {
        self.choice = OperatorChoice::AutoDetect(country.to_string());
        self.auto_fallback = false;
        self
    }

    /// Resolve the payable amount through the operator's denomination model
    /// instead of submitting the target amount verbatim. `tolerance` is the
    /// allowed overshoot above the target.
    pub fn suggested_amount(mut self, tolerance: f64) -> Self {
        self.suggested_amount = true;
        self.tolerance = tolerance;
        self
    }

    /// Retry a rejected submission once through auto-detection.
    pub fn auto_fallback(mut self) -> Self {
        self.auto_fallback = true;
        self
    }

    pub fn custom_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.custom_identifier = Some(identifier.into());
        self
    }

    pub fn auto_fallback_enabled(&self) -> bool {
        self.auto_fallback
    }

    /// The operator a submission would use, when one is already resolved.
    pub fn selected_operator(&self) -> Option<&Operator> {
        match &self.choice {
            OperatorChoice::Explicit(op) => Some(op),
            _ => None,
        }
    }

    /// Submit the top-up. Two-phase by construction: one primary attempt,
    /// then at most one fallback attempt through auto-detection when the
    /// provider rejected the primary for a fallback-eligible reason.
    pub async fn topup(
        mut self,
        phone: &str,
        requested_amount: f64,
    ) -> Result<TopupResponse, Error> {
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }

        let operator = match &self.choice {
            OperatorChoice::AutoDetect(country) => {
                self.service.auto_detect_operator(phone, country).await?
            }
            OperatorChoice::Explicit(operator) => (**operator).clone(),
            OperatorChoice::Unset => {
                return Err(Error::InvalidCall(
                    "you must set an operator before calling topup".into(),
                ))
            }
        };

        match self.attempt(&operator, phone, requested_amount).await {
            Err(err) if self.auto_fallback && err.is_fallback_eligible() => {
                warn!(
                    operator = %operator.name,
                    country = %operator.country.iso_name,
                    error = %err,
                    "submission rejected, falling back to auto-detection"
                );
                let fallback = self
                    .service
                    .auto_detect_operator(phone, &operator.country.iso_name)
                    .await?;
                // Second failure of any kind is returned unchanged.
                self.attempt(&fallback, phone, requested_amount).await
            }
            result => result,
        }
    }

    /// One resolution-and-submission pass against a concrete operator. The
    /// operator is resolved once per attempt and reused for the whole pass.
    async fn attempt(
        &self,
        operator: &Operator,
        phone: &str,
        requested_amount: f64,
    ) -> Result<TopupResponse, Error> {
        let amount = if self.suggested_amount {
            resolve_amount(operator, requested_amount, self.tolerance)?
        } else {
            requested_amount
        };

        let request = TopupRequest {
            recipient_phone: RecipientPhone {
                country_code: operator.country.iso_name.clone(),
                number: phone.to_string(),
            },
            sender_phone: None,
            operator_id: operator.operator_id,
            amount,
            custom_identifier: self.custom_identifier.clone(),
        };

        info!(
            operator = %operator.name,
            operator_id = operator.operator_id,
            amount,
            "submitting top-up"
        );
        self.service.send_topup(&request).await
    }
}

impl Service {
    pub(crate) async fn send_topup(&self, request: &TopupRequest) -> Result<TopupResponse, Error> {
        self.post_json(Host::Topups, "/topups", request).await
    }
}
