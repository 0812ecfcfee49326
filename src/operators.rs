use crate::client::{Host, Service};
use crate::error::Error;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Query parameters sent with every operator lookup so responses always
/// carry the suggested-amount tables the resolver needs.
const OPERATOR_PARAMS: [(&str, &str); 2] = [
    ("suggestedAmounts", "true"),
    ("suggestedAmountsMap", "true"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Country {
    pub iso_name: String,
    pub name: String,
}

/// Payable-currency units per one deliverable-currency unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fx {
    pub rate: f64,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fees {
    pub international: f64,
    pub local: f64,
    pub local_percentage: f64,
    pub international_percentage: f64,
}

/// One payable/deliverable pair from a FIXED operator's suggested-amount map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestedAmount {
    /// Amount charged in the sender currency.
    pub pay: f64,
    /// Amount delivered in the destination currency.
    pub sent: f64,
}

/// Location-scoped amount lists for operators that price per region. The
/// first plan is the default when the recipient's location is unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeographicalRechargePlan {
    pub location_code: String,
    pub location_name: String,
    pub fixed_amounts: Vec<f64>,
    pub local_amounts: Vec<f64>,
    pub fixed_amounts_plan_names: HashMap<String, String>,
    pub fixed_amounts_descriptions: HashMap<String, String>,
    pub local_fixed_amounts_plan_names: HashMap<String, String>,
    pub local_fixed_amounts_descriptions: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denomination {
    #[default]
    #[serde(rename = "FIXED")]
    Fixed,
    #[serde(rename = "RANGE")]
    Range,
}

/// An operator record as returned by the catalog endpoints.
///
/// Amount bounds are `Option<f64>` because the provider serializes them as
/// nullable fields; absence is meaningful and distinct from a zero bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operator {
    pub id: i64,
    pub operator_id: i64,
    pub name: String,
    pub bundle: bool,
    pub data: bool,
    pub pin: bool,
    pub combo_product: bool,
    pub supports_local_amounts: bool,
    pub supports_geographical_recharge_plans: bool,
    pub denomination_type: Denomination,
    pub sender_currency_code: String,
    pub sender_currency_symbol: String,
    pub destination_currency_code: String,
    pub destination_currency_symbol: String,
    pub commission: f64,
    pub international_discount: f64,
    pub local_discount: f64,
    pub most_popular_amount: Option<f64>,
    pub most_popular_local_amount: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub local_min_amount: Option<f64>,
    pub local_max_amount: Option<f64>,
    pub country: Country,
    pub fx: Fx,
    #[serde(deserialize_with = "de_null_as_default")]
    pub logo_urls: Vec<String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub fixed_amounts: Vec<f64>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub fixed_amounts_descriptions: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub local_fixed_amounts: Vec<f64>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub local_fixed_amounts_descriptions: HashMap<String, String>,
    #[serde(deserialize_with = "de_null_as_default")]
    pub suggested_amounts: Vec<f64>,
    #[serde(
        deserialize_with = "de_suggested_amounts_map",
        serialize_with = "ser_suggested_amounts_map"
    )]
    pub suggested_amounts_map: Vec<SuggestedAmount>,
    pub fees: Fees,
    #[serde(deserialize_with = "de_null_as_default")]
    pub geographical_recharge_plans: Vec<GeographicalRechargePlan>,
}

impl Operator {
    /// Fixed amounts for this operator, falling back to the default
    /// geographical plan when the operator prices per region.
    pub fn fixed_amounts(&self) -> &[f64] {
        match self.default_geographical_plan() {
            Some(plan) => &plan.fixed_amounts,
            None => &self.fixed_amounts,
        }
    }

    pub fn local_fixed_amounts(&self) -> &[f64] {
        match self.default_geographical_plan() {
            Some(plan) => &plan.local_amounts,
            None => &self.local_fixed_amounts,
        }
    }

    pub fn fixed_amounts_descriptions(&self) -> &HashMap<String, String> {
        match self.default_geographical_plan() {
            Some(plan) => &plan.fixed_amounts_descriptions,
            None => &self.fixed_amounts_descriptions,
        }
    }

    pub fn local_fixed_amounts_descriptions(&self) -> &HashMap<String, String> {
        match self.default_geographical_plan() {
            Some(plan) => &plan.local_fixed_amounts_descriptions,
            None => &self.local_fixed_amounts_descriptions,
        }
    }

    /// The first geographical plan, used as the default when the recipient's
    /// location is unknown. `None` unless the operator flags geographical
    /// support and actually carries plans.
    pub fn default_geographical_plan(&self) -> Option<&GeographicalRechargePlan> {
        if !self.supports_geographical_recharge_plans {
            return None;
        }
        self.geographical_recharge_plans.first()
    }

    pub fn geographical_plan_by_location_code(
        &self,
        location_code: &str,
    ) -> Option<&GeographicalRechargePlan> {
        if !self.supports_geographical_recharge_plans {
            return None;
        }
        self.geographical_recharge_plans
            .iter()
            .find(|plan| plan.location_code == location_code)
    }

    pub fn geographical_plan_by_location_name(
        &self,
        location_name: &str,
    ) -> Option<&GeographicalRechargePlan> {
        if !self.supports_geographical_recharge_plans {
            return None;
        }
        self.geographical_recharge_plans
            .iter()
            .find(|plan| plan.location_name == location_name)
    }
}

/// The provider serializes empty amount tables as `null` rather than `[]` /
/// `{}` (RANGE operators carry no suggested-amounts map at all); treat null
/// like an absent field.
fn de_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The wire shape is a JSON object of payable-amount strings to deliverable
/// numbers, or `null`; flatten it into pairs the resolver can sort.
fn de_suggested_amounts_map<'de, D>(deserializer: D) -> Result<Vec<SuggestedAmount>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, f64>>::deserialize(deserializer)?.unwrap_or_default();
    raw.into_iter()
        .map(|(pay, sent)| {
            pay.parse::<f64>()
                .map(|pay| SuggestedAmount { pay, sent })
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

fn ser_suggested_amounts_map<S>(
    amounts: &[SuggestedAmount],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(amounts.len()))?;
    for amount in amounts {
        map.serialize_entry(&amount.pay.to_string(), &amount.sent)?;
    }
    map.end()
}

impl Service {
    /// All operators serving a country.
    pub async fn operators_by_country(&self, country: &str) -> Result<Vec<Operator>, Error> {
        let path = format!("/operators/countries/{}", country);
        self.get_json(Host::Topups, &path, &OPERATOR_PARAMS).await
    }

    /// A single operator by its catalog id.
    pub async fn operator_by_id(&self, operator_id: i64) -> Result<Operator, Error> {
        let path = format!("/operators/{}", operator_id);
        self.get_json(Host::Topups, &path, &OPERATOR_PARAMS).await
    }

    /// Resolve the operator serving a phone number in a country.
    pub async fn auto_detect_operator(
        &self,
        phone: &str,
        country: &str,
    ) -> Result<Operator, Error> {
        let path = format!(
            "/operators/auto-detect/phone/{}/countries/{}",
            phone, country
        );
        self.get_json(Host::Topups, &path, &OPERATOR_PARAMS).await
    }

    /// Exact, case-sensitive name match against the country's operator list.
    /// An empty match is a client-synthesized [`Error::OperatorNotFound`],
    /// not a provider response.
    pub async fn search_operator(&self, country: &str, name: &str) -> Result<Operator, Error> {
        let operators = self.operators_by_country(country).await?;
        debug!(
            country,
            name,
            candidates = operators.len(),
            "searching operator by name"
        );

        operators
            .into_iter()
            .find(|op| op.name == name)
            .ok_or_else(|| Error::OperatorNotFound {
                name: name.to_string(),
                country: country.to_string(),
            })
    }
}
