use crate::client::{Host, Service};
use crate::error::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub global: bool,
    pub sender_fee: f64,
    pub discount_percentage: f64,
    pub denomination_type: String,
    pub recipient_currency_code: String,
    pub min_recipient_denomination: Option<f64>,
    pub max_recipient_denomination: Option<f64>,
    pub sender_currency_code: String,
    pub min_sender_denomination: Option<f64>,
    pub max_sender_denomination: Option<f64>,
    pub fixed_recipient_denominations: Vec<f64>,
    pub fixed_sender_denominations: Vec<f64>,
    pub logo_urls: Vec<String>,
    pub brand_id: i64,
    pub brand_name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductsPage {
    pub content: Vec<Product>,
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedeemInstructions {
    pub brand_id: i64,
    pub brand_name: String,
    pub concise: String,
    pub verbose: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Discount {
    pub product: Option<Product>,
    pub discount_percentage: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscountsPage {
    pub content: Vec<Discount>,
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GiftCardTransaction {
    pub transaction_id: i64,
    pub amount: f64,
    pub discount: f64,
    pub currency_code: String,
    pub fee: f64,
    pub recipient_email: String,
    pub custom_identifier: String,
    pub status: String,
    pub transaction_created_time: String,
    pub product_id: i64,
    pub product_name: String,
    pub country_code: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub brand_id: i64,
    pub brand_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionsPage {
    pub content: Vec<GiftCardTransaction>,
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardOrder {
    pub product_id: i64,
    pub country_code: String,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_identifier: Option<String>,
    pub sender_name: String,
    pub recipient_email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub card_number: String,
    pub pin_code: String,
}

/// The gift-card sub-API: plain catalog and order calls against the
/// gift-card host, with no resolution logic of its own.
pub struct GiftCards {
    service: Service,
}

impl GiftCards {
    pub(crate) fn new(service: Service) -> Self {
        Self { service }
    }

    pub async fn products(&self, page: i64, size: i64) -> Result<ProductsPage, Error> {
        let page_str = page.to_string();
        let size_str = size.to_string();
        let query = [("page", page_str.as_str()), ("size", size_str.as_str())];
        let mut result: ProductsPage = self
            .service
            .get_json(Host::GiftCards, "/products", &query)
            .await?;
        result.page = page;
        Ok(result)
    }

    pub async fn product(&self, product_id: i64) -> Result<Product, Error> {
        let path = format!("/products/{}", product_id);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }

    pub async fn products_by_country(&self, country: &str) -> Result<Vec<Product>, Error> {
        let path = format!("/countries/{}/products", country);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }

    pub async fn redeem_instructions(&self) -> Result<Vec<RedeemInstructions>, Error> {
        self.service
            .get_json(Host::GiftCards, "/redeem-instructions", &[])
            .await
    }

    pub async fn redeem_instructions_by_brand(
        &self,
        brand_id: i64,
    ) -> Result<RedeemInstructions, Error> {
        let path = format!("/redeem-instructions/{}", brand_id);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }

    pub async fn discounts(&self, page: i64, size: i64) -> Result<DiscountsPage, Error> {
        let page_str = page.to_string();
        let size_str = size.to_string();
        let query = [("page", page_str.as_str()), ("size", size_str.as_str())];
        let mut result: DiscountsPage = self
            .service
            .get_json(Host::GiftCards, "/discounts", &query)
            .await?;
        result.page = page;
        Ok(result)
    }

    pub async fn discount_by_product(&self, product_id: i64) -> Result<Discount, Error> {
        let path = format!("/products/{}/discounts", product_id);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }

    pub async fn transactions(&self, page: i64, size: i64) -> Result<TransactionsPage, Error> {
        let page_str = page.to_string();
        let size_str = size.to_string();
        let query = [("page", page_str.as_str()), ("size", size_str.as_str())];
        let mut result: TransactionsPage = self
            .service
            .get_json(Host::GiftCards, "/reports/transactions", &query)
            .await?;
        result.page = page;
        Ok(result)
    }

    pub async fn transaction(&self, transaction_id: i64) -> Result<GiftCardTransaction, Error> {
        let path = format!("/reports/transactions/{}", transaction_id);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }

    pub async fn order(&self, order: GiftCardOrder) -> Result<GiftCardTransaction, Error> {
        self.service.post_json(Host::GiftCards, "/orders", &order).await
    }

    /// Card numbers and PINs for a completed order.
    pub async fn redeem_code(&self, transaction_id: i64) -> Result<Vec<Card>, Error> {
        let path = format!("/orders/transactions/{}/cards", transaction_id);
        self.service.get_json(Host::GiftCards, &path, &[]).await
    }
}
