/*
 * Responsibility
 * - Homes の request/response DTO
 * - id は公開 ID (encode 済み) を返す。内部 ID は漏らさない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Residential,
    Condo,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "RESIDENTIAL",
            PropertyType::Condo => "CONDO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RESIDENTIAL" => Some(Self::Residential),
            "CONDO" => Some(Self::Condo),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_type: Option<PropertyType>,
}

impl HomeQuery {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err("min_price must be <= max_price");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHomeRequest {
    pub address: String,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub city: String,
    pub price: f64,
    pub land_size: f64,
    pub property_type: PropertyType,
    #[serde(default)]
    pub images: Vec<ImageRequest>,
}

impl CreateHomeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.address.trim().is_empty() {
            return Err("address is required");
        }
        if self.city.trim().is_empty() {
            return Err("city is required");
        }
        if self.number_of_bedrooms < 0 || !non_negative(self.number_of_bathrooms) {
            return Err("room counts must be positive");
        }
        if !non_negative(self.price) || !non_negative(self.land_size) {
            return Err("price and land_size must be positive");
        }
        if self.images.iter().any(|i| i.url.trim().is_empty()) {
            return Err("image url cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHomeRequest {
    pub address: Option<String>,
    pub number_of_bedrooms: Option<i32>,
    pub number_of_bathrooms: Option<f64>,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub land_size: Option<f64>,
    pub property_type: Option<PropertyType>,
}

impl UpdateHomeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(address) = &self.address
            && address.trim().is_empty()
        {
            return Err("address cannot be empty");
        }
        if let Some(city) = &self.city
            && city.trim().is_empty()
        {
            return Err("city cannot be empty");
        }
        if self.number_of_bedrooms.is_some_and(|n| n < 0)
            || self.number_of_bathrooms.is_some_and(|n| !non_negative(n))
        {
            return Err("room counts must be positive");
        }
        if self.price.is_some_and(|n| !non_negative(n))
            || self.land_size.is_some_and(|n| !non_negative(n))
        {
            return Err("price and land_size must be positive");
        }
        Ok(())
    }
}

fn non_negative(n: f64) -> bool {
    n.is_finite() && n >= 0.0
}

#[derive(Debug, Serialize)]
pub struct HomeSummaryResponse {
    pub id: String, // encoded
    pub address: String,
    pub city: String,
    pub price: f64,
    pub property_type: PropertyType,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub id: String, // encoded
    pub address: String,
    pub city: String,
    pub price: f64,
    pub land_size: f64,
    pub property_type: PropertyType,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub listed_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RealtorResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct HomeDetailResponse {
    #[serde(flatten)]
    pub home: HomeResponse,
    pub images: Vec<String>,
    pub realtor: Option<RealtorResponse>,
}
