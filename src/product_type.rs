use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marketplace product entity types known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    ServerProduct,
    ContainerProduct,
    DataProduct,
    MachinelearningProduct,
    SaaSProduct,
    ServiceProduct,
    SolutionProduct,
    SupportProduct,
}

impl ProductType {
    /// Every product type, in the order entity lookups scan them
    pub const ALL: [ProductType; 8] = [
        ProductType::ServerProduct,
        ProductType::ContainerProduct,
        ProductType::DataProduct,
        ProductType::MachinelearningProduct,
        ProductType::SaaSProduct,
        ProductType::ServiceProduct,
        ProductType::SolutionProduct,
        ProductType::SupportProduct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::ServerProduct => "ServerProduct",
            ProductType::ContainerProduct => "ContainerProduct",
            ProductType::DataProduct => "DataProduct",
            ProductType::MachinelearningProduct => "MachinelearningProduct",
            ProductType::SaaSProduct => "SaaSProduct",
            ProductType::ServiceProduct => "ServiceProduct",
            ProductType::SolutionProduct => "SolutionProduct",
            ProductType::SupportProduct => "SupportProduct",
        }
    }

    /// Versioned entity type used when addressing a change, e.g. `ContainerProduct@1.0`
    pub fn entity_type_identifier(&self) -> String {
        format!("{}@1.0", self.as_str())
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ProductTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| ProductTypeError::Unknown(s.to_string()))
    }
}

/// Which product types a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSelection {
    All,
    One(ProductType),
}

impl ProductSelection {
    pub fn product_types(&self) -> Vec<ProductType> {
        match self {
            ProductSelection::All => ProductType::ALL.to_vec(),
            ProductSelection::One(product_type) => vec![*product_type],
        }
    }
}

impl FromStr for ProductSelection {
    type Err = ProductTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(ProductSelection::All);
        }
        s.parse().map(ProductSelection::One)
    }
}

#[derive(Debug, Error)]
pub enum ProductTypeError {
    #[error("invalid product type: {0}. Valid types are: {}, or use 'all' to list all types", valid_type_names())]
    Unknown(String),
}

fn valid_type_names() -> String {
    ProductType::ALL
        .iter()
        .map(ProductType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
