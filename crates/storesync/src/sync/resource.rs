//! Synchronized resource definitions.

use std::path::{Path, PathBuf};

/// A paginated collection to synchronize.
///
/// `field` is the connection field under `data` in both the GraphQL response
/// and the snapshot file. The query must declare `$first: Int!` and
/// `$after: String` and select `edges { cursor node { id ... } }` plus
/// `pageInfo { hasNextPage endCursor }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub field: String,
    pub query: String,
    pub snapshot_path: PathBuf,
}

impl Resource {
    pub fn new(
        field: impl Into<String>,
        query: impl Into<String>,
        snapshot_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Store the snapshot somewhere else.
    pub fn with_snapshot_path(mut self, snapshot_path: impl AsRef<Path>) -> Self {
        self.snapshot_path = snapshot_path.as_ref().to_path_buf();
        self
    }

    /// Customers with contact details, spend and addresses.
    pub fn customers() -> Self {
        Self::new("customers", CUSTOMERS_QUERY, "customer.json")
    }

    /// Orders with totals, customer, line items and shipping.
    pub fn orders() -> Self {
        Self::new("orders", ORDERS_QUERY, "orders.json")
    }

    /// Products with their first variants.
    pub fn products() -> Self {
        Self::new("products", PRODUCTS_QUERY, "products.json")
    }

    /// Names accepted by [`Resource::preset`].
    pub const PRESETS: [&'static str; 3] = ["customers", "orders", "products"];

    /// Look up a built-in resource by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "customers" => Some(Self::customers()),
            "orders" => Some(Self::orders()),
            "products" => Some(Self::products()),
            _ => None,
        }
    }
}

const CUSTOMERS_QUERY: &str = r#"
query GetCustomers($first: Int!, $after: String) {
  customers(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        firstName
        lastName
        email
        phone
        numberOfOrders
        amountSpent {
          amount
          currencyCode
        }
        createdAt
        updatedAt
        note
        verifiedEmail
        validEmailAddress
        tags
        lifetimeDuration
        defaultAddress {
          formattedArea
          address1
        }
        addresses {
          address1
        }
        image {
          src
        }
        canDelete
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

const ORDERS_QUERY: &str = r#"
query GetOrders($first: Int!, $after: String) {
  orders(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        name
        createdAt
        updatedAt
        currencyCode
        totalPriceSet {
          presentmentMoney {
            amount
            currencyCode
          }
        }
        subtotalPriceSet {
          presentmentMoney {
            amount
            currencyCode
          }
        }
        customer {
          id
          firstName
          lastName
          email
        }
        lineItems(first: 10) {
          edges {
            node {
              title
              quantity
              sku
              originalUnitPrice
              variantTitle
            }
          }
        }
        shippingAddress {
          address1
          city
          zip
          country
          phone
        }
        shippingLine {
          title
          originalPriceSet {
            presentmentMoney {
              amount
              currencyCode
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

const PRODUCTS_QUERY: &str = r#"
query GetProducts($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        title
        createdAt
        updatedAt
        variants(first: 10) {
          edges {
            node {
              id
              title
              sku
              price
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;
