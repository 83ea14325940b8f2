//! Shared domain enums, stored as TEXT and exchanged as SCREAMING_SNAKE_CASE strings

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Implements string conversions and SQLx TEXT encoding for a fieldless enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// Physical format of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookType {
    #[default]
    PhysicalBook,
    Ebook,
    AudioBook,
}

text_enum!(BookType {
    PhysicalBook => "PHYSICAL_BOOK",
    Ebook => "EBOOK",
    AudioBook => "AUDIO_BOOK",
});

/// Stock status of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    #[default]
    Available,
    OutOfStock,
    Discontinued,
}

text_enum!(BookStatus {
    Available => "AVAILABLE",
    OutOfStock => "OUT_OF_STOCK",
    Discontinued => "DISCONTINUED",
});

// ---------------------------------------------------------------------------
// Borrow transactions
// ---------------------------------------------------------------------------

/// Lifecycle of a borrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Awaiting administrator approval (approval mode only)
    Pending,
    Active,
    Overdue,
    Returned,
    ReturnedOverdue,
    Rejected,
}

text_enum!(TransactionStatus {
    Pending => "PENDING",
    Active => "ACTIVE",
    Overdue => "OVERDUE",
    Returned => "RETURNED",
    ReturnedOverdue => "RETURNED_OVERDUE",
    Rejected => "REJECTED",
});

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    PendingPayment,
    PendingApproval,
    Completed,
    Cancelled,
}

text_enum!(OrderStatus {
    Draft => "DRAFT",
    PendingPayment => "PENDING_PAYMENT",
    PendingApproval => "PENDING_APPROVAL",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    None,
    ManualTransfer,
    OnlineGateway,
    OnlineBanking,
}

text_enum!(PaymentMethod {
    None => "NONE",
    ManualTransfer => "MANUAL_TRANSFER",
    OnlineGateway => "ONLINE_GATEWAY",
    OnlineBanking => "ONLINE_BANKING",
});

/// Whether an order line was free or paid at checkout time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Free,
    Paid,
}

text_enum!(ItemType {
    Free => "FREE",
    Paid => "PAID",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_storage_names() {
        assert_eq!(
            serde_json::to_value(BookStatus::OutOfStock).unwrap(),
            serde_json::json!(BookStatus::OutOfStock.as_str())
        );
        assert_eq!(
            serde_json::to_value(TransactionStatus::ReturnedOverdue).unwrap(),
            serde_json::json!("RETURNED_OVERDUE")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::ManualTransfer).unwrap(),
            serde_json::json!("MANUAL_TRANSFER")
        );
        assert_eq!(
            serde_json::to_value(BookType::AudioBook).unwrap(),
            serde_json::json!("AUDIO_BOOK")
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("PENDING_APPROVAL".parse::<OrderStatus>(), Ok(OrderStatus::PendingApproval));
        assert_eq!("FREE".parse::<ItemType>(), Ok(ItemType::Free));
        assert!("available".parse::<BookStatus>().is_err());
    }

    #[test]
    fn test_terminal_order_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::PendingPayment.is_terminal());
        assert!(!OrderStatus::PendingApproval.is_terminal());
    }
}
