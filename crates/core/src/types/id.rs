//! Row identifiers.
//!
//! Every table in the `grabit` schema has a `SERIAL` primary key. Each one
//! gets its own wrapper so a `ProductId` cannot be passed where a `UserId`
//! is expected.

macro_rules! entity_id {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw key.
            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    )+};
}

entity_id! {
    /// `grabit.user`
    UserId,
    /// `grabit.product`
    ProductId,
    /// `grabit.product_image`
    ProductImageId,
    /// `grabit.product_question`
    QuestionId,
    /// `grabit.product_rating`
    RatingId,
    /// `grabit.category`
    CategoryId,
    /// `grabit.store_account`
    StoreAccountId,
    /// `grabit.cart`
    CartId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_conversions() {
        let id = ProductId::from(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
    }

    #[test]
    fn test_display_is_the_raw_key() {
        assert_eq!(UserId::new(7).to_string(), "7");
        assert_eq!(format!("/product/{}", ProductId::new(12)), "/product/12");
    }

    #[test]
    fn test_serializes_as_a_bare_number() {
        let json = serde_json::to_string(&CategoryId::new(3)).unwrap_or_default();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_orders_by_key() {
        assert!(StoreAccountId::new(1) < StoreAccountId::new(2));
    }
}
