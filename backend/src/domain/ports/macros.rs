//! `define_port_error!`: error enums for driven ports.
//!
//! Each variant gets a `#[error(..)]` message and a snake_case constructor.
//! Struct variants take every field as `impl Into<FieldType>`, so callers can
//! write `UserPersistenceError::query("timeout")` with a `&str`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $( define_port_error!(@constructor $variant $( { $($field : $ty),* } )?); )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct [`Self::" $variant "`]."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = "Construct [`Self::" $variant "`]."]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Errors from a fictional account store.
        pub enum AccountStoreError {
            Gone => "account gone",
            Rejected { reason: String } => "rejected: {reason}",
            Throttled { scope: String, retry_after_secs: u64 } => "{scope} throttled for {retry_after_secs}s",
        }
    }

    #[test]
    fn unit_variant_constructor_takes_no_arguments() {
        assert_eq!(AccountStoreError::gone(), AccountStoreError::Gone);
        assert_eq!(AccountStoreError::gone().to_string(), "account gone");
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = AccountStoreError::rejected("email taken");
        assert_eq!(
            err,
            AccountStoreError::Rejected {
                reason: "email taken".to_owned()
            }
        );
        assert_eq!(err.to_string(), "rejected: email taken");
    }

    #[test]
    fn multi_field_variant_formats_every_field() {
        let err = AccountStoreError::throttled("login", 30_u64);
        assert_eq!(err.to_string(), "login throttled for 30s");
    }
}
