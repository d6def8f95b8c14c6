//! Typed identifiers for models and services
//!
//! Both serialize as bare UUID strings so archives stay readable by older
//! builds. On screen they print as a short prefixed form (`mdl-1a2b3c4d`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! workbook_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Whether `identifier` names this id, in full or short form
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim();
                match identifier.parse::<Self>() {
                    Ok(parsed) => parsed == *self,
                    Err(_) => identifier == self.to_string(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let simple = self.0.simple().to_string();
                write!(f, "{}{}", Self::PREFIX, &simple[..8])
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            /// Accepts a full UUID with or without the display prefix
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix(Self::PREFIX).unwrap_or(s);
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

workbook_id!(
    /// Identifies a budget model across renames, exports and imports
    ModelId,
    "mdl-"
);
workbook_id!(
    /// Identifies a service within one model
    ServiceId,
    "svc-"
);
