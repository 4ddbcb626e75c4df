//! 32-byte identifiers.
//!
//! All three render as `0x`-prefixed lowercase hex and serialize as that
//! string, which is the shape the storage layer and RPC callers exchange.

use std::fmt;
use std::str::FromStr;

use filetrie_crypto::encoding::{decode_hex32, to_prefixed_hex};

use crate::{Hash, TypesError};

macro_rules! hash_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            serde_with::SerializeDisplay,
            serde_with::DeserializeFromStr,
        )]
        pub struct $name(Hash);

        impl $name {
            pub const fn new(bytes: Hash) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &Hash {
                &self.0
            }

            pub const fn to_bytes(self) -> Hash {
                self.0
            }
        }

        impl From<Hash> for $name {
            fn from(bytes: Hash) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for Hash {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&to_prefixed_hex(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_hex32(s)
                    .map(Self)
                    .map_err(|source| TypesError::InvalidId { kind: $kind, source })
            }
        }
    };
}

hash_id!(
    /// Root of the chunk trie of one file.
    Fingerprint,
    "fingerprint"
);

hash_id!(
    /// Network-wide file identity: hash of the encoded file metadata.
    FileKey,
    "file key"
);

hash_id!(
    /// Identifier of the bucket a file is placed in.
    BucketId,
    "bucket id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_prefixed_lowercase_hex() {
        let fp = Fingerprint::new([0xAB; 32]);
        let rendered = fp.to_string();
        assert_eq!(rendered, format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn test_parse_accepts_bare_and_prefixed() {
        let bare = "11".repeat(32);
        let a: FileKey = bare.parse().expect("bare hex");
        let b: FileKey = format!("0x{bare}").parse().expect("prefixed hex");
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), &[0x11; 32]);
    }

    #[test]
    fn test_parse_rejects_extra_byte() {
        let exact = "34eb5f637e05fc18f857ccb013250076534192189894d174ee3aa6d3525f6970";
        assert!(exact.parse::<Fingerprint>().is_ok());
        assert!(format!("{exact}00").parse::<Fingerprint>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = BucketId::new([0x01; 32]);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(32)));
        let back: BucketId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_serde_rejects_short_id() {
        let result: std::result::Result<FileKey, _> = serde_json::from_str("\"0x1234\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_names_the_type() {
        let fp = Fingerprint::default();
        assert!(format!("{fp:?}").starts_with("Fingerprint(0x0000"));
    }
}
