use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Digest, Sha224};

use crate::PermaStorageError;

/// The hash functions a [Reference] may be derived with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// BLAKE3, the default for newly stored blobs
    Blake3,
    /// SHA-224, accepted for blobs named by older clients
    Sha224,
}

impl HashAlgorithm {
    /// The name used as the prefix of a reference's canonical text.
    pub const fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Sha224 => "sha224",
        }
    }

    /// The size of a digest produced by this algorithm, in bytes.
    pub const fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Blake3 => 32,
            HashAlgorithm::Sha224 => 28,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "blake3" => Some(HashAlgorithm::Blake3),
            "sha224" => Some(HashAlgorithm::Sha224),
            _ => None,
        }
    }

    fn digest(&self, bytes: &[u8]) -> Box<[u8]> {
        match self {
            HashAlgorithm::Blake3 => blake3::hash(bytes).as_bytes().to_vec().into_boxed_slice(),
            HashAlgorithm::Sha224 => Sha224::digest(bytes).to_vec().into_boxed_slice(),
        }
    }
}

/// An opaque, content-derived name for a blob.
///
/// The canonical text form is `<hash-name>-<lowercase hex digest>`, for
/// example `blake3-af1349b9…`. Parsing is strict: the hash name must be known,
/// the digest must have exactly the algorithm's length and only lowercase hex
/// digits are accepted. Two references are equal exactly when their canonical
/// texts are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    algorithm: HashAlgorithm,
    digest: Box<[u8]>,
}

impl Reference {
    /// The reference of `bytes` under the default [HashAlgorithm].
    pub fn of<B>(bytes: B) -> Self
    where
        B: AsRef<[u8]>,
    {
        Self::of_with(HashAlgorithm::Blake3, bytes)
    }

    /// The reference of `bytes` under the given [HashAlgorithm].
    pub fn of_with<B>(algorithm: HashAlgorithm, bytes: B) -> Self
    where
        B: AsRef<[u8]>,
    {
        Reference {
            algorithm,
            digest: algorithm.digest(bytes.as_ref()),
        }
    }

    /// The algorithm this reference was derived with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// True if `bytes` hash to this reference under its own algorithm.
    pub fn verifies<B>(&self, bytes: B) -> bool
    where
        B: AsRef<[u8]>,
    {
        self.algorithm.digest(bytes.as_ref()) == self.digest
    }
}

impl FromStr for Reference {
    type Err = PermaStorageError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || PermaStorageError::InvalidReference(text.to_string());

        let (name, digest) = text.split_once('-').ok_or_else(malformed)?;
        let algorithm = HashAlgorithm::from_name(name).ok_or_else(malformed)?;

        // `hex` accepts uppercase digits; the canonical form does not
        if digest.len() != algorithm.digest_size() * 2
            || !digest.bytes().all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(malformed());
        }

        let digest = hex::decode(digest).map_err(|_| malformed())?;

        Ok(Reference {
            algorithm,
            digest: digest.into_boxed_slice(),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm.name(), hex::encode(&self.digest))
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({self})")
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
