//! The persisted aggregate
//!
//! The on-disk shape is a single JSON object:
//!
//! ```json
//! {
//!   "chirps": { "1": { "id": 1, "body": "hello", "author_id": 1 } },
//!   "users": { "1": { "id": 1, "email": "a@b.c", "password": "...", "is_chirpy_red": false } },
//!   "revoked_tokens": { "<token>": {} },
//!   "sequences": { "chirps": 1, "users": 1 }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::chirp::{Chirp, ChirpId};
use crate::user::{User, UserId};

/// Every chirp, user, and revoked token, loaded and persisted as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub chirps: BTreeMap<ChirpId, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default, with = "token_set")]
    pub revoked_tokens: BTreeSet<String>,
    #[serde(default)]
    pub sequences: Sequences,
}

/// Last id handed out per entity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub chirps: u64,
    #[serde(default)]
    pub users: u64,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next chirp id. Ids are never reused, even after deletes.
    pub fn next_chirp_id(&mut self) -> ChirpId {
        self.sequences.chirps += 1;
        ChirpId(self.sequences.chirps)
    }

    /// Reserve the next user id
    pub fn next_user_id(&mut self) -> UserId {
        self.sequences.users += 1;
        UserId(self.sequences.users)
    }

    /// Raise the sequences to at least the highest stored id.
    ///
    /// Documents written without a `sequences` object (or edited by hand) would
    /// otherwise hand out ids that are already taken.
    pub(crate) fn reconcile_sequences(&mut self) {
        if let Some(ChirpId(max)) = self.chirps.keys().next_back() {
            self.sequences.chirps = self.sequences.chirps.max(*max);
        }
        if let Some(UserId(max)) = self.users.keys().next_back() {
            self.sequences.users = self.sequences.users.max(*max);
        }
    }
}

/// Encodes a set of tokens as a JSON object whose values are all `{}`
mod token_set {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::de::IgnoredAny;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct Marker {}

    pub fn serialize<S: Serializer>(set: &BTreeSet<String>, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(set.len()))?;
        for token in set {
            map.serialize_entry(token, &Marker {})?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
        let map = BTreeMap::<String, IgnoredAny>::deserialize(deserializer)?;
        Ok(map.into_keys().collect())
    }
}
