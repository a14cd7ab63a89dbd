//! # Endorsement Policy
//!
//! Default "every organization on the channel must sign" policy, in the
//! JSON policy layout the chaincode lifecycle tooling accepts:
//!
//! ```text
//! { "identities": [ { "role": { "name": "member", "mspId": "Org1MSP" } }, ... ],
//!   "policy": { "2-of": [ { "signed-by": 0 }, { "signed-by": 1 } ] } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role name every identity in the default policy carries.
pub const MEMBER_ROLE: &str = "member";

/// Role of a policy identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRole {
    /// Role name (`member`, `admin`, `peer`...).
    pub name: String,
    /// MSP the role is scoped to.
    pub msp_id: String,
}

/// One identity referenced by index from the policy rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyIdentity {
    /// The identity's role.
    pub role: PolicyRole,
}

/// `{ "signed-by": n }` leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBy {
    /// Index into [`EndorsementPolicy::identities`].
    #[serde(rename = "signed-by")]
    pub signed_by: usize,
}

/// Endorsement policy. Empty (`{}`) when the channel has no known peers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementPolicy {
    /// Identities the rule refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<PolicyIdentity>,
    /// `"<n>-of"` rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<BTreeMap<String, Vec<SignedBy>>>,
}

impl EndorsementPolicy {
    /// Require a signature from a member of every listed MSP.
    ///
    /// Duplicates are dropped, keeping first-seen order.
    pub fn member_of_all<I, S>(msp_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for msp in msp_ids {
            let msp = msp.as_ref();
            if !unique.iter().any(|m| m == msp) {
                unique.push(msp.to_string());
            }
        }

        if unique.is_empty() {
            return Self::default();
        }

        let identities = unique
            .iter()
            .map(|msp| PolicyIdentity {
                role: PolicyRole {
                    name: MEMBER_ROLE.to_string(),
                    msp_id: msp.clone(),
                },
            })
            .collect();
        let rule = (0..unique.len())
            .map(|signed_by| SignedBy { signed_by })
            .collect();

        let mut policy = BTreeMap::new();
        policy.insert(format!("{}-of", unique.len()), rule);

        Self {
            identities,
            policy: Some(policy),
        }
    }

    /// Whether the policy has no identities.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Number of signatures the rule requires.
    pub fn required_signatures(&self) -> usize {
        self.policy
            .as_ref()
            .and_then(|rule| rule.keys().next())
            .and_then(|key| key.strip_suffix("-of"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}
