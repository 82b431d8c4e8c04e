use serde_json::json;
use tracker_domain::{Money, UserProfile};

use crate::{
    backend::{paths, BackendClient},
    records::{self, DecodeReport},
    validation, CoreError,
};

pub struct ProfileService;

impl ProfileService {
    /// Loads the signed-in user's profile. A missing document yields an empty
    /// profile carrying the default target.
    pub fn profile(client: &BackendClient) -> Result<(UserProfile, DecodeReport), CoreError> {
        let user = client.require_user()?;
        match client.store.get(paths::USERS, &user.uid)? {
            Some(document) => Ok(records::decode_profile(&document)),
            None => {
                let mut profile = records::empty_profile();
                profile.uid = user.uid;
                profile.email = user.email;
                Ok((profile, DecodeReport::default()))
            }
        }
    }

    /// Stores a new savings target, which must be greater than zero.
    pub fn set_target_balance(client: &BackendClient, target: Money) -> Result<Money, CoreError> {
        let target = validation::ensure_positive(target)?;
        let user = client.require_user()?;
        let patch = json!({ "targetBalance": target });
        match client.store.get(paths::USERS, &user.uid)? {
            Some(_) => client.store.update(paths::USERS, &user.uid, patch)?,
            None => client.store.set(paths::USERS, &user.uid, patch)?,
        }
        tracing::info!(uid = %user.uid, %target, "target balance updated");
        Ok(target)
    }

    pub fn set_target_from_input(client: &BackendClient, raw: &str) -> Result<Money, CoreError> {
        let target = validation::parse_amount(raw)?;
        Self::set_target_balance(client, target)
    }
}
