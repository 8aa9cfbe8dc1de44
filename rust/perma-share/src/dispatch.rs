use perma_storage::Reference;

use crate::{Authorization, DenialReason};

/// How an authorized blob should be handed to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// The blob's bytes, exactly as stored
    #[default]
    Raw,
    /// The contents of the file the blob describes, reassembled from its
    /// parts
    Assembled,
}

/// Decide how to deliver `target` once a chain has been verified.
///
/// Assembly reads every blob a file descriptor points to, so it is only
/// allowed through a transitive share. Raw delivery needs nothing beyond the
/// verified chain.
pub fn dispatch(
    authorization: &Authorization,
    requested: Delivery,
    target: &Reference,
) -> Result<Delivery, DenialReason> {
    match requested {
        Delivery::Assembled if !authorization.is_transitive() => {
            Err(DenialReason::AssemblyNotTransitive {
                target: target.clone(),
            })
        }
        delivery => Ok(delivery),
    }
}
