use anchor_lang::prelude::*;

use crate::constants::MAX_URI_LENGTH;

/// Classification derived from a publication's pointer and collect module.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PubType {
    Post,
    Comment,
    Mirror,
    Nonexistent,
}

// =============================================================================
// PUBLICATION
// =============================================================================
// Keyed by (profile_id, pub_id). A pointer of (0, 0) marks a post. Pointers
// always reference an already existing publication, so following mirror
// pointers strictly walks backwards and terminates at a post or comment.
// =============================================================================

#[account]
pub struct Publication {
    pub profile_id: u64,
    pub pub_id: u64,
    pub pointed_profile_id: u64,
    pub pointed_pub_id: u64,
    /// Content reference; empty for mirrors
    pub content_uri: String,
    /// None for mirrors
    pub collect_module: Option<Pubkey>,
    /// Gate on who may comment on or mirror this publication
    pub reference_module: Option<Pubkey>,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl Publication {
    pub const SIZE: usize = 8 +         // discriminator
        8 +                             // profile_id
        8 +                             // pub_id
        8 +                             // pointed_profile_id
        8 +                             // pointed_pub_id
        4 + MAX_URI_LENGTH +            // content_uri
        33 +                            // collect_module
        33 +                            // reference_module
        8 +                             // created_at
        1;                              // bump

    pub fn id(&self) -> (u64, u64) {
        (self.profile_id, self.pub_id)
    }

    pub fn pointer(&self) -> Option<(u64, u64)> {
        if self.pointed_profile_id == 0 && self.pointed_pub_id == 0 {
            None
        } else {
            Some((self.pointed_profile_id, self.pointed_pub_id))
        }
    }

    pub fn pub_type(&self) -> PubType {
        match (self.pointer(), self.collect_module) {
            (None, _) => PubType::Post,
            (Some(_), None) => PubType::Mirror,
            (Some(_), Some(_)) => PubType::Comment,
        }
    }

    /// The pointer to follow during resolution, if this is a mirror.
    pub fn mirrored(&self) -> Option<(u64, u64)> {
        match self.pub_type() {
            PubType::Mirror => self.pointer(),
            _ => None,
        }
    }
}

/// Type of `pub_id` under a profile that has created `pub_count` publications.
pub fn pub_type_of(pub_count: u64, pub_id: u64, record: Option<&Publication>) -> PubType {
    if pub_id == 0 || pub_id > pub_count {
        return PubType::Nonexistent;
    }
    record.map_or(PubType::Nonexistent, Publication::pub_type)
}

/// Follow mirror pointers from `start` until a post or comment is reached.
///
/// `fetch` loads the publication a pointer refers to. The returned record is
/// the canonical publication used for collect-module lookup and for
/// addressing the collect registry.
pub fn resolve_root<F>(start: Publication, mut fetch: F) -> Result<Publication>
where
    F: FnMut(u64, u64) -> Result<Publication>,
{
    let mut current = start;
    while let Some((profile_id, pub_id)) = current.mirrored() {
        current = fetch(profile_id, pub_id)?;
    }
    Ok(current)
}
