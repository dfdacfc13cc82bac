/*!
 * Referent allocation for model instances
 */

/// Prefix of every referent attribute value
pub const REFERENT_PREFIX: &str = "RBX";

/// Hands out per-document instance identifiers.
///
/// Identifiers start at 1 and strictly increase. One allocator belongs to
/// exactly one compile; create a fresh one for every document.
#[derive(Debug, Default)]
pub struct ReferentAllocator {
    last: u64,
}

impl ReferentAllocator {
    /// Create an allocator whose first identifier is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier
    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Allocate the next identifier formatted as a referent attribute
    pub fn next_referent(&mut self) -> String {
        format!("{}{}", REFERENT_PREFIX, self.next())
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> u64 {
        self.last
    }
}
