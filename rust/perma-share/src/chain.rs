use perma_storage::Reference;

/// The claimed authorization path for one request: `via_1, …, via_n,
/// target`.
///
/// A chain always holds at least the target. It is built fresh for every
/// request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchChain {
    hops: Vec<Reference>,
}

impl FetchChain {
    /// Assemble the chain that leads through `via` to `target`.
    pub fn new<Via>(via: Via, target: Reference) -> Self
    where
        Via: IntoIterator<Item = Reference>,
    {
        let mut hops: Vec<Reference> = via.into_iter().collect();
        hops.push(target);
        Self { hops }
    }

    /// The first hop; the share descriptor the chain is rooted at.
    pub fn root(&self) -> &Reference {
        &self.hops[0]
    }

    /// The requested blob.
    pub fn target(&self) -> &Reference {
        &self.hops[self.hops.len() - 1]
    }

    /// Every hop, root first.
    pub fn hops(&self) -> &[Reference] {
        &self.hops
    }

    /// The hop following the one at `index`, if any.
    pub fn next(&self, index: usize) -> Option<&Reference> {
        self.hops.get(index + 1)
    }
}
