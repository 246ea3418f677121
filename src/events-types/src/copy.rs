/// Produce a copy that shares no storage with the receiver.
///
/// Every schema value owns its nested options, vectors and maps, so the
/// derived `Clone` already duplicates them element by element. Copying
/// never fails.
pub trait DeepCopy: Clone {
    fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// copy the receiver into `out`, reusing its allocations where possible
    fn deep_copy_into(&self, out: &mut Self) {
        out.clone_from(self);
    }
}

impl<T: Clone> DeepCopy for T {}
