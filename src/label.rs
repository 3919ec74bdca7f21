/// A single step of an address path within one dimension.
///
/// Kept as a thin newtype over `u32` rather than a bare integer so child
/// links, addresses, and log events can't be accidentally mixed up with
/// plain indices or counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub u32);

impl From<u32> for Label {
    fn from(v: u32) -> Self {
        Label(v)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One path per dimension, root-to-leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub dims: Vec<Vec<Label>>,
}

impl Address {
    pub fn new(dims: Vec<Vec<Label>>) -> Self {
        Self { dims }
    }

    pub fn dimension(&self) -> usize {
        self.dims.len()
    }
}

/// Convenience for building an [`Address`] out of plain integer literals, e.g.
/// `address([[0, 0], [0, 1]])`.
pub fn address<const D: usize>(dims: [&[u32]; D]) -> Address {
    Address::new(
        dims.iter()
            .map(|d| d.iter().map(|&l| Label(l)).collect())
            .collect(),
    )
}
