use std::net::SocketAddr;

use schema::AirportId;

/// Maps each airport id to the address its node listens on.
/// Airport ids are dense, starting from 0.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    nodes: Vec<SocketAddr>,
}

impl Registry {
    pub fn new(nodes: Vec<SocketAddr>) -> Self {
        Self { nodes }
    }

    /// Returns the address of airport `id`, or `None` if no such airport exists
    pub fn address(&self, id: AirportId) -> Option<SocketAddr> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.nodes.get(index))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AirportId, SocketAddr)> + '_ {
        (0..).zip(self.nodes.iter().copied())
    }
}

impl FromIterator<SocketAddr> for Registry {
    fn from_iter<I: IntoIterator<Item = SocketAddr>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
