//! Typed identifiers for graph nodes, graph edges and dispatchable resources.
//!
//! Each id is a `Copy + Ord + Hash` newtype over `u32`.  Node and edge ids
//! index the graph's arrays directly through [`NodeId::index`] and friends;
//! resource ids are opaque keys assigned by the record store.

use std::fmt;

/// Declares one id newtype with its sentinel, `index()` and `Display`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" (`MAX`).
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The id as an array index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// `INVALID`.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Dense index of a road-graph node.  Only meaningful for the graph that
    /// issued it.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-graph edge (position in CSR order).
    pub struct EdgeId(u32);
}

typed_id! {
    /// Identifier of a dispatchable resource (ambulance, hospital, …) as
    /// assigned by the record store.
    pub struct ResourceId(u32);
}
