//! Read-only records handed to the dispatch core by the data provider.

use crate::{Availability, GeoPoint, ResourceId};

/// A dispatchable resource snapshot.
///
/// `A` carries whatever the record store attaches (names, crew, …); the core
/// never inspects it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource<A = ()> {
    pub id:           ResourceId,
    pub location:     GeoPoint,
    pub availability: Availability,
    pub attributes:   A,
}

impl Resource<()> {
    /// A resource with no attributes.
    pub fn new(id: ResourceId, location: GeoPoint, availability: Availability) -> Self {
        Self { id, location, availability, attributes: () }
    }
}

impl<A> Resource<A> {
    pub fn with_attributes(
        id: ResourceId,
        location: GeoPoint,
        availability: Availability,
        attributes: A,
    ) -> Self {
        Self { id, location, availability, attributes }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }
}

/// A labelled risk-zone centroid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub label:    String,
    pub centroid: GeoPoint,
}

impl Zone {
    pub fn new(label: impl Into<String>, centroid: GeoPoint) -> Self {
        Self { label: label.into(), centroid }
    }
}
