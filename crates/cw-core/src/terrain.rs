//! Terrain and site classification.

use std::fmt;

/// The terrain class of a place.  Collaborators (world generation, travel
/// speed tables) interpret it; the kernel only stores and round-trips it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    #[default]
    Flats,
    Dunes,
    Ridge,
    Saltpan,
    Ruins,
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Terrain::Flats => "flats",
            Terrain::Dunes => "dunes",
            Terrain::Ridge => "ridge",
            Terrain::Saltpan => "saltpan",
            Terrain::Ruins => "ruins",
        };
        f.write_str(name)
    }
}

/// What kind of site a place is.
///
/// `Transit` marks the ephemeral places fabricated when movers meet
/// mid-road; they host an encounter and are torn down when it ends.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaceKind {
    Settlement,
    Crossroads,
    Resource,
    Hazard,
    Transit,
    #[default]
    None,
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaceKind::Settlement => "settlement",
            PlaceKind::Crossroads => "crossroads",
            PlaceKind::Resource => "resource",
            PlaceKind::Hazard => "hazard",
            PlaceKind::Transit => "transit",
            PlaceKind::None => "none",
        };
        f.write_str(name)
    }
}
