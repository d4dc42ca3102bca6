//! Tracked frequency bands

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of tracked bands (low, mid, high, all)
pub const NUM_BANDS: usize = 4;

/// A tracked band. `All` is the aggregate (unfiltered) channel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Mid,
    High,
    All,
}

impl Band {
    /// All bands in tick processing order
    pub const ALL: [Band; NUM_BANDS] = [Band::Low, Band::Mid, Band::High, Band::All];

    /// Narrow (filtered) bands share one normalization factor; `All` has its own.
    pub fn is_narrow(self) -> bool {
        !matches!(self, Band::All)
    }

    pub fn name(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
            Band::All => "all",
        }
    }
}

/// One value per tracked band
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct BandSet<T> {
    pub low: T,
    pub mid: T,
    pub high: T,
    pub all: T,
}

impl<T> BandSet<T> {
    pub fn new(low: T, mid: T, high: T, all: T) -> Self {
        Self {
            low,
            mid,
            high,
            all,
        }
    }

    /// Build a set by evaluating `f` once per band, in `Band::ALL` order
    pub fn from_fn(mut f: impl FnMut(Band) -> T) -> Self {
        Self {
            low: f(Band::Low),
            mid: f(Band::Mid),
            high: f(Band::High),
            all: f(Band::All),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> BandSet<U> {
        BandSet {
            low: f(self.low),
            mid: f(self.mid),
            high: f(self.high),
            all: f(self.all),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Band, &T)> {
        Band::ALL.into_iter().map(move |band| (band, &self[band]))
    }
}

impl<T> Index<Band> for BandSet<T> {
    type Output = T;

    fn index(&self, band: Band) -> &T {
        match band {
            Band::Low => &self.low,
            Band::Mid => &self.mid,
            Band::High => &self.high,
            Band::All => &self.all,
        }
    }
}

impl<T> IndexMut<Band> for BandSet<T> {
    fn index_mut(&mut self, band: Band) -> &mut T {
        match band {
            Band::Low => &mut self.low,
            Band::Mid => &mut self.mid,
            Band::High => &mut self.high,
            Band::All => &mut self.all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_fields() {
        let mut set = BandSet::new(1, 2, 3, 4);
        assert_eq!(set[Band::Low], 1);
        assert_eq!(set[Band::All], 4);

        set[Band::Mid] = 20;
        assert_eq!(set.mid, 20);
    }

    #[test]
    fn test_from_fn_visits_bands_in_order() {
        let mut seen = Vec::new();
        let set = BandSet::from_fn(|band| {
            seen.push(band);
            band.name()
        });
        assert_eq!(seen, Band::ALL.to_vec());
        assert_eq!(set.high, "high");
    }

    #[test]
    fn test_only_all_is_aggregate() {
        let narrow: Vec<Band> = Band::ALL.into_iter().filter(|b| b.is_narrow()).collect();
        assert_eq!(narrow, vec![Band::Low, Band::Mid, Band::High]);
    }
}
