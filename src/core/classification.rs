use crate::core::band::RasterBand;
use crate::types::ClassKind;

/// Binary {0, 1, NaN} band whose polarity is part of the value
///
/// `1` means "is `kind`". Converting between polarities is done with
/// [`Classification::into_kind`], never by flipping the band by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: ClassKind,
    pub band: RasterBand,
}

impl Classification {
    /// Wrap a binary band whose 1 means `kind`
    pub fn new(kind: ClassKind, band: RasterBand) -> Self {
        Self { kind, band }
    }

    /// Binary band where 1 is water
    pub fn water(band: RasterBand) -> Self {
        Self::new(ClassKind::Water, band)
    }

    /// Binary band where 1 is land
    pub fn land(band: RasterBand) -> Self {
        Self::new(ClassKind::Land, band)
    }

    /// Same classification expressed with polarity `kind`; NaN stays NaN
    pub fn into_kind(self, kind: ClassKind) -> Self {
        if self.kind == kind {
            return self;
        }
        Self {
            kind,
            band: self.band.logical_not(),
        }
    }

    /// Borrowing form of `into_kind`
    pub fn to_kind(&self, kind: ClassKind) -> Self {
        self.clone().into_kind(kind)
    }

    /// Pixels carrying this classification's polarity
    pub fn count(&self) -> usize {
        self.band.count_true()
    }
}
