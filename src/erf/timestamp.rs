use std::fmt;

/// ERF 64-bit fixed-point timestamp
///
/// The upper 32 bits hold seconds since the Unix epoch, the lower 32 bits a binary fraction of
/// a second. The value is stored little-endian, unlike every other ERF header field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ErfTimestamp(pub u64);

impl ErfTimestamp {
    /// Whole seconds since the Unix epoch
    #[inline]
    pub const fn seconds(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Binary fraction of a second, in units of 2^-32 s
    #[inline]
    pub const fn fraction(self) -> u32 {
        self.0 as u32
    }

    /// Seconds and nanoseconds, rounded to the nearest nanosecond
    pub fn to_secs_nanos(self) -> (u64, u32) {
        let frac = u64::from(self.fraction());
        let mut secs = u64::from(self.seconds());
        let mut nanos = (frac * 1_000_000_000 + (1 << 31)) >> 32;
        if nanos >= 1_000_000_000 {
            nanos -= 1_000_000_000;
            secs += 1;
        }
        (secs, nanos as u32)
    }

    /// Nanoseconds since the Unix epoch
    pub fn nanoseconds(self) -> u64 {
        let (secs, nanos) = self.to_secs_nanos();
        secs * 1_000_000_000 + u64::from(nanos)
    }

    /// Timestamp as a floating-point number of seconds
    pub fn as_f64(self) -> f64 {
        f64::from(self.seconds()) + f64::from(self.fraction()) / 4_294_967_296.0
    }
}

impl fmt::Display for ErfTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (secs, nanos) = self.to_secs_nanos();
        write!(f, "{}.{:09}", secs, nanos)
    }
}
