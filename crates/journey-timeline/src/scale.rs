//! The fixed scale ladder, finest to coarsest.

use std::fmt;

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Scale {
    FifteenMinutes,
    OneHour,
    SixHours,
    #[default]
    OneDay,
    ThreeDays,
    OneWeek,
    TwoWeeks,
    ThirtyDays,
    Full,
}

impl Scale {
    pub const ALL: [Self; 9] = [
        Self::FifteenMinutes,
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::TwoWeeks,
        Self::ThirtyDays,
        Self::Full,
    ];

    #[must_use]
    pub const fn finest() -> Self {
        Self::FifteenMinutes
    }

    /// Position on the ladder (0 = finest).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Ladder duration; `None` for [`Scale::Full`].
    #[must_use]
    pub const fn ladder_duration(self) -> Option<Duration> {
        let minutes = match self {
            Self::FifteenMinutes => 15,
            Self::OneHour => 60,
            Self::SixHours => 6 * 60,
            Self::OneDay => 24 * 60,
            Self::ThreeDays => 3 * 24 * 60,
            Self::OneWeek => 7 * 24 * 60,
            Self::TwoWeeks => 14 * 24 * 60,
            Self::ThirtyDays => 30 * 24 * 60,
            Self::Full => return None,
        };
        Some(Duration::minutes(minutes))
    }

    /// `D(s)`: the ladder duration capped at the journey duration.
    #[must_use]
    pub fn effective_duration(self, full: Duration) -> Duration {
        let full = full.max(Duration::zero());
        self.ladder_duration().map_or(full, |d| d.min(full))
    }

    /// Move `delta` rungs (negative = finer), clamped at both ends.
    #[must_use]
    pub fn step(self, delta: i32) -> Self {
        let idx = i64::try_from(self.index()).unwrap_or(0) + i64::from(delta);
        let max = i64::try_from(Self::ALL.len() - 1).unwrap_or(0);
        Self::from_index(usize::try_from(idx.clamp(0, max)).unwrap_or(0))
    }

    /// True below one day, where axis labels show time of day.
    #[must_use]
    pub const fn is_sub_day(self) -> bool {
        matches!(self, Self::FifteenMinutes | Self::OneHour | Self::SixHours)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "1d",
            Self::ThreeDays => "3d",
            Self::OneWeek => "1w",
            Self::TwoWeeks => "2w",
            Self::ThirtyDays => "30d",
            Self::Full => "full",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.label() == v)
    }

    /// Marker radius at this granularity before the importance bonus.
    /// Finer scales draw larger markers.
    #[must_use]
    pub const fn base_marker_radius(self) -> f64 {
        match self {
            Self::FifteenMinutes => 10.0,
            Self::OneHour => 9.0,
            Self::SixHours => 8.0,
            Self::OneDay => 7.0,
            Self::ThreeDays => 6.0,
            Self::OneWeek => 5.5,
            Self::TwoWeeks => 5.0,
            Self::ThirtyDays => 4.5,
            Self::Full => 4.0,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
