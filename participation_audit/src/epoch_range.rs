use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::RangeInclusive,
    str::FromStr,
};

use anyhow::{ensure, Context as _, Error as AnyhowError, Result};
use helper_functions::misc;
use thiserror::Error;
use types::phase0::primitives::{Epoch, Slot};

/// Inclusive range of epochs, written as `N` or `A-B`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EpochRange {
    start: Epoch,
    end: Epoch,
}

impl FromStr for EpochRange {
    type Err = AnyhowError;

    fn from_str(string: &str) -> Result<Self> {
        let parse = |epoch: &str| {
            epoch.parse::<Epoch>().with_context(|| Error::Malformed {
                input: string.to_owned(),
            })
        };

        let (start, end) = match string.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let epoch = parse(string)?;
                (epoch, epoch)
            }
        };

        ensure!(start <= end, Error::Reversed { start, end });

        Ok(Self { start, end })
    }
}

impl Display for EpochRange {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        let Self { start, end } = self;

        if start == end {
            write!(formatter, "{start}")
        } else {
            write!(formatter, "{start}-{end}")
        }
    }
}

impl EpochRange {
    #[must_use]
    pub const fn start(self) -> Epoch {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> Epoch {
        self.end
    }

    /// Number of epochs after the first one.
    #[must_use]
    pub const fn span(self) -> Epoch {
        self.end - self.start
    }

    #[must_use]
    pub const fn slots(self) -> RangeInclusive<Slot> {
        misc::slots_in_epochs(self.start, self.end)
    }
}

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
enum Error {
    #[error("epoch range {input:?} is neither N nor A-B")]
    Malformed { input: String },
    #[error("epoch range starts at {start}, after its end at {end}")]
    Reversed { start: Epoch, end: Epoch },
}
