use core::time::Duration;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_with::{serde_as, DurationMilliSeconds};
use strum::Display;
use types::phase0::primitives::{Epoch, Slot};
use validator_statistics::{CanonicalChain, ParticipationCounts, ParticipationStatistics, Rate};

use crate::epoch_range::EpochRange;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[serde_as]
#[derive(Clone, Copy, Default, Debug, Serialize)]
pub struct StageTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub fetch: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub reconstruct: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub aggregate: Duration,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct CountsReport {
    #[serde(flatten)]
    pub counts: ParticipationCounts,
    pub participation_rate: Option<f64>,
    pub effectiveness: Option<f64>,
}

impl From<ParticipationCounts> for CountsReport {
    fn from(counts: ParticipationCounts) -> Self {
        Self {
            counts,
            participation_rate: counts.participation_rate(),
            effectiveness: counts.effectiveness(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct PositionReport {
    pub position: u64,
    #[serde(flatten)]
    pub participation: CountsReport,
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub start_epoch: Epoch,
    pub end_epoch: Epoch,
    pub start_slot: Slot,
    pub end_slot: Slot,
    pub proposed_blocks: u64,
    pub proposal_rate: Option<f64>,
    pub discarded_blocks: usize,
    pub total: CountsReport,
    pub by_epoch_position: Vec<PositionReport>,
    pub timings: StageTimings,
}

impl AuditReport {
    #[must_use]
    pub fn new(
        epochs: EpochRange,
        chain: &CanonicalChain,
        statistics: &ParticipationStatistics,
        timings: StageTimings,
    ) -> Self {
        let slots = epochs.slots();

        let by_epoch_position = (0..)
            .zip(statistics.by_epoch_position)
            .map(|(position, counts)| PositionReport {
                position,
                participation: counts.into(),
            })
            .collect();

        Self {
            start_epoch: epochs.start(),
            end_epoch: epochs.end(),
            start_slot: *slots.start(),
            end_slot: *slots.end(),
            proposed_blocks: chain.proposed_in(&slots),
            proposal_rate: validator_statistics::proposal_rate(chain, &slots),
            discarded_blocks: chain.orphaned(),
            total: statistics.total.into(),
            by_epoch_position,
            timings,
        }
    }

    pub fn write(&self, format: OutputFormat, mut writer: impl Write) -> Result<()> {
        match format {
            OutputFormat::Text => self.write_text(&mut writer)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer)?;
            }
        }

        Ok(())
    }

    fn write_text(&self, writer: &mut impl Write) -> Result<()> {
        let Self {
            start_epoch,
            end_epoch,
            start_slot,
            end_slot,
            proposed_blocks,
            discarded_blocks,
            total,
            by_epoch_position,
            timings,
            ..
        } = self;

        let slot_count = end_slot - start_slot + 1;

        writeln!(
            writer,
            "epochs {start_epoch}-{end_epoch} (slots {start_slot}-{end_slot})",
        )?;

        writeln!(
            writer,
            "blocks proposed: {proposed_blocks}/{slot_count} ({}), discarded: {discarded_blocks}",
            display_rate(Rate::new(*proposed_blocks, slot_count)),
        )?;

        writeln!(writer)?;
        writeln!(
            writer,
            "{:>8} {:>12} {:>12} {:>14} {:>14}",
            "position", "assigned", "executed", "participation", "effectiveness",
        )?;

        for PositionReport {
            position,
            participation,
        } in by_epoch_position
        {
            write_counts_row(writer, &position.to_string(), participation.counts)?;
        }

        write_counts_row(writer, "total", total.counts)?;

        let StageTimings {
            fetch,
            reconstruct,
            aggregate,
        } = timings;

        writeln!(writer)?;
        writeln!(
            writer,
            "fetch: {fetch:?}, reconstruct: {reconstruct:?}, aggregate: {aggregate:?}",
        )?;

        Ok(())
    }
}

fn write_counts_row(
    writer: &mut impl Write,
    label: &str,
    counts: ParticipationCounts,
) -> Result<()> {
    let ParticipationCounts {
        assigned,
        executed,
        inclusion_delay,
    } = counts;

    writeln!(
        writer,
        "{label:>8} {assigned:>12} {executed:>12} {:>14} {:>14}",
        display_rate(Rate::new(executed, assigned)),
        display_rate(Rate::new(executed, inclusion_delay)),
    )?;

    Ok(())
}

fn display_rate(rate: Option<Rate>) -> String {
    rate.map_or_else(|| "-".to_owned(), |rate| rate.to_string())
}
