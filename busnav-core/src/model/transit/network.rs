//! Bus network: stops and the stop-to-stop segments of each line

use std::collections::BTreeSet;

use hashbrown::HashMap;
use log::trace;

use super::types::{TransitSegment, TransitStop};
use crate::{Error, LineId, NodeId};

#[derive(Debug, Clone, Default)]
pub struct TransitGraph {
    stops: Vec<TransitStop>,
    stop_index: HashMap<NodeId, usize>,
    segments: Vec<TransitSegment>,
    /// Normalized `(min, max)` endpoint pair to segment position
    segment_index: HashMap<(NodeId, NodeId), usize>,
}

impl TransitGraph {
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if two stops share an id.
    pub fn new(stops: impl IntoIterator<Item = TransitStop>) -> Result<Self, Error> {
        let mut graph = Self::default();
        for stop in stops {
            if graph.stop_index.contains_key(&stop.id) {
                return Err(Error::InvalidData(format!(
                    "Duplicate stop id {}",
                    stop.id
                )));
            }
            graph.stop_index.insert(stop.id, graph.stops.len());
            graph.stops.push(stop);
        }
        Ok(graph)
    }

    /// Adds the lines running between two stops, merging with an existing
    /// segment between the same pair in either direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for unknown stops or an empty line set.
    pub fn add_segment<I, L>(&mut self, from: NodeId, to: NodeId, lines: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = L>,
        L: Into<LineId>,
    {
        let lines: BTreeSet<LineId> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Err(Error::InvalidData(format!(
                "Transit segment {from}-{to} has no lines"
            )));
        }
        for stop in [from, to] {
            if !self.stop_index.contains_key(&stop) {
                return Err(Error::InvalidData(format!(
                    "Transit segment {from}-{to} references unknown stop {stop}"
                )));
            }
        }
        if from == to {
            trace!("Skipping transit self-loop at stop {from}");
            return Ok(());
        }

        let key = (from.min(to), from.max(to));
        match self.segment_index.get(&key) {
            Some(&idx) => self.segments[idx].lines.extend(lines),
            None => {
                self.segment_index.insert(key, self.segments.len());
                self.segments.push(TransitSegment { from, to, lines });
            }
        }
        Ok(())
    }

    /// Adds every consecutive pair of `stops` as a segment served by `line`
    pub fn add_line(&mut self, line: impl Into<LineId>, stops: &[NodeId]) -> Result<(), Error> {
        let line = line.into();
        for pair in stops.windows(2) {
            self.add_segment(pair[0], pair[1], [line.clone()])?;
        }
        Ok(())
    }

    pub fn stops(&self) -> &[TransitStop] {
        &self.stops
    }

    pub fn stop(&self, id: NodeId) -> Option<&TransitStop> {
        self.stop_index.get(&id).map(|&idx| &self.stops[idx])
    }

    pub fn segments(&self) -> &[TransitSegment] {
        &self.segments
    }

    pub fn segment(&self, a: NodeId, b: NodeId) -> Option<&TransitSegment> {
        self.segment_index
            .get(&(a.min(b), a.max(b)))
            .map(|&idx| &self.segments[idx])
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Distinct line ids across the network
    pub fn lines(&self) -> BTreeSet<&LineId> {
        self.segments.iter().flat_map(|s| s.lines.iter()).collect()
    }
}
