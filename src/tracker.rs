//! Per-person track management
//!
//! Each detected person carries its own motion window and action classifier,
//! keyed by a stable track identity. Detections are associated to live tracks
//! by greedy nearest-centroid assignment gated by a maximum distance;
//! unmatched detections open new tracks, and tracks unseen for too many
//! frames are evicted.

use crate::action::ActionClassifier;
use crate::window::MotionWindow;
use serde::{Deserialize, Serialize};

/// Stable identifier for one tracked person.
pub type TrackId = u64;

/// Tracker tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum centroid distance (pixels) for associating a detection with an
    /// existing track.
    pub max_association_distance: f64,
    /// Number of consecutive unseen frames after which a track is evicted.
    pub max_missed_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_association_distance: 120.0,
            max_missed_frames: 30,
        }
    }
}

/// One tracked person: identity plus per-track temporal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub window: MotionWindow,
    pub action: ActionClassifier,
    last_center: (f64, f64),
    missed_frames: u32,
}

impl Track {
    fn new(id: TrackId, center: (f64, f64)) -> Self {
        Self {
            id,
            window: MotionWindow::new(),
            action: ActionClassifier::new(),
            last_center: center,
            missed_frames: 0,
        }
    }
}

/// Summary of one association tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssociationOutcome {
    /// Tracks that matched a detection this frame.
    pub matched: Vec<TrackId>,
    /// New tracks born from unmatched detections.
    pub born: Vec<TrackId>,
    /// Tracks evicted after going unseen too long.
    pub evicted: Vec<TrackId>,
}

/// Tracker holding all live per-person state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonTracker {
    tracks: Vec<Track>,
    next_id: TrackId,
    config: TrackerConfig,
}

impl Default for PersonTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Associate this frame's detection centroids with live tracks.
    ///
    /// Greedy nearest-neighbour: all (track, detection) pairs within the
    /// distance gate are considered closest-first, each track and detection
    /// assigned at most once. Unmatched detections open new tracks. Tracks
    /// unseen for more than `max_missed_frames` are evicted.
    ///
    /// Returns the assigned track id for each detection, in input order,
    /// plus the tick outcome.
    pub fn assign(&mut self, centers: &[(f64, f64)]) -> (Vec<TrackId>, AssociationOutcome) {
        let mut outcome = AssociationOutcome::default();

        // Candidate pairs inside the gate, closest first.
        let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
        for (t, track) in self.tracks.iter().enumerate() {
            for (d, &(cx, cy)) in centers.iter().enumerate() {
                let dist = (cx - track.last_center.0).hypot(cy - track.last_center.1);
                if dist <= self.config.max_association_distance {
                    pairs.push((dist, t, d));
                }
            }
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut track_taken = vec![false; self.tracks.len()];
        let mut detection_track: Vec<Option<TrackId>> = vec![None; centers.len()];

        for (_, t, d) in pairs {
            if track_taken[t] || detection_track[d].is_some() {
                continue;
            }
            track_taken[t] = true;
            detection_track[d] = Some(self.tracks[t].id);
            self.tracks[t].last_center = centers[d];
            self.tracks[t].missed_frames = 0;
            outcome.matched.push(self.tracks[t].id);
        }

        // Unmatched detections are born as new tracks.
        let mut assigned = Vec::with_capacity(centers.len());
        for (d, slot) in detection_track.iter().enumerate() {
            match slot {
                Some(id) => assigned.push(*id),
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.tracks.push(Track::new(id, centers[d]));
                    outcome.born.push(id);
                    assigned.push(id);
                }
            }
        }

        // Age out tracks that went unseen this frame.
        let max_missed = self.config.max_missed_frames;
        let matched_or_born: Vec<TrackId> = outcome
            .matched
            .iter()
            .chain(outcome.born.iter())
            .copied()
            .collect();
        self.tracks.retain_mut(|track| {
            if matched_or_born.contains(&track.id) {
                return true;
            }
            track.missed_frames += 1;
            if track.missed_frames > max_missed {
                outcome.evicted.push(track.id);
                false
            } else {
                true
            }
        });

        (assigned, outcome)
    }

    /// Mutable access to a live track.
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Number of live tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Identifiers of all live tracks.
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    /// Serialize tracker state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load tracker state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
