//! Recording episode boundaries.
//!
//! Episode id `0` means "not recording"; any other id names an active
//! recording. Only the edges between the two fire: switching straight from
//! one nonzero id to another is ignored, so a missing `0` between episodes
//! merges them into the first one.

/// Id carried on the `record_episode` input.
pub type EpisodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle to recording the given episode.
    Start(EpisodeId),
    /// The given episode finished; back to idle.
    Stop(EpisodeId),
    Ignored,
}

#[derive(Debug, Default)]
pub struct EpisodeTracker {
    current: EpisodeId,
}

impl EpisodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> EpisodeId {
        self.current
    }

    pub fn is_recording(&self) -> bool {
        self.current != 0
    }

    pub fn observe(&mut self, episode: EpisodeId) -> Transition {
        match (self.current, episode) {
            (0, 0) => Transition::Ignored,
            (0, started) => {
                self.current = started;
                Transition::Start(started)
            }
            (finished, 0) => {
                self.current = 0;
                Transition::Stop(finished)
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop() {
        let mut tracker = EpisodeTracker::new();
        assert!(!tracker.is_recording());
        assert_eq!(tracker.observe(5), Transition::Start(5));
        assert!(tracker.is_recording());
        assert_eq!(tracker.current(), 5);
        assert_eq!(tracker.observe(0), Transition::Stop(5));
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn repeated_values_are_ignored() {
        let mut tracker = EpisodeTracker::new();
        assert_eq!(tracker.observe(0), Transition::Ignored);
        assert_eq!(tracker.observe(3), Transition::Start(3));
        assert_eq!(tracker.observe(3), Transition::Ignored);
        assert_eq!(tracker.observe(0), Transition::Stop(3));
        assert_eq!(tracker.observe(0), Transition::Ignored);
    }

    #[test]
    fn switching_between_nonzero_ids_is_ignored() {
        let mut tracker = EpisodeTracker::new();
        tracker.observe(1);
        assert_eq!(tracker.observe(2), Transition::Ignored);
        assert_eq!(tracker.current(), 1);
        assert_eq!(tracker.observe(0), Transition::Stop(1));
    }

    #[test]
    fn negative_ids_record() {
        let mut tracker = EpisodeTracker::new();
        assert_eq!(tracker.observe(-1), Transition::Start(-1));
        assert_eq!(tracker.observe(0), Transition::Stop(-1));
    }

    #[test]
    fn every_stop_matches_the_preceding_start() {
        let mut tracker = EpisodeTracker::new();
        let mut open = None;
        for episode in [0, 4, 4, 7, 0, 0, 2, 9, 0, 1, 0] {
            match tracker.observe(episode) {
                Transition::Start(id) => {
                    assert_eq!(open.replace(id), None);
                }
                Transition::Stop(id) => {
                    assert_eq!(open.take(), Some(id));
                }
                Transition::Ignored => {}
            }
            assert_eq!(tracker.current(), open.unwrap_or(0));
        }
        assert_eq!(open, None);
    }
}
