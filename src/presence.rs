//! Periodic rotation of the bot's displayed activity.

use std::time::Duration;

use log::debug;
use poise::serenity_prelude::{ActivityData, Context};

const ROTATION_PERIOD: Duration = Duration::from_secs(60);

fn status_list() -> Vec<ActivityData> {
    vec![
        ActivityData::playing("LolbitFurry's Chat Bot"),
        ActivityData::playing("I'm Ready To Chat With Fluffy Buddies ^w^"),
        ActivityData::listening("Foxy Land"),
        ActivityData::watching("OwO What's This?"),
    ]
}

/// Cycles through a fixed list of activities, one per tick.
pub struct PresenceRotator {
    statuses: Vec<ActivityData>,
    ticks: usize,
}

impl PresenceRotator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            statuses: status_list(),
            ticks: 0,
        }
    }

    /// Returns the activity for the current tick and advances the counter.
    pub fn tick(&mut self) -> ActivityData {
        let activity = self.statuses[self.ticks % self.statuses.len()].clone();
        self.ticks += 1;
        activity
    }
}

impl Default for PresenceRotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the rotation task. Called once, after the client reports ready;
/// runs for the process lifetime. The first update happens immediately.
pub fn spawn_rotator(ctx: Context) {
    tokio::spawn(async move {
        let mut rotator = PresenceRotator::new();
        let mut interval = tokio::time::interval(ROTATION_PERIOD);
        loop {
            interval.tick().await;
            let activity = rotator.tick();
            debug!("Rotating presence to: {}", activity.name);
            ctx.set_activity(Some(activity));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_follow_list_order() {
        let mut rotator = PresenceRotator::new();
        let expected = status_list();
        for status in &expected {
            assert_eq!(rotator.tick().name, status.name);
        }
    }

    #[test]
    fn wraps_around_after_full_cycle() {
        let mut rotator = PresenceRotator::new();
        let list = status_list();
        let n = 7;
        let mut last = rotator.tick();
        for _ in 1..=n {
            last = rotator.tick();
        }
        assert_eq!(last.name, list[n % list.len()].name);
    }

    #[test]
    fn kinds_match_list() {
        let mut rotator = PresenceRotator::new();
        for status in status_list() {
            assert_eq!(rotator.tick().kind, status.kind);
        }
    }
}
