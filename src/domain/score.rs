// Score, kill counter and streak multiplier.

use crate::domain::tuning::WaveTuning;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBoard {
    pub score: u64,
    pub kills: u32,
    pub headshots: u32,
    /// Kills since the player last took damage.
    pub streak: u32,
    pub best_streak: u32,
}

impl ScoreBoard {
    pub fn multiplier(&self, tuning: &WaveTuning) -> f32 {
        (1.0 + tuning.streak_step * self.streak as f32).min(tuning.max_multiplier)
    }

    /// Books a kill and returns the points awarded. The multiplier uses the streak
    /// before this kill.
    pub fn award_kill(&mut self, headshot: bool, tuning: &WaveTuning) -> u64 {
        let base = if headshot {
            tuning.headshot_score
        } else {
            tuning.kill_score
        };
        let points = (base as f32 * self.multiplier(tuning)).round() as u64;

        self.score += points;
        self.kills += 1;
        if headshot {
            self.headshots += 1;
        }
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        points
    }

    pub fn break_streak(&mut self) {
        self.streak = 0;
    }
}
