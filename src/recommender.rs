//! Recommendation rules
//!
//! Maps an [`AggregateSummary`] to a [`Recommendation`] through fixed thresholds.
//! The workout rule uses a strict comparison and the sleep-advice rule a
//! non-strict one, so an average of exactly 7 hours yields "Light Yoga" together
//! with "Great job!".

use crate::types::{
    AggregateSummary, CalorieTarget, DietTip, Recommendation, SleepAdvice, SuggestedWorkout,
    WeeklySeries,
};

/// Average sleep above which cardio is suggested (strict)
pub const CARDIO_SLEEP_HOURS: f64 = 7.0;

/// Average sleep at or above which sleep is considered adequate
pub const ADEQUATE_SLEEP_HOURS: f64 = 7.0;

/// Workout count above which the active calorie target applies (strict)
pub const ACTIVE_WORKOUT_COUNT: usize = 3;

/// Calorie total below which more protein is advised (strict)
pub const LOW_CALORIE_TOTAL: f64 = 2000.0;

/// Rule engine for recommendations
pub struct RuleEngine;

impl RuleEngine {
    /// Apply every rule to a summary and attach the weekly series
    pub fn recommend(summary: &AggregateSummary, weekly: WeeklySeries) -> Recommendation {
        let avg_sleep = summary.avg_sleep_hours.value;

        Recommendation {
            suggested_workout: suggest_workout(avg_sleep),
            recommended_calories: calorie_target(summary.total_workouts),
            diet_tip: diet_tip(summary.total_calories.value),
            sleep_advice: sleep_advice(avg_sleep),
            weekly,
        }
    }
}

pub fn suggest_workout(avg_sleep_hours: f64) -> SuggestedWorkout {
    if avg_sleep_hours > CARDIO_SLEEP_HOURS {
        SuggestedWorkout::Cardio
    } else {
        SuggestedWorkout::LightYoga
    }
}

pub fn calorie_target(total_workouts: usize) -> CalorieTarget {
    if total_workouts > ACTIVE_WORKOUT_COUNT {
        CalorieTarget::Active
    } else {
        CalorieTarget::Standard
    }
}

pub fn diet_tip(total_calories: f64) -> DietTip {
    if total_calories < LOW_CALORIE_TOTAL {
        DietTip::IncreaseProtein
    } else {
        DietTip::MaintainDiet
    }
}

pub fn sleep_advice(avg_sleep_hours: f64) -> SleepAdvice {
    if avg_sleep_hours >= ADEQUATE_SLEEP_HOURS {
        SleepAdvice::GreatJob
    } else {
        SleepAdvice::SleepMore
    }
}
